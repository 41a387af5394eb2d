//! Integration tests for the QuestionnaireBuilder API
//!
//! These tests compile small draw.io documents end to end.

use float_cmp::assert_approx_eq;
use proptest::prelude::*;

use triage::{
    QuestionnaireBuilder, TriageError,
    config::{AppConfig, ExternalsConfig, SimplifyConfig, ValidationConfig},
    diagnostics::ErrorCode,
    identifier::Id,
    semantic::NodeType,
    validate::{Validated, ValidationLevel},
};
use triage_core::logic::{Answer, Answers, Comparison, LogicExpr, Subject};

fn page(cells: &str) -> String {
    format!(
        r#"<mxfile host="app.diagrams.net">
  <diagram id="page-a" name="Intake">
    <mxGraphModel>
      <root>
        <mxCell id="0" />
        <mxCell id="1" parent="0" />
        {cells}
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>"#
    )
}

fn lenient() -> QuestionnaireBuilder {
    QuestionnaireBuilder::new(AppConfig::default().with_level(ValidationLevel::Lenient))
}

fn codes(findings: &[triage::diagnostics::Diagnostic]) -> Vec<ErrorCode> {
    findings.iter().filter_map(|finding| finding.code()).collect()
}

/// Age question, a rhombus on it and the two questions it leads to.
fn age_check() -> String {
    page(
        r#"
        <UserObject label="Age" name="age" id="q_age">
          <mxCell style="shape=hexagon;" vertex="1" parent="1" />
        </UserObject>
        <UserObject label="age &gt; 5" name="age" id="dp">
          <mxCell style="rhombus;" vertex="1" parent="1" />
        </UserObject>
        <mxCell id="q_school" value="Which school year?" vertex="1" parent="1" />
        <mxCell id="q_nursery" value="Which nursery?" vertex="1" parent="1" />
        <mxCell id="e1" edge="1" parent="1" source="q_age" target="dp" />
        <mxCell id="e2" value="Yes" edge="1" parent="1" source="dp" target="q_school" />
        <mxCell id="e3" value="No" edge="1" parent="1" source="dp" target="q_nursery" />
        "#,
    )
}

#[test]
fn test_builder_api_exists() {
    // Just verify the API compiles and can be constructed
    let _builder = QuestionnaireBuilder::default();
}

#[test]
fn test_compile_simple_questionnaire() {
    let xml = page(
        r#"
        <mxCell id="q1" value="Do you have a fever?" vertex="1" parent="1" />
        <mxCell id="q2" value="How high is it?" style="ellipse;" vertex="1" parent="1" />
        <mxCell id="q3" value="Rest and drink water" vertex="1" parent="1" />
        <mxCell id="e1" value="Yes" edge="1" parent="1" source="q1" target="q2" />
        <mxCell id="e2" value="No" edge="1" parent="1" source="q1" target="q3" />
        "#,
    );

    let questionnaire = QuestionnaireBuilder::default()
        .compile(&xml)
        .expect("Failed to compile");
    let diagram = questionnaire.diagram();

    assert_eq!(diagram.node(Id::new("q1")).unwrap().node_type(), NodeType::YesNo);
    assert_eq!(diagram.node(Id::new("q2")).unwrap().node_type(), NodeType::Numeric);

    let fever = LogicExpr::condition(Id::new("q1"), Comparison::Eq, true);
    assert_eq!(diagram.edge(Id::new("e1")).unwrap().logic(), Some(&fever));
    assert_eq!(questionnaire.node_logic(Id::new("q2")), Some(&fever));
    assert!(questionnaire.node_logic(Id::new("q1")).unwrap().is_always());
    assert!(questionnaire.findings().is_empty());
}

#[test]
fn test_json_output() {
    let xml = page(
        r#"
        <mxCell id="q1" value="Do you have a fever?" vertex="1" parent="1" />
        <mxCell id="q2" value="How high is it?" style="ellipse;" vertex="1" parent="1" />
        <mxCell id="e1" value="Yes" edge="1" parent="1" source="q1" target="q2" />
        "#,
    );

    let questionnaire = QuestionnaireBuilder::default()
        .compile(&xml)
        .expect("Failed to compile");
    let json: serde_json::Value =
        serde_json::from_str(&questionnaire.to_json().expect("Failed to export")).unwrap();

    assert_eq!(json["page_id"], "page-a");
    assert_eq!(json["nodes"][0]["type"], "yes_no");
    assert_eq!(json["nodes"][1]["type"], "numeric");
    assert_eq!(json["nodes"][1]["subtype"], "decimal");
    assert_eq!(
        json["nodes"][1]["logic"],
        serde_json::json!({"type": "condition", "subject": "q1", "operation": "=", "value": true})
    );
    assert_eq!(json["edges"][0]["label"], "Yes");
}

#[test]
fn test_single_question_page() {
    let xml = page(r#"<mxCell id="q1" value="How are you feeling today?" vertex="1" parent="1" />"#);

    let questionnaire = QuestionnaireBuilder::default()
        .compile(&xml)
        .expect("Failed to compile");

    assert_eq!(questionnaire.diagram().nodes_count(), 1);
    assert!(questionnaire.findings().is_empty());
    assert!(questionnaire.is_shown(Id::new("q1"), &Answers::new()));
}

#[test]
fn test_invalid_document_is_parse_error() {
    let xml = "<mxfile><diagram id=\"a\">";

    let err = QuestionnaireBuilder::default().compile(xml).unwrap_err();
    match err {
        TriageError::Parse { err, src } => {
            assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001));
            assert_eq!(src, xml);
        }
        other => panic!("Expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_builder_is_reusable() {
    let builder = QuestionnaireBuilder::default();

    let first = builder.compile(&age_check()).expect("first compile");
    let second = builder.compile(&age_check()).expect("second compile");
    assert_eq!(first, second);
}

#[test]
fn test_decision_point_becomes_edge_logic() {
    let questionnaire = QuestionnaireBuilder::default()
        .compile(&age_check())
        .expect("Failed to compile");
    let diagram = questionnaire.diagram();

    assert!(!diagram.contains_node(Id::new("dp")));
    assert_eq!(diagram.edges().len(), 2);

    let older = LogicExpr::condition(Id::new("q_age"), Comparison::Gt, 5.0);
    let younger = LogicExpr::condition(Id::new("q_age"), Comparison::Le, 5.0);

    let school = diagram.edge(Id::new("e1::e2")).unwrap();
    assert_eq!((school.source(), school.target()), (Id::new("q_age"), Id::new("q_school")));
    assert_eq!(school.label(), Some("Yes"));
    assert_eq!(school.logic(), Some(&older));
    assert_eq!(diagram.edge(Id::new("e1::e3")).unwrap().logic(), Some(&younger));

    assert_eq!(questionnaire.node_logic(Id::new("q_school")), Some(&older));
    assert_eq!(questionnaire.node_logic(Id::new("q_nursery")), Some(&younger));

    let seven = Answers::new().with_answer(Id::new("q_age"), Answer::Number(7.0));
    assert!(questionnaire.is_shown(Id::new("q_school"), &seven));
    assert!(!questionnaire.is_shown(Id::new("q_nursery"), &seven));

    let json = questionnaire.to_value().expect("Failed to export");
    let threshold = json["edges"][0]["logic"]["value"].as_f64().unwrap();
    assert_approx_eq!(f64, threshold, 5.0);
}

#[test]
fn test_less_than_decisions() {
    let decision = |label: &str, style: &str| {
        page(&format!(
            r#"
        <UserObject label="Age" name="age" id="q_age">
          <mxCell style="shape=hexagon;" vertex="1" parent="1" />
        </UserObject>
        <UserObject label="{label}" name="age" id="dp">
          <mxCell style="{style}" vertex="1" parent="1" />
        </UserObject>
        <mxCell id="q_nursery" value="Which nursery?" vertex="1" parent="1" />
        <mxCell id="q_school" value="Which school year?" vertex="1" parent="1" />
        <mxCell id="e1" edge="1" parent="1" source="q_age" target="dp" />
        <mxCell id="e2" value="Yes" edge="1" parent="1" source="dp" target="q_nursery" />
        <mxCell id="e3" value="No" edge="1" parent="1" source="dp" target="q_school" />
        "#
        ))
    };

    let cases = [
        ("age &lt; 5", "rhombus;", Comparison::Lt, Comparison::Ge),
        ("age &lt;= 5", "rhombus;", Comparison::Le, Comparison::Gt),
        ("age &amp;lt; 5", "rhombus;html=1;", Comparison::Lt, Comparison::Ge),
        ("&lt;div&gt;age &amp;lt;=&amp;nbsp;5&lt;/div&gt;", "rhombus;html=1;", Comparison::Le, Comparison::Gt),
    ];
    for (label, style, yes, no) in cases {
        let questionnaire = QuestionnaireBuilder::default()
            .compile(&decision(label, style))
            .unwrap_or_else(|err| panic!("{label}: {err:?}"));

        assert_eq!(
            questionnaire.node_logic(Id::new("q_nursery")),
            Some(&LogicExpr::condition(Id::new("q_age"), yes, 5.0)),
            "{label}"
        );
        assert_eq!(
            questionnaire.node_logic(Id::new("q_school")),
            Some(&LogicExpr::condition(Id::new("q_age"), no, 5.0)),
            "{label}"
        );
    }
}

#[test]
fn test_note_before_decision_point_stays_note() {
    let xml = page(
        r#"
        <UserObject label="Age" name="age" id="q_age">
          <mxCell style="shape=hexagon;" vertex="1" parent="1" />
        </UserObject>
        <mxCell id="note" value="Ask a parent to help" vertex="1" parent="1" />
        <UserObject label="age &gt; 5" name="age" id="dp">
          <mxCell style="rhombus;" vertex="1" parent="1" />
        </UserObject>
        <mxCell id="q_school" value="Which school year?" style="shape=hexagon;" vertex="1" parent="1" />
        <mxCell id="q_nursery" value="Which nursery?" style="shape=hexagon;" vertex="1" parent="1" />
        <mxCell id="e1" edge="1" parent="1" source="q_age" target="note" />
        <mxCell id="e2" edge="1" parent="1" source="note" target="dp" />
        <mxCell id="e3" value="Yes" edge="1" parent="1" source="dp" target="q_school" />
        <mxCell id="e4" value="No" edge="1" parent="1" source="dp" target="q_nursery" />
        "#,
    );

    let questionnaire = QuestionnaireBuilder::default()
        .compile(&xml)
        .expect("Failed to compile");
    let diagram = questionnaire.diagram();

    assert!(!diagram.contains_node(Id::new("dp")));
    assert_eq!(diagram.node(Id::new("note")).unwrap().node_type(), NodeType::Note);

    let seven = Answers::new().with_answer(Id::new("q_age"), Answer::Number(7.0));
    assert!(questionnaire.is_shown(Id::new("q_school"), &seven));
    assert!(!questionnaire.is_shown(Id::new("q_nursery"), &seven));
}

#[test]
fn test_option_flattening() {
    let xml = page(
        r#"
        <mxCell id="sex" value="Sex" style="swimlane;childLayout=stackLayout;rounded=1;" vertex="1" parent="1" />
        <mxCell id="male" value="Male" style="text;" vertex="1" parent="sex" />
        <mxCell id="female" value="Female" style="text;" vertex="1" parent="sex" />
        <mxCell id="q_preg" value="Could you be pregnant?" vertex="1" parent="1" />
        <mxCell id="e1" edge="1" parent="1" source="female" target="q_preg" />
        "#,
    );

    let questionnaire = QuestionnaireBuilder::default()
        .compile(&xml)
        .expect("Failed to compile");
    let diagram = questionnaire.diagram();

    assert!(!diagram.contains_node(Id::new("male")));
    assert!(!diagram.contains_node(Id::new("female")));

    let sex = diagram.node(Id::new("sex")).unwrap();
    assert_eq!(sex.node_type(), NodeType::SelectOne);
    assert!(sex.options().is_empty());
    assert_eq!(sex.choices(), &["Male".to_string(), "Female".to_string()]);

    let female = LogicExpr::condition(Id::new("sex"), Comparison::Eq, "Female");
    let edge = diagram.edge(Id::new("e1")).unwrap();
    assert_eq!(edge.source(), Id::new("sex"));
    assert_eq!(edge.logic(), Some(&female));
    assert_eq!(questionnaire.node_logic(Id::new("q_preg")), Some(&female));

    let answers = Answers::new().with_answer(Id::new("sex"), Answer::Text("Female".into()));
    assert!(questionnaire.is_shown(Id::new("q_preg"), &answers));
}

#[test]
fn test_yes_no_list_is_consolidated() {
    let xml = page(
        r#"
        <mxCell id="smoker" value="Do you smoke?" style="swimlane;childLayout=stackLayout;rounded=1;" vertex="1" parent="1" />
        <mxCell id="yes" value="Yes" style="text;" vertex="1" parent="smoker" />
        <mxCell id="no" value="No" style="text;" vertex="1" parent="smoker" />
        <mxCell id="q_amount" value="How many a day?" style="shape=hexagon;" vertex="1" parent="1" />
        <mxCell id="e1" edge="1" parent="1" source="yes" target="q_amount" />
        "#,
    );

    let questionnaire = QuestionnaireBuilder::default()
        .compile(&xml)
        .expect("Failed to compile");

    let smoker = questionnaire.diagram().node(Id::new("smoker")).unwrap();
    assert_eq!(smoker.node_type(), NodeType::YesNo);
    assert_eq!(
        questionnaire.node_logic(Id::new("q_amount")),
        Some(&LogicExpr::condition(Id::new("smoker"), Comparison::Eq, true))
    );
}

#[test]
fn test_unresolved_reference_depends_on_level() {
    let xml = page(
        r#"
        <mxCell id="q1" value="Start" vertex="1" parent="1" />
        <UserObject label="weight &gt; 80" name="weight" id="dp">
          <mxCell style="rhombus;" vertex="1" parent="1" />
        </UserObject>
        <mxCell id="q2" value="Height in cm" style="shape=hexagon;" vertex="1" parent="1" />
        <mxCell id="e1" edge="1" parent="1" source="q1" target="dp" />
        <mxCell id="e2" value="Yes" edge="1" parent="1" source="dp" target="q2" />
        "#,
    );

    let err = QuestionnaireBuilder::default().compile(&xml).unwrap_err();
    let TriageError::Parse { err, .. } = err else {
        panic!("Expected a parse error");
    };
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E401));

    let questionnaire = lenient().compile(&xml).expect("lenient compile");
    assert_eq!(codes(questionnaire.findings()), vec![ErrorCode::E401]);
    assert_eq!(
        questionnaire.node_logic(Id::new("q2")),
        Some(&LogicExpr::condition(Id::new("weight"), Comparison::Eq, true))
    );
}

#[test]
fn test_external_flag() {
    let xml = page(
        r#"
        <mxCell id="q1" value="Start" vertex="1" parent="1" />
        <UserObject label="Pregnant" name="pregnant" id="dp">
          <mxCell style="rhombus;" vertex="1" parent="1" />
        </UserObject>
        <mxCell id="q2" value="Which trimester?" vertex="1" parent="1" />
        <mxCell id="q3" value="Any medication?" vertex="1" parent="1" />
        <mxCell id="e1" edge="1" parent="1" source="q1" target="dp" />
        <mxCell id="e2" value="Yes" edge="1" parent="1" source="dp" target="q2" />
        <mxCell id="e3" value="No" edge="1" parent="1" source="dp" target="q3" />
        "#,
    );
    let config = AppConfig::new(
        ValidationConfig::default(),
        SimplifyConfig::default(),
        ExternalsConfig::new(["pregnant"], Vec::<String>::new()),
    );

    let questionnaire = QuestionnaireBuilder::new(config)
        .compile(&xml)
        .expect("Failed to compile");

    let raised = LogicExpr::condition(Subject::Flags, Comparison::In, "Pregnant");
    assert_eq!(questionnaire.node_logic(Id::new("q2")), Some(&raised));
    assert_eq!(
        questionnaire.node_logic(Id::new("q3")),
        Some(&LogicExpr::not(raised))
    );

    let flagged = Answers::new().with_flag("Pregnant");
    assert!(questionnaire.is_shown(Id::new("q2"), &flagged));
    assert!(!questionnaire.is_shown(Id::new("q3"), &flagged));
}

#[test]
fn test_help_box_folds_into_question() {
    let xml = page(
        r#"
        <mxCell id="q1" value="Temperature" style="ellipse;" vertex="1" parent="1" />
        <mxCell id="q2" value="Call your GP" vertex="1" parent="1" />
        <mxCell id="help" value="Measure under the tongue" style="fillColor=#00CC00;" vertex="1" parent="1" />
        <mxCell id="e1" edge="1" parent="1" source="q1" target="q2" />
        <mxCell id="e2" edge="1" parent="1" source="help" target="q1" />
        "#,
    );

    let questionnaire = QuestionnaireBuilder::default()
        .compile(&xml)
        .expect("Failed to compile");
    let diagram = questionnaire.diagram();

    assert!(!diagram.contains_node(Id::new("help")));
    assert_eq!(
        diagram.node(Id::new("q1")).unwrap().help_text(),
        Some("Measure under the tongue")
    );
    assert_eq!(diagram.edges().len(), 1);
}

#[test]
fn test_page_selection() {
    let xml = r#"<mxfile>
  <diagram id="a" name="Adults"><mxGraphModel><root>
    <mxCell id="x" value="X" vertex="1" />
    <mxCell id="y" value="Y" vertex="1" />
    <mxCell id="e" edge="1" source="x" target="y" />
  </root></mxGraphModel></diagram>
  <diagram id="b" name="Children"><mxGraphModel><root>
    <mxCell id="c1" value="C1" vertex="1" />
    <mxCell id="c2" value="C2" vertex="1" />
    <mxCell id="e" edge="1" source="c1" target="c2" />
  </root></mxGraphModel></diagram>
</mxfile>"#;

    let questionnaire = QuestionnaireBuilder::default()
        .with_page(Some("Children".to_string()))
        .compile(xml)
        .expect("Failed to compile");
    assert_eq!(questionnaire.diagram().page_id(), "b");

    let questionnaire = QuestionnaireBuilder::default()
        .compile(xml)
        .expect("Failed to compile");
    assert_eq!(questionnaire.diagram().page_id(), "a");
}

#[test]
fn test_findings_survive_simplification() {
    let xml = page(
        r#"
        <mxCell id="q1" value="Start" vertex="1" parent="1" />
        <mxCell id="q2" value="Next" vertex="1" parent="1" />
        <mxCell id="q3" value="Forgotten" style="shape=hexagon;" vertex="1" parent="1" />
        <mxCell id="e1" edge="1" parent="1" source="q1" target="q2" />
        "#,
    );

    let builder = QuestionnaireBuilder::default();
    let parsed = builder.parse(&xml).expect("Failed to parse");
    assert_eq!(codes(parsed.findings()), vec![ErrorCode::E305]);

    let simplified = builder.simplify(parsed).expect("Failed to simplify");
    assert_eq!(codes(simplified.findings()), vec![ErrorCode::E305]);
}

// =========================================================================
// Property tests
// =========================================================================

/// A random questionnaire: an age question, more questions and rhombuses on
/// age, with arrows only from earlier to later shapes.
#[derive(Debug, Clone)]
struct Sketch {
    /// `Some(threshold)` for a rhombus `age > threshold`, `None` for a question.
    shapes: Vec<Option<u8>>,
    /// `(from, to, label)`; `label` is 0 for none, 1 for yes and 2 for no.
    arrows: Vec<(usize, usize, u8)>,
}

impl Sketch {
    fn len(&self) -> usize {
        self.shapes.len() + 1
    }

    fn id(&self, index: usize) -> String {
        if index == 0 { "age".to_string() } else { format!("n{index}") }
    }

    fn threshold(&self, index: usize) -> Option<u8> {
        index.checked_sub(1).and_then(|index| self.shapes[index])
    }

    fn arrows(&self) -> Vec<(usize, usize, u8)> {
        let len = self.len();
        self.arrows
            .iter()
            .map(|(from, to, label)| (from % len, to % len, *label))
            .filter(|(from, to, _)| from < to)
            .collect()
    }

    fn to_xml(&self) -> String {
        let mut cells = String::from(
            r#"<UserObject label="Age" name="age" id="age"><mxCell style="shape=hexagon;" vertex="1" parent="1" /></UserObject>"#,
        );
        for index in 1..self.len() {
            let id = self.id(index);
            match self.threshold(index) {
                Some(threshold) => cells.push_str(&format!(
                    r#"<UserObject label="age &gt; {threshold}" name="age" id="{id}"><mxCell style="rhombus;" vertex="1" parent="1" /></UserObject>"#
                )),
                None => cells.push_str(&format!(
                    r#"<mxCell id="{id}" value="Question {index}" style="shape=hexagon;" vertex="1" parent="1" />"#
                )),
            }
        }
        for (position, (from, to, label)) in self.arrows().into_iter().enumerate() {
            let value = match label {
                1 => "Yes",
                2 => "No",
                _ => "",
            };
            cells.push_str(&format!(
                r#"<mxCell id="a{position}" value="{value}" edge="1" parent="1" source="{}" target="{}" />"#,
                self.id(from),
                self.id(to)
            ));
        }
        page(&cells)
    }

    /// Whether each shape is shown, following arrows directly: a rhombus
    /// arrow can be followed when its comparison matches its label.
    fn shown(&self, age: u8) -> Vec<bool> {
        let arrows = self.arrows();
        let mut shown = vec![false; self.len()];
        for index in 0..self.len() {
            let incoming: Vec<_> = arrows.iter().filter(|(_, to, _)| *to == index).collect();
            shown[index] = incoming.is_empty()
                || incoming.iter().any(|(from, _, label)| {
                    let passes = match self.threshold(*from) {
                        Some(threshold) => (age > threshold) == (*label != 2),
                        None => true,
                    };
                    shown[*from] && passes
                });
        }
        shown
    }
}

fn arb_sketch() -> impl Strategy<Value = Sketch> {
    (
        prop::collection::vec(prop::option::weighted(0.4, 0u8..10), 1..8),
        prop::collection::vec((0usize..9, 0usize..9, 0u8..3), 0..16),
    )
        .prop_map(|(shapes, arrows)| Sketch { shapes, arrows })
}

fn check_decision_points_preserve_visibility(
    sketch: &Sketch,
    age: u8,
) -> Result<(), TestCaseError> {
    let xml = sketch.to_xml();
    let questionnaire = lenient()
        .compile(&xml)
        .map_err(|err| TestCaseError::fail(format!("{err}")))?;
    let answers = Answers::new().with_answer(Id::new("age"), Answer::Number(f64::from(age)));

    let expected = sketch.shown(age);
    for index in 0..sketch.len() {
        if sketch.threshold(index).is_some() {
            continue;
        }
        let id = Id::new(&sketch.id(index));
        prop_assert_eq!(
            questionnaire.is_shown(id, &answers),
            expected[index],
            "shape {} at age {} in {}",
            index,
            age,
            xml
        );
    }
    Ok(())
}

fn check_simplify_idempotent(sketch: &Sketch) -> Result<(), TestCaseError> {
    let builder = lenient();
    let questionnaire = builder
        .compile(&sketch.to_xml())
        .map_err(|err| TestCaseError::fail(format!("{err}")))?;

    let again = builder
        .simplify(Validated::new(questionnaire.diagram().clone(), Vec::new()))
        .map_err(|err| TestCaseError::fail(format!("{err}")))?;
    prop_assert_eq!(again.value(), questionnaire.diagram());
    Ok(())
}

proptest! {
    #[test]
    fn decision_points_preserve_visibility(sketch in arb_sketch(), age in 0u8..12) {
        check_decision_points_preserve_visibility(&sketch, age)?;
    }

    #[test]
    fn simplify_idempotent(sketch in arb_sketch()) {
        check_simplify_idempotent(&sketch)?;
    }
}
