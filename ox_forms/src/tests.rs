use crate::binding::{finish_with, SchemaForm, SubmitOutcome};
use crate::parser::{parse_form_schema, FieldType};
use crate::rules::build_rules_form_field;
use crate::schema::{FormSchema, UIFormSchema};
use futures::executor::block_on;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

fn create_test_schema() -> FormSchema {
    serde_json::from_value(json!({
        "type": "object",
        "title": "Test Form",
        "properties": {
            "name": {"type": "string", "title": "Name"},
            "age": {"type": "number", "title": "Age"},
            "role": {"type": "string", "title": "Role", "enum": ["admin", "user"]},
            "active": {"type": "boolean", "title": "Active"},
            "color": {
                "type": "options",
                "title": "Color",
                "options": [
                    {"label": "Red", "value": "red"},
                    {"label": "Blue", "value": "blue"}
                ]
            }
        },
        "required": ["name", "role"]
    }))
    .unwrap()
}

fn create_test_ui() -> UIFormSchema {
    serde_json::from_value(json!({
        "ui:layout": {
            "cols": 12,
            "gap": 16,
            "fields": {"name": 12, "age": 12, "role": 12, "active": 12, "color": 12}
        },
        "ui:widgets": {"name": "input", "age": "input", "role": "select", "active": "switch", "color": "select"},
        "ui:visibleIf": {
            "name": {"active": true},
            "age": {"active": true},
            "role": {"active": true},
            "color": {"active": true}
        },
        "ui:dependencies": [
            {"when": {"active": true}, "show": ["name", "age", "role", "color"]}
        ],
        "ui:customClass": {"name": "custom-class", "age": "custom-class", "role": "custom-class", "active": "custom-class", "color": "custom-class"}
    }))
    .unwrap()
}

fn recording_form(ui: Option<UIFormSchema>) -> (SchemaForm, Arc<Mutex<Vec<Map<String, Value>>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let form = SchemaForm::new(
        create_test_schema(),
        ui,
        finish_with(move |values| {
            sink.lock().unwrap().push(values);
            Ok(())
        }),
    );
    (form, calls)
}

#[test]
fn test_parse_yields_fields_in_declaration_order() {
    let fields = parse_form_schema(&create_test_schema(), None);
    let summary: Vec<(&str, FieldType)> = fields.iter().map(|f| (f.name.as_str(), f.field_type)).collect();
    assert_eq!(
        summary,
        vec![
            ("name", FieldType::String),
            ("age", FieldType::Number),
            ("role", FieldType::Enum),
            ("active", FieldType::Boolean),
            ("color", FieldType::Options),
        ]
    );
}

#[test]
fn test_empty_submit_surfaces_required_messages() {
    let (mut form, calls) = recording_form(None);

    let outcome = block_on(form.submit()).unwrap();

    let SubmitOutcome::Rejected(errors) = outcome else {
        panic!("submission should be rejected");
    };
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["name is required", "role is required"]);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_empty_submit_with_full_ui_schema() {
    let (form, calls) = recording_form(Some(create_test_ui()));
    let mut form = form.with_initial_values(json!({"active": true}).as_object().cloned().unwrap());

    let outcome = block_on(form.submit()).unwrap();

    match outcome {
        SubmitOutcome::Rejected(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(errors.iter().any(|e| e.field == "name" && e.message == "name is required"));
            assert!(errors.iter().any(|e| e.field == "role" && e.message == "role is required"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_valid_submit_reaches_completion_callback() {
    let (mut form, calls) = recording_form(None);
    form.set_value("name", json!("Ada")).unwrap();
    form.set_value("role", json!("admin")).unwrap();
    form.set_value("color", json!("blue")).unwrap();

    let outcome = block_on(form.submit()).unwrap();

    let expected = json!({"name": "Ada", "role": "admin", "color": "blue"});
    assert_eq!(outcome, SubmitOutcome::Submitted(expected.as_object().cloned().unwrap()));
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(Value::Object(calls[0].clone()), expected);
}

#[test]
fn test_membership_violations_block_submit() {
    let (mut form, calls) = recording_form(None);
    form.set_value("name", json!("Ada")).unwrap();
    form.set_value("role", json!("root")).unwrap();
    form.set_value("color", json!("green")).unwrap();

    let outcome = block_on(form.submit()).unwrap();

    let SubmitOutcome::Rejected(errors) = outcome else {
        panic!("submission should be rejected");
    };
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["role must be one of admin, user", "color must be one of red, blue"]);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_rules_rebuilt_per_field_match_builder() {
    let (form, _) = recording_form(None);
    for field in form.fields() {
        let property = form.schema().property(&field.name).unwrap();
        assert_eq!(form.rules_for(field), build_rules_form_field(&field.name, form.schema(), property));
    }
}
