use crate::error::FormError;
use crate::parser::{parse_form_schema, ParsedField};
use crate::registry::TypeRegistry;
use crate::render::FormEngine;
use crate::rules::{build_rules_form_field, ValidationRule};
use crate::schema::{FormSchema, UIFormSchema};
use crate::validation::{ValidationError, Validator};
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Completion handler; awaited with the collected values on a valid submit.
pub type FinishCallback = Box<dyn Fn(Map<String, Value>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
/// Receives the full current value map after every change.
pub type ChangeCallback = Box<dyn Fn(&Map<String, Value>) + Send + Sync>;
pub type ResetCallback = Box<dyn Fn() + Send + Sync>;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    #[default]
    Horizontal,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Vertical => "vertical",
            Orientation::Horizontal => "horizontal",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FormProps {
    pub id: String,
    pub submit_label: String,
    #[serde(default)]
    pub show_reset: bool,
    #[serde(default)]
    pub orientation: Orientation,
}

impl Default for FormProps {
    fn default() -> Self {
        Self {
            id: "schema_form".to_string(),
            submit_label: "Submit".to_string(),
            show_reset: false,
            orientation: Orientation::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    /// The completion callback has been invoked and has not resolved yet.
    /// An abandoned submission stays here; nothing times it out.
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// All rules passed and the completion callback resolved.
    Submitted(Map<String, Value>),
    /// At least one rule failed; the completion callback was not invoked.
    Rejected(Vec<ValidationError>),
}

/// Binds a parsed schema to a value set and the caller's callbacks.
pub struct SchemaForm {
    schema: FormSchema,
    ui_schema: UIFormSchema,
    fields: Vec<ParsedField>,
    props: FormProps,
    initial_values: Map<String, Value>,
    values: Map<String, Value>,
    errors: Vec<ValidationError>,
    state: SubmitState,
    on_finish: FinishCallback,
    on_change: Option<ChangeCallback>,
    on_reset: Option<ResetCallback>,
}

impl SchemaForm {
    pub fn new(schema: FormSchema, ui_schema: Option<UIFormSchema>, on_finish: FinishCallback) -> Self {
        let ui_schema = ui_schema.unwrap_or_default();
        let fields = parse_form_schema(&schema, Some(&ui_schema));
        debug!("Parsed {} fields for form {:?}", fields.len(), schema.title);
        Self {
            schema,
            ui_schema,
            fields,
            props: FormProps::default(),
            initial_values: Map::new(),
            values: Map::new(),
            errors: Vec::new(),
            state: SubmitState::Idle,
            on_finish,
            on_change: None,
            on_reset: None,
        }
    }

    pub fn with_props(mut self, props: FormProps) -> Self {
        self.props = props;
        self
    }

    /// Seeds both the current and the reset values.
    pub fn with_initial_values(mut self, values: Map<String, Value>) -> Self {
        self.initial_values = values.clone();
        self.values = values;
        self
    }

    pub fn on_change(mut self, callback: ChangeCallback) -> Self {
        self.on_change = Some(callback);
        self
    }

    pub fn on_reset(mut self, callback: ResetCallback) -> Self {
        self.on_reset = Some(callback);
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn ui_schema(&self) -> &UIFormSchema {
        &self.ui_schema
    }

    pub fn fields(&self) -> &[ParsedField] {
        &self.fields
    }

    pub fn props(&self) -> &FormProps {
        &self.props
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn errors_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors.iter().filter(move |e| e.field == name).map(|e| e.message.as_str())
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    /// Rules attached to `field`, rebuilt from its property on every call.
    pub fn rules_for(&self, field: &ParsedField) -> Vec<ValidationRule> {
        match self.schema.property(&field.name) {
            Some(property) => build_rules_form_field(&field.name, &self.schema, property),
            None => Vec::new(),
        }
    }

    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), FormError> {
        if self.schema.property(name).is_none() {
            return Err(FormError::UnknownField(name.to_string()));
        }
        self.values.insert(name.to_string(), value);
        self.errors.retain(|e| e.field != name);
        if let Some(callback) = &self.on_change {
            callback(&self.values);
        }
        Ok(())
    }

    /// A field is shown when its `ui:visibleIf` predicate holds and, if any
    /// `ui:dependencies` rule lists it under `show`, at least one of those
    /// rules' `when` predicates holds.
    pub fn is_visible(&self, field: &ParsedField) -> bool {
        if let Some(predicate) = &field.visible_if {
            if !predicate_holds(predicate, &self.values) {
                return false;
            }
        }

        let mut governing = self
            .ui_schema
            .dependencies
            .iter()
            .filter(|d| d.show.iter().any(|s| s == &field.name))
            .peekable();
        if governing.peek().is_none() {
            return true;
        }
        governing.any(|d| predicate_holds(&d.when, &self.values))
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = &ParsedField> {
        self.fields.iter().filter(move |f| self.is_visible(f))
    }

    /// Evaluates the rules of every visible field and records the violations.
    pub fn validate(&mut self) -> Result<(), Vec<ValidationError>> {
        let validator = Validator;
        let errors: Vec<ValidationError> = self
            .visible_fields()
            .flat_map(|field| {
                let rules = self.rules_for(field);
                validator.validate_field(&field.name, &rules, self.values.get(&field.name))
            })
            .collect();
        self.errors = errors.clone();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Values of the visible schema fields.
    pub fn collected_values(&self) -> Map<String, Value> {
        self.visible_fields()
            .filter_map(|f| self.values.get(&f.name).map(|v| (f.name.clone(), v.clone())))
            .collect()
    }

    /// Validates, then awaits the completion callback with the collected
    /// values. The callback is never invoked while any rule fails.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        if let Err(errors) = self.validate() {
            info!("Submission of '{}' blocked by {} violation(s)", self.props.id, errors.len());
            return Ok(SubmitOutcome::Rejected(errors));
        }

        let values = self.collected_values();
        self.state = SubmitState::Pending;
        match (self.on_finish)(values.clone()).await {
            Ok(()) => {
                self.state = SubmitState::Idle;
                info!("Form '{}' submitted with {} value(s)", self.props.id, values.len());
                Ok(SubmitOutcome::Submitted(values))
            }
            Err(e) => {
                self.state = SubmitState::Failed;
                warn!("Completion callback for '{}' failed: {}", self.props.id, e);
                Err(FormError::Submission(e.to_string()))
            }
        }
    }

    /// Restores the initial values and clears errors. The change callback is
    /// not invoked.
    pub fn reset(&mut self) {
        self.values = self.initial_values.clone();
        self.errors.clear();
        if let Some(callback) = &self.on_reset {
            callback();
        }
    }

    pub fn render(&self, registry: &TypeRegistry) -> anyhow::Result<String> {
        FormEngine::new(registry).render(self)
    }
}

/// Wraps a synchronous completion handler as a [`FinishCallback`].
pub fn finish_with<F>(handler: F) -> FinishCallback
where
    F: Fn(Map<String, Value>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Box::new(move |values: Map<String, Value>| {
        let result = handler(values);
        async move { result }.boxed()
    })
}

/// Every listed field must currently equal its listed value. Numbers compare
/// by value, so `30` matches `30.0`.
pub fn predicate_holds(predicate: &Map<String, Value>, values: &Map<String, Value>) -> bool {
    predicate.iter().all(|(name, expected)| match (values.get(name), expected) {
        (Some(Value::Number(actual)), Value::Number(expected)) => actual.as_f64() == expected.as_f64(),
        (actual, expected) => actual == Some(expected),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn noop_finish() -> FinishCallback {
        finish_with(|_| Ok(()))
    }

    fn schema() -> FormSchema {
        serde_json::from_value(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "title": "Name", "minLength": 2},
                "active": {"type": "boolean", "title": "Active"},
                "age": {"type": "number", "minimum": 0, "maximum": 130}
            },
            "required": ["name"]
        }))
        .unwrap()
    }

    fn values(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_set_value_notifies_change_with_full_map() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut form = SchemaForm::new(schema(), None, noop_finish())
            .with_initial_values(values(json!({"active": true})))
            .on_change(Box::new(move |v: &Map<String, Value>| sink.lock().unwrap().push(v.clone())));

        form.set_value("name", json!("Al")).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(Value::Object(seen[0].clone()), json!({"active": true, "name": "Al"}));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut form = SchemaForm::new(schema(), None, noop_finish());
        assert!(matches!(form.set_value("ghost", json!(1)), Err(FormError::UnknownField(n)) if n == "ghost"));
        assert!(form.values().is_empty());
    }

    #[test]
    fn test_visible_if_predicate() {
        let ui: UIFormSchema = serde_json::from_value(json!({"ui:visibleIf": {"name": {"active": true}}})).unwrap();
        let mut form = SchemaForm::new(schema(), Some(ui), noop_finish());
        let name = form.fields()[0].clone();
        assert!(!form.is_visible(&name));
        form.set_value("active", json!(true)).unwrap();
        assert!(form.is_visible(&name));
        assert!(form.is_visible(&form.fields()[2].clone()));
    }

    #[test]
    fn test_predicates_compare_numbers_by_value() {
        let predicate = values(json!({"age": 30, "ratio": 0.5}));
        assert!(predicate_holds(&predicate, &values(json!({"age": 30.0, "ratio": 0.5}))));
        assert!(predicate_holds(&predicate, &values(json!({"age": 30, "ratio": 0.50}))));
        assert!(!predicate_holds(&predicate, &values(json!({"age": "30", "ratio": 0.5}))));
        assert!(!predicate_holds(&predicate, &values(json!({"age": 31.0, "ratio": 0.5}))));
        assert!(!predicate_holds(&predicate, &values(json!({"ratio": 0.5}))));
    }

    #[test]
    fn test_dependencies_compose_with_visible_if() {
        let ui: UIFormSchema = serde_json::from_value(json!({
            "ui:visibleIf": {"name": {"active": true}},
            "ui:dependencies": [
                {"when": {"age": 30}, "show": ["name"]},
                {"when": {"age": 40}, "show": ["name", "age"]}
            ]
        }))
        .unwrap();
        let mut form = SchemaForm::new(schema(), Some(ui), noop_finish());
        let name = form.fields()[0].clone();

        form.set_value("active", json!(true)).unwrap();
        assert!(!form.is_visible(&name), "no dependency rule holds yet");
        form.set_value("age", json!(40)).unwrap();
        assert!(form.is_visible(&name));
        form.set_value("active", json!(false)).unwrap();
        assert!(!form.is_visible(&name), "visibleIf still applies");
    }

    #[test]
    fn test_hidden_fields_skip_validation_and_collection() {
        let ui: UIFormSchema = serde_json::from_value(json!({"ui:visibleIf": {"name": {"active": true}}})).unwrap();
        let mut form = SchemaForm::new(schema(), Some(ui), noop_finish())
            .with_initial_values(values(json!({"active": false, "name": "x"})));
        assert!(form.validate().is_ok());
        assert_eq!(Value::Object(form.collected_values()), json!({"active": false}));
    }

    #[test]
    fn test_submit_rejected_without_calling_finish() {
        let called = Arc::new(Mutex::new(false));
        let flag = called.clone();
        let mut form = SchemaForm::new(
            schema(),
            None,
            finish_with(move |_| {
                *flag.lock().unwrap() = true;
                Ok(())
            }),
        );
        form.set_value("age", json!(200)).unwrap();

        let outcome = block_on(form.submit()).unwrap();
        let SubmitOutcome::Rejected(errors) = outcome else {
            panic!("expected rejection");
        };
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["name is required", "age must be at least 0 and at most 130"]);
        assert!(!*called.lock().unwrap());
        assert_eq!(form.errors_for("name").collect::<Vec<_>>(), vec!["name is required"]);
        assert_eq!(form.state(), SubmitState::Idle);
    }

    #[test]
    fn test_set_value_clears_field_errors() {
        let mut form = SchemaForm::new(schema(), None, noop_finish());
        assert!(form.validate().is_err());
        form.set_value("name", json!("Bo")).unwrap();
        assert_eq!(form.errors_for("name").count(), 0);
    }

    #[test]
    fn test_submit_hands_values_to_finish() {
        let received = Arc::new(Mutex::new(None));
        let sink = received.clone();
        let mut form = SchemaForm::new(
            schema(),
            None,
            finish_with(move |v| {
                *sink.lock().unwrap() = Some(v);
                Ok(())
            }),
        )
        .with_initial_values(values(json!({"name": "Ada", "age": 36})));

        let outcome = block_on(form.submit()).unwrap();
        let expected = values(json!({"name": "Ada", "age": 36}));
        assert_eq!(outcome, SubmitOutcome::Submitted(expected.clone()));
        assert_eq!(received.lock().unwrap().clone(), Some(expected));
        assert_eq!(form.state(), SubmitState::Idle);
    }

    #[test]
    fn test_failing_finish_marks_failed() {
        let mut form = SchemaForm::new(
            schema(),
            None,
            finish_with(|_| Err(anyhow::anyhow!("backend down"))),
        )
        .with_initial_values(values(json!({"name": "Ada"})));

        let result = block_on(form.submit());
        assert!(matches!(result, Err(FormError::Submission(msg)) if msg.contains("backend down")));
        assert_eq!(form.state(), SubmitState::Failed);
    }

    #[test]
    fn test_abandoned_submission_stays_pending() {
        let mut form = SchemaForm::new(
            schema(),
            None,
            Box::new(|_: Map<String, Value>| futures::future::pending::<anyhow::Result<()>>().boxed()),
        )
        .with_initial_values(values(json!({"name": "Ada"})));

        assert!(form.submit().now_or_never().is_none());
        assert_eq!(form.state(), SubmitState::Pending);
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let resets = Arc::new(Mutex::new(0));
        let changes = Arc::new(Mutex::new(0));
        let (r, c) = (resets.clone(), changes.clone());
        let mut form = SchemaForm::new(schema(), None, noop_finish())
            .with_initial_values(values(json!({"active": true})))
            .on_reset(Box::new(move || *r.lock().unwrap() += 1))
            .on_change(Box::new(move |_: &Map<String, Value>| *c.lock().unwrap() += 1));

        form.set_value("active", json!(false)).unwrap();
        let _ = form.validate();
        form.reset();

        assert_eq!(Value::Object(form.values().clone()), json!({"active": true}));
        assert!(form.errors().is_empty());
        assert_eq!(*resets.lock().unwrap(), 1);
        assert_eq!(*changes.lock().unwrap(), 1);
    }
}
