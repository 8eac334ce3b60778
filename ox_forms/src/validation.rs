use crate::rules::ValidationRule;
use crate::schema::{number_text, FieldOption, StringFormat};
use log::warn;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Represents a validation error for a specific field.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Evaluates rule lists against submitted values.
pub struct Validator;

impl Validator {
    /// Checks `value` against every rule, collecting each violated rule's
    /// message in rule order.
    pub fn validate_field(&self, name: &str, rules: &[ValidationRule], value: Option<&Value>) -> Vec<ValidationError> {
        rules
            .iter()
            .filter_map(|rule| self.check_rule(rule, value).err())
            .map(|message| ValidationError {
                field: name.to_string(),
                message,
            })
            .collect()
    }

    /// Only `required` looks at empty values; every other rule passes on them.
    pub fn check_rule(&self, rule: &ValidationRule, value: Option<&Value>) -> Result<(), String> {
        let fail = || Err(rule.message().to_string());

        let value = match value {
            Some(v) if !is_empty(v) => v,
            _ => {
                return if rule.is_required() { fail() } else { Ok(()) };
            }
        };

        match rule {
            ValidationRule::Required { .. } => {}
            ValidationRule::MinLength { min, .. } => {
                if length_of(value) < *min {
                    return fail();
                }
            }
            ValidationRule::MaxLength { max, .. } => {
                if length_of(value) > *max {
                    return fail();
                }
            }
            ValidationRule::Pattern { pattern, .. } => match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(&scalar_text(value)) {
                        return fail();
                    }
                }
                Err(e) => {
                    warn!("Invalid pattern '{}': {}", pattern, e);
                    return fail();
                }
            },
            ValidationRule::Format { format, .. } => {
                let text = scalar_text(value);
                let ok = match format {
                    StringFormat::Email => email_regex().is_match(&text),
                    StringFormat::Url => url::Url::parse(&text).map(|u| u.has_host()).unwrap_or(false),
                };
                if !ok {
                    return fail();
                }
            }
            ValidationRule::NumberMin { min, .. } => match as_number(value) {
                Some(n) if n >= *min => {}
                _ => return fail(),
            },
            ValidationRule::NumberMax { max, .. } => match as_number(value) {
                Some(n) if n <= *max => {}
                _ => return fail(),
            },
            ValidationRule::NumberRange { min, max, .. } => match as_number(value) {
                Some(n) if n >= *min && n <= *max => {}
                _ => return fail(),
            },
            ValidationRule::BooleanDefault { default, .. } => {
                if value.as_bool() != Some(*default) {
                    return fail();
                }
            }
            ValidationRule::EnumMembership { options, .. } => {
                let selected: Vec<&Value> = match value {
                    Value::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                if !selected.iter().all(|v| is_member(options, v)) {
                    return fail();
                }
            }
            ValidationRule::ArrayItems { .. } => {
                if !value.is_array() {
                    return fail();
                }
            }
            ValidationRule::OptionsMembership { options, .. } => {
                if !is_member(options, value) {
                    return fail();
                }
            }
        }
        Ok(())
    }
}

/// Absent-equivalent values: null, blank strings and empty arrays.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Text form of a scalar, without JSON quoting for strings. `1` and `1.0`
/// both read as `1`.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

fn length_of(value: &Value) -> u64 {
    match value {
        Value::Array(items) => items.len() as u64,
        other => scalar_text(other).chars().count() as u64,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn is_member(options: &[FieldOption], value: &Value) -> bool {
    let text = scalar_text(value);
    options.iter().any(|o| o.value == text)
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email pattern must compile: {}", e))
    })
}
