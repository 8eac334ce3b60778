use crate::parser::enum_options;
use crate::schema::{FieldOption, FormSchema, PropertySchema, StringFormat};
use serde::{Deserialize, Serialize};

/// One atomic constraint attached to a field, with the message shown when
/// the constraint is violated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "rule_type", rename_all = "snake_case")]
pub enum ValidationRule {
    Required {
        message: String,
    },
    MinLength {
        min: u64,
        message: String,
    },
    MaxLength {
        max: u64,
        message: String,
    },
    Pattern {
        /// Source text, compiled only when evaluated.
        pattern: String,
        message: String,
    },
    Format {
        format: StringFormat,
        message: String,
    },
    NumberMin {
        #[serde(serialize_with = "crate::schema::serialize_bound")]
        min: f64,
        message: String,
    },
    NumberMax {
        #[serde(serialize_with = "crate::schema::serialize_bound")]
        max: f64,
        message: String,
    },
    NumberRange {
        #[serde(serialize_with = "crate::schema::serialize_bound")]
        min: f64,
        #[serde(serialize_with = "crate::schema::serialize_bound")]
        max: f64,
        message: String,
    },
    BooleanDefault {
        default: bool,
        message: String,
    },
    EnumMembership {
        options: Vec<FieldOption>,
        message: String,
    },
    ArrayItems {
        items: Vec<PropertySchema>,
        message: String,
    },
    OptionsMembership {
        options: Vec<FieldOption>,
        message: String,
    },
}

impl ValidationRule {
    pub fn message(&self) -> &str {
        match self {
            ValidationRule::Required { message }
            | ValidationRule::MinLength { message, .. }
            | ValidationRule::MaxLength { message, .. }
            | ValidationRule::Pattern { message, .. }
            | ValidationRule::Format { message, .. }
            | ValidationRule::NumberMin { message, .. }
            | ValidationRule::NumberMax { message, .. }
            | ValidationRule::NumberRange { message, .. }
            | ValidationRule::BooleanDefault { message, .. }
            | ValidationRule::EnumMembership { message, .. }
            | ValidationRule::ArrayItems { message, .. }
            | ValidationRule::OptionsMembership { message, .. } => message,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, ValidationRule::Required { .. })
    }
}

/// Derives the validation rules for one field.
///
/// Pure: the result depends only on the arguments. Rules accumulate in a
/// fixed order: required first, then the constraints of the property's
/// variant. A bound of `0` counts as set.
pub fn build_rules_form_field(name: &str, schema: &FormSchema, property: &PropertySchema) -> Vec<ValidationRule> {
    let mut rules = Vec::new();

    if schema.is_required(name) {
        rules.push(ValidationRule::Required {
            message: format!("{} is required", name),
        });
    }

    match property {
        PropertySchema::String(s) => {
            if let Some(min) = s.min_length {
                rules.push(ValidationRule::MinLength {
                    min,
                    message: format!("{} must be at least {} characters", name, min),
                });
            }
            if let Some(max) = s.max_length {
                rules.push(ValidationRule::MaxLength {
                    max,
                    message: format!("{} must be at most {} characters", name, max),
                });
            }
            if let Some(pattern) = &s.pattern {
                rules.push(ValidationRule::Pattern {
                    pattern: pattern.clone(),
                    message: format!("{} must match the pattern {}", name, pattern),
                });
            }
            if let Some(format) = s.format {
                rules.push(ValidationRule::Format {
                    format,
                    message: format!("{} must be a valid {}", name, format.as_str()),
                });
            }
        }
        PropertySchema::Number(n) => match (n.minimum, n.maximum) {
            (Some(min), Some(max)) => rules.push(ValidationRule::NumberRange {
                min,
                max,
                message: format!("{} must be at least {} and at most {}", name, min, max),
            }),
            (Some(min), None) => rules.push(ValidationRule::NumberMin {
                min,
                message: format!("{} must be at least {}", name, min),
            }),
            (None, Some(max)) => rules.push(ValidationRule::NumberMax {
                max,
                message: format!("{} must be at most {}", name, max),
            }),
            (None, None) => {}
        },
        PropertySchema::Boolean(b) => {
            if let Some(default) = b.default {
                rules.push(ValidationRule::BooleanDefault {
                    default,
                    message: format!("{} must be {}", name, default),
                });
            }
        }
        PropertySchema::Enum(_) => {
            let options = enum_options(property);
            if !options.is_empty() {
                let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
                let message = format!("{} must be one of {}", name, labels.join(", "));
                rules.push(ValidationRule::EnumMembership { options, message });
            }
        }
        PropertySchema::Array(a) => {
            if !a.items.is_empty() {
                rules.push(ValidationRule::ArrayItems {
                    items: a.items.clone(),
                    message: format!("{} must be an array", name),
                });
            }
        }
        PropertySchema::Options(o) => {
            if let Some(options) = o.options.as_ref().filter(|opts| !opts.is_empty()) {
                let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                rules.push(ValidationRule::OptionsMembership {
                    message: format!("{} must be one of {}", name, values.join(", ")),
                    options: options.clone(),
                });
            }
        }
    }

    rules
}
