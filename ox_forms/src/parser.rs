use crate::schema::{EnumBase, FieldOption, FormSchema, PropertySchema, UIFormSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Resolved semantic type of a parsed field.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Enum,
    Array,
    Options,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Enum => "enum",
            FieldType::Array => "array",
            FieldType::Options => "options",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render-ready descriptor for one schema property.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    pub enum_options: Vec<FieldOption>,
    pub span: u32,
    pub placeholder: String,
    pub options: Vec<FieldOption>,
    pub custom_class: String,
    /// Present only when the UI schema declares a predicate for this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<Map<String, Value>>,
}

impl ParsedField {
    /// Label if the schema gave one, else the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Compiles a form schema and its optional UI overlay into one
/// [`ParsedField`] per property, in declaration order.
///
/// Overlay entries naming fields the schema does not declare are ignored.
pub fn parse_form_schema(schema: &FormSchema, ui_schema: Option<&UIFormSchema>) -> Vec<ParsedField> {
    let fallback = UIFormSchema::default();
    let ui = ui_schema.unwrap_or(&fallback);

    schema
        .properties
        .iter()
        .map(|(name, property)| parse_field(name, property, ui))
        .collect()
}

fn parse_field(name: &str, property: &PropertySchema, ui: &UIFormSchema) -> ParsedField {
    let field_type = classify(property);
    let label = property.title().map(str::to_string);

    let placeholder = match ui.placeholder.get(name) {
        Some(text) => text.clone(),
        None => format!("Please enter {}", label.as_deref().unwrap_or(name)),
    };

    ParsedField {
        name: name.to_string(),
        label,
        field_type,
        widget: ui.widgets.get(name).cloned(),
        enum_options: if field_type == FieldType::Enum {
            enum_options(property)
        } else {
            Vec::new()
        },
        span: ui.layout.span_for(name),
        placeholder,
        options: match property {
            PropertySchema::Options(o) if field_type == FieldType::Options => {
                o.options.clone().unwrap_or_default()
            }
            _ => Vec::new(),
        },
        custom_class: ui.custom_class.get(name).cloned().unwrap_or_default(),
        visible_if: ui.visible_if.get(name).cloned(),
    }
}

/// Maps a property onto its semantic field type.
///
/// Number, boolean and array base kinds win over any enum marker; only a
/// string base carrying an enum list becomes [`FieldType::Enum`], and an
/// options property needs its `options` key to become
/// [`FieldType::Options`]. Everything else is a plain string.
pub fn classify(property: &PropertySchema) -> FieldType {
    match property {
        PropertySchema::String(_) => FieldType::String,
        PropertySchema::Number(_) => FieldType::Number,
        PropertySchema::Boolean(_) => FieldType::Boolean,
        PropertySchema::Array(_) => FieldType::Array,
        PropertySchema::Enum(e) => match e.base {
            EnumBase::Number => FieldType::Number,
            EnumBase::String => FieldType::Enum,
        },
        PropertySchema::Options(o) => {
            if o.options.is_some() {
                FieldType::Options
            } else {
                FieldType::String
            }
        }
    }
}

/// Stringified `{label, value}` pairs for an enum property, in declaration
/// order. Empty for every other variant.
pub fn enum_options(property: &PropertySchema) -> Vec<FieldOption> {
    match property {
        PropertySchema::Enum(e) => e
            .values
            .iter()
            .map(|v| {
                let text = v.to_string();
                FieldOption::new(text.clone(), text)
            })
            .collect(),
        _ => Vec::new(),
    }
}
