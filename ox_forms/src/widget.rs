use crate::parser::{FieldType, ParsedField};
use crate::schema::FieldOption;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete input control a field is rendered with.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Text,
    Password,
    TextArea,
    Number,
    Switch,
    Select,
    MultiSelect,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 7] = [
        WidgetKind::Text,
        WidgetKind::Password,
        WidgetKind::TextArea,
        WidgetKind::Number,
        WidgetKind::Switch,
        WidgetKind::Select,
        WidgetKind::MultiSelect,
    ];

    /// Stable key used in renderer mapping documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Text => "text",
            WidgetKind::Password => "password",
            WidgetKind::TextArea => "textarea",
            WidgetKind::Number => "number",
            WidgetKind::Switch => "switch",
            WidgetKind::Select => "select",
            WidgetKind::MultiSelect => "multi_select",
        }
    }

    /// Component a renderer registers under unless a mapping says otherwise.
    pub fn default_component(&self) -> &'static str {
        match self {
            WidgetKind::Text => "text-input",
            WidgetKind::Password => "password-input",
            WidgetKind::TextArea => "textarea",
            WidgetKind::Number => "number-input",
            WidgetKind::Switch => "switch",
            WidgetKind::Select => "select-input",
            WidgetKind::MultiSelect => "multi-select",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the control for a field. An explicit `password`, `textarea` or
/// `select` override wins; any other override is ignored and the resolved
/// type decides.
pub fn resolve_widget(field: &ParsedField) -> WidgetKind {
    match (field.widget.as_deref(), field.field_type) {
        (Some("password"), _) => WidgetKind::Password,
        (Some("textarea"), _) => WidgetKind::TextArea,
        (Some("select"), FieldType::Enum) => WidgetKind::MultiSelect,
        (Some("select"), _) => WidgetKind::Select,
        (_, FieldType::Boolean) => WidgetKind::Switch,
        (_, FieldType::Number) => WidgetKind::Number,
        (_, FieldType::String) => WidgetKind::Text,
        (_, FieldType::Array) => WidgetKind::TextArea,
        (_, FieldType::Enum) => WidgetKind::MultiSelect,
        (_, FieldType::Options) => WidgetKind::Select,
    }
}

/// Options a select-style control binds to: enum options for multi select,
/// generic options for single select (falling back to enum options when the
/// field has none).
pub fn widget_options(field: &ParsedField, kind: WidgetKind) -> &[FieldOption] {
    match kind {
        WidgetKind::MultiSelect => &field.enum_options,
        WidgetKind::Select if field.options.is_empty() => &field.enum_options,
        WidgetKind::Select => &field.options,
        _ => &[],
    }
}
