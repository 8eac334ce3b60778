use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Column count used when `ui:layout.cols` is not set.
pub const DEFAULT_COLS: u32 = 12;
/// Gap (in pixels) between grid cells when `ui:layout.gap` is not set.
pub const DEFAULT_GAP: u32 = 16;

/// A `{label, value}` pair offered by select-style widgets.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A scalar enum member as written in the schema.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum EnumValue {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Number(n) => write!(f, "{}", number_text(n)),
            EnumValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for EnumValue {
    fn from(s: &str) -> Self {
        EnumValue::Text(s.to_string())
    }
}

impl From<i64> for EnumValue {
    fn from(n: i64) -> Self {
        EnumValue::Number(n.into())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    Email,
    Url,
}

impl StringFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Url => "url",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(StringFormat::Email),
            "url" => Some(StringFormat::Url),
            _ => None,
        }
    }
}

/// Base kind an enum list is layered on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumBase {
    String,
    Number,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StringSchema {
    pub title: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    /// Regular-expression source text, kept uncompiled.
    pub pattern: Option<String>,
    pub format: Option<StringFormat>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumberSchema {
    pub title: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BooleanSchema {
    pub title: Option<String>,
    pub default: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumSchema {
    pub title: Option<String>,
    pub base: EnumBase,
    pub values: Vec<EnumValue>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArraySchema {
    pub title: Option<String>,
    pub items: Vec<PropertySchema>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionsSchema {
    pub title: Option<String>,
    /// `None` when the `options` key is absent from the document.
    pub options: Option<Vec<FieldOption>>,
}

/// One property of a form schema.
///
/// Documents carry a loose `type` tag with optional `enum` / `options`
/// markers; deserialization resolves those presence tests once so the rest
/// of the crate can match exhaustively on the variant.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(from = "Value", into = "RawProperty")]
pub enum PropertySchema {
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Enum(EnumSchema),
    Array(ArraySchema),
    Options(OptionsSchema),
}

impl PropertySchema {
    pub fn title(&self) -> Option<&str> {
        match self {
            PropertySchema::String(s) => s.title.as_deref(),
            PropertySchema::Number(n) => n.title.as_deref(),
            PropertySchema::Boolean(b) => b.title.as_deref(),
            PropertySchema::Enum(e) => e.title.as_deref(),
            PropertySchema::Array(a) => a.title.as_deref(),
            PropertySchema::Options(o) => o.title.as_deref(),
        }
    }

    /// The `type` tag this property is written with.
    pub fn base_kind(&self) -> &'static str {
        match self {
            PropertySchema::String(_) => "string",
            PropertySchema::Number(_) => "number",
            PropertySchema::Boolean(_) => "boolean",
            PropertySchema::Enum(e) => match e.base {
                EnumBase::String => "string",
                EnumBase::Number => "number",
            },
            PropertySchema::Array(_) => "array",
            PropertySchema::Options(_) => "options",
        }
    }
}

/// Document shape a property is written back out in.
#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RawProperty {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maximum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<EnumValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Vec<PropertySchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Vec<FieldOption>>,
}

/// Reads a property document key by key. A key whose value has the wrong
/// shape is dropped; the property itself is always accepted.
impl From<Value> for PropertySchema {
    fn from(doc: Value) -> Self {
        let Value::Object(doc) = doc else {
            return PropertySchema::String(StringSchema::default());
        };
        let text = |key: &str| doc.get(key).and_then(Value::as_str).map(str::to_string);
        let title = text("title");
        let enum_values = doc.get("enum").and_then(Value::as_array).map(|values| {
            values
                .iter()
                .filter_map(|v| match v {
                    Value::Number(n) => Some(EnumValue::Number(n.clone())),
                    Value::String(s) => Some(EnumValue::Text(s.clone())),
                    _ => None,
                })
                .collect::<Vec<_>>()
        });

        match doc.get("type").and_then(Value::as_str).unwrap_or_default() {
            "string" => match enum_values {
                Some(values) => PropertySchema::Enum(EnumSchema {
                    title,
                    base: EnumBase::String,
                    values,
                }),
                None => PropertySchema::String(StringSchema {
                    title,
                    min_length: doc.get("minLength").and_then(Value::as_u64),
                    max_length: doc.get("maxLength").and_then(Value::as_u64),
                    pattern: text("pattern"),
                    format: doc.get("format").and_then(Value::as_str).and_then(StringFormat::parse),
                }),
            },
            "number" => match enum_values {
                Some(values) => PropertySchema::Enum(EnumSchema {
                    title,
                    base: EnumBase::Number,
                    values,
                }),
                None => PropertySchema::Number(NumberSchema {
                    title,
                    minimum: doc.get("minimum").and_then(Value::as_f64),
                    maximum: doc.get("maximum").and_then(Value::as_f64),
                }),
            },
            "boolean" => PropertySchema::Boolean(BooleanSchema {
                title,
                default: doc.get("default").and_then(Value::as_bool),
            }),
            "array" => PropertySchema::Array(ArraySchema {
                title,
                items: doc
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().cloned().map(PropertySchema::from).collect())
                    .unwrap_or_default(),
            }),
            "options" => PropertySchema::Options(OptionsSchema {
                title,
                options: doc
                    .get("options")
                    .and_then(Value::as_array)
                    .map(|options| options.iter().filter_map(option_from).collect()),
            }),
            // Unrecognized kinds degrade to an unconstrained string.
            _ => PropertySchema::String(StringSchema {
                title,
                ..Default::default()
            }),
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `{label, value}` with a scalar value; the label falls back to the value.
fn option_from(entry: &Value) -> Option<FieldOption> {
    let value = scalar(entry.get("value")?)?;
    let label = entry.get("label").and_then(scalar).unwrap_or_else(|| value.clone());
    Some(FieldOption { label, value })
}

/// Whole numbers print without a fractional part, whether the document
/// wrote them as `1` or `1.0`.
pub fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && is_whole(f) => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

fn is_whole(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15
}

/// JSON form of a numeric bound: `5` stays an integer, `2.5` a float.
pub fn bound_value(bound: f64) -> Value {
    if is_whole(bound) {
        Value::from(bound as i64)
    } else {
        serde_json::Number::from_f64(bound).map(Value::Number).unwrap_or(Value::Null)
    }
}

pub(crate) fn serialize_bound<S: serde::Serializer>(bound: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    bound_value(*bound).serialize(serializer)
}

impl From<PropertySchema> for RawProperty {
    fn from(property: PropertySchema) -> Self {
        let kind = property.base_kind().to_string();
        match property {
            PropertySchema::String(s) => RawProperty {
                kind,
                title: s.title,
                min_length: s.min_length,
                max_length: s.max_length,
                pattern: s.pattern,
                format: s.format.map(|f| f.as_str().to_string()),
                ..Default::default()
            },
            PropertySchema::Number(n) => RawProperty {
                kind,
                title: n.title,
                minimum: n.minimum.map(bound_value),
                maximum: n.maximum.map(bound_value),
                ..Default::default()
            },
            PropertySchema::Boolean(b) => RawProperty {
                kind,
                title: b.title,
                default: b.default.map(Value::Bool),
                ..Default::default()
            },
            PropertySchema::Enum(e) => RawProperty {
                kind,
                title: e.title,
                enum_values: Some(e.values),
                ..Default::default()
            },
            PropertySchema::Array(a) => RawProperty {
                kind,
                title: a.title,
                items: Some(a.items),
                ..Default::default()
            },
            PropertySchema::Options(o) => RawProperty {
                kind,
                title: o.title,
                options: o.options,
                ..Default::default()
            },
        }
    }
}

fn object_kind() -> String {
    "object".to_string()
}

/// Declarative description of a data object's fields.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FormSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default = "object_kind")]
    pub kind: String,
    /// Declaration order drives the default field order.
    #[serde(default)]
    pub properties: IndexMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for FormSchema {
    fn default() -> Self {
        Self {
            title: None,
            kind: object_kind(),
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }
}

impl FormSchema {
    pub fn new(title: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, name: &str, property: PropertySchema) -> Self {
        self.properties.insert(name.to_string(), property);
        self
    }

    pub fn with_required(mut self, name: &str) -> Self {
        if !self.is_required(name) {
            self.required.push(name.to_string());
        }
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }
}

/// Per-field UI overlay: a mapping from field name to `V`.
///
/// Missing sections and missing names both read as "not set".
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct FieldOverlay<V>(pub IndexMap<String, V>);

impl<V> Default for FieldOverlay<V> {
    fn default() -> Self {
        Self(IndexMap::new())
    }
}

impl<V> FieldOverlay<V> {
    pub fn get(&self, name: &str) -> Option<&V> {
        self.0.get(name)
    }

    /// Looks up `name`, answering `default` on a miss.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a V) -> &'a V {
        self.0.get(name).unwrap_or(default)
    }

    pub fn insert(&mut self, name: &str, value: V) {
        self.0.insert(name.to_string(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> FromIterator<(String, V)> for FieldOverlay<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LayoutSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<u32>,
    #[serde(default, skip_serializing_if = "FieldOverlay::is_empty")]
    pub fields: FieldOverlay<u32>,
}

impl LayoutSchema {
    pub fn columns(&self) -> u32 {
        self.cols.unwrap_or(DEFAULT_COLS)
    }

    pub fn gap(&self) -> u32 {
        self.gap.unwrap_or(DEFAULT_GAP)
    }

    /// Requested span for `name`, falling back to the full row and never
    /// wider than the column count.
    pub fn span_for(&self, name: &str) -> u32 {
        let cols = self.columns();
        (*self.fields.get_or(name, &cols)).min(cols)
    }
}

/// `{when, show}` conditional display rule.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DependencyRule {
    #[serde(default)]
    pub when: Map<String, Value>,
    #[serde(default)]
    pub show: Vec<String>,
}

/// Presentation overlay layered on a [`FormSchema`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UIFormSchema {
    #[serde(rename = "ui:layout", default)]
    pub layout: LayoutSchema,
    #[serde(rename = "ui:widgets", default, skip_serializing_if = "FieldOverlay::is_empty")]
    pub widgets: FieldOverlay<String>,
    #[serde(rename = "ui:placeholder", default, skip_serializing_if = "FieldOverlay::is_empty")]
    pub placeholder: FieldOverlay<String>,
    #[serde(rename = "ui:visibleIf", default, skip_serializing_if = "FieldOverlay::is_empty")]
    pub visible_if: FieldOverlay<Map<String, Value>>,
    #[serde(rename = "ui:dependencies", default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyRule>,
    #[serde(rename = "ui:customClass", default, skip_serializing_if = "FieldOverlay::is_empty")]
    pub custom_class: FieldOverlay<String>,
}
