use crate::parser::ParsedField;
use crate::schema::FieldOption;
use crate::widget::{widget_options, WidgetKind};
use anyhow::Error;
use serde_json::Value;

/// Context passed to renderers
pub struct RenderContext<'a> {
    /// Current value bound to the field, if any.
    pub value: Option<&'a Value>,
    pub widget: WidgetKind,
    pub required: bool,
}

impl<'a> RenderContext<'a> {
    /// Options the widget should offer for `field`.
    pub fn options<'f>(&self, field: &'f ParsedField) -> &'f [FieldOption] {
        widget_options(field, self.widget)
    }
}

pub trait ElementRenderer: Send + Sync {
    /// Widget kinds this renderer is meant for.
    fn handled_widgets(&self) -> Vec<WidgetKind>;

    /// Render the input control only; the engine supplies label, grid cell and errors.
    fn render(&self, field: &ParsedField, ctx: &RenderContext) -> Result<String, Error>;
}
