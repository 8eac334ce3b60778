use ox_forms::parser::ParsedField;
use ox_forms::registry::TypeRegistry;
use ox_forms::render::html_escape;
use ox_forms::traits::{ElementRenderer, RenderContext};
use ox_forms::validation::scalar_text;
use ox_forms::widget::WidgetKind;
use anyhow::{Result, Error};
use serde_json::Value;
use std::sync::Arc;

fn value_attr(ctx: &RenderContext) -> String {
    match ctx.value {
        Some(v) if !v.is_null() => format!(r#" value="{}""#, html_escape(&scalar_text(v))),
        _ => String::new(),
    }
}

fn required_attr(ctx: &RenderContext) -> &'static str {
    if ctx.required { " required" } else { "" }
}

fn single_line(field: &ParsedField, ctx: &RenderContext, input_type: &str) -> String {
    let name = html_escape(&field.name);
    format!(
        r#"<input type="{input_type}" id="{name}" name="{name}" class="form-control" placeholder="{placeholder}"{value}{required} />"#,
        placeholder = html_escape(&field.placeholder),
        value = value_attr(ctx),
        required = required_attr(ctx),
    )
}

pub struct TextInputRenderer;

impl ElementRenderer for TextInputRenderer {
    fn handled_widgets(&self) -> Vec<WidgetKind> {
        vec![WidgetKind::Text]
    }

    fn render(&self, field: &ParsedField, ctx: &RenderContext) -> Result<String, Error> {
        Ok(single_line(field, ctx, "text"))
    }
}

pub struct PasswordInputRenderer;

impl ElementRenderer for PasswordInputRenderer {
    fn handled_widgets(&self) -> Vec<WidgetKind> {
        vec![WidgetKind::Password]
    }

    fn render(&self, field: &ParsedField, ctx: &RenderContext) -> Result<String, Error> {
        Ok(single_line(field, ctx, "password"))
    }
}

pub struct NumberInputRenderer;

impl ElementRenderer for NumberInputRenderer {
    fn handled_widgets(&self) -> Vec<WidgetKind> {
        vec![WidgetKind::Number]
    }

    fn render(&self, field: &ParsedField, ctx: &RenderContext) -> Result<String, Error> {
        Ok(single_line(field, ctx, "number"))
    }
}

/// Multi-line box, three rows minimum. Array values are shown one item per line.
pub struct TextAreaRenderer;

impl ElementRenderer for TextAreaRenderer {
    fn handled_widgets(&self) -> Vec<WidgetKind> {
        vec![WidgetKind::TextArea]
    }

    fn render(&self, field: &ParsedField, ctx: &RenderContext) -> Result<String, Error> {
        let content = match ctx.value {
            Some(Value::Array(items)) => items.iter().map(scalar_text).collect::<Vec<_>>().join("\n"),
            Some(v) => scalar_text(v),
            None => String::new(),
        };
        let name = html_escape(&field.name);
        Ok(format!(
            r#"<textarea id="{name}" name="{name}" class="form-control" rows="3" placeholder="{placeholder}"{required}>{content}</textarea>"#,
            placeholder = html_escape(&field.placeholder),
            required = required_attr(ctx),
            content = html_escape(&content),
        ))
    }
}

pub struct SwitchRenderer;

impl ElementRenderer for SwitchRenderer {
    fn handled_widgets(&self) -> Vec<WidgetKind> {
        vec![WidgetKind::Switch]
    }

    fn render(&self, field: &ParsedField, ctx: &RenderContext) -> Result<String, Error> {
        let checked = if ctx.value.and_then(Value::as_bool).unwrap_or(false) { " checked" } else { "" };
        let name = html_escape(&field.name);
        Ok(format!(
            r#"<input type="checkbox" role="switch" id="{name}" name="{name}" class="form-switch" value="true"{checked} />"#
        ))
    }
}

fn select(field: &ParsedField, ctx: &RenderContext, multiple: bool) -> String {
    let selected: Vec<String> = match ctx.value {
        Some(Value::Array(items)) => items.iter().map(scalar_text).collect(),
        Some(v) if !v.is_null() => vec![scalar_text(v)],
        _ => Vec::new(),
    };

    let options: String = ctx
        .options(field)
        .iter()
        .map(|o| {
            let mark = if selected.contains(&o.value) { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                html_escape(&o.value),
                mark,
                html_escape(&o.label)
            )
        })
        .collect();

    let name = html_escape(&field.name);
    format!(
        r#"<select id="{name}" name="{name}" class="form-select" data-placeholder="{placeholder}"{multiple}{required}>{options}</select>"#,
        placeholder = html_escape(&field.placeholder),
        multiple = if multiple { " multiple" } else { "" },
        required = required_attr(ctx),
    )
}

pub struct SelectRenderer;

impl ElementRenderer for SelectRenderer {
    fn handled_widgets(&self) -> Vec<WidgetKind> {
        vec![WidgetKind::Select]
    }

    fn render(&self, field: &ParsedField, ctx: &RenderContext) -> Result<String, Error> {
        Ok(select(field, ctx, false))
    }
}

pub struct MultiSelectRenderer;

impl ElementRenderer for MultiSelectRenderer {
    fn handled_widgets(&self) -> Vec<WidgetKind> {
        vec![WidgetKind::MultiSelect]
    }

    fn render(&self, field: &ParsedField, ctx: &RenderContext) -> Result<String, Error> {
        Ok(select(field, ctx, true))
    }
}

/// Registers every standard renderer under its widget's default component name.
pub fn register_standard_renderers(registry: &mut TypeRegistry) {
    let renderers: Vec<Arc<dyn ElementRenderer>> = vec![
        Arc::new(TextInputRenderer),
        Arc::new(PasswordInputRenderer),
        Arc::new(TextAreaRenderer),
        Arc::new(NumberInputRenderer),
        Arc::new(SwitchRenderer),
        Arc::new(SelectRenderer),
        Arc::new(MultiSelectRenderer),
    ];

    for renderer in renderers {
        for widget in renderer.handled_widgets() {
            registry.register_element_renderer(widget.default_component(), renderer.clone());
        }
    }
    log::debug!("Registered standard renderers for {} widget kinds", WidgetKind::ALL.len());
}
