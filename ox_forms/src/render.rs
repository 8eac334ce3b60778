use crate::binding::SchemaForm;
use crate::parser::ParsedField;
use crate::registry::TypeRegistry;
use crate::traits::RenderContext;
use crate::widget::resolve_widget;
use crate::error::FormError;
use anyhow::{Context, Result};
use log::debug;

pub struct FormEngine<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> FormEngine<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Renders the whole form: one grid cell per visible field, then the
    /// action buttons.
    pub fn render(&self, form: &SchemaForm) -> Result<String> {
        let layout = &form.ui_schema().layout;
        let props = form.props();

        let mut cells = String::new();
        for field in form.visible_fields() {
            let cell = self
                .render_cell(form, field)
                .with_context(|| format!("Failed to render field '{}'", field.name))?;
            cells.push_str(&cell);
        }

        let mut actions = format!(
            r#"<button type="submit" class="ox-submit">{}</button>"#,
            html_escape(&props.submit_label)
        );
        if props.show_reset {
            actions.push_str(r#"<button type="reset" class="ox-reset">Reset</button>"#);
        }

        let title = form
            .schema()
            .title
            .as_deref()
            .map(|t| format!("<h2>{}</h2>", html_escape(t)))
            .unwrap_or_default();

        debug!("Rendered form '{}' with {} column grid", props.id, layout.columns());
        Ok(format!(
            r#"<form id="{id}" method="post" class="ox-form ox-form-{orientation}">{title}<div class="row" style="display:grid;grid-template-columns:repeat({cols},minmax(0,1fr));gap:{gap}px">{cells}</div><div class="actions">{actions}</div></form>"#,
            id = html_escape(&props.id),
            orientation = props.orientation.as_str(),
            cols = layout.columns(),
            gap = layout.gap(),
        ))
    }

    /// Grid cell for one field: label, control and any recorded errors.
    pub fn render_cell(&self, form: &SchemaForm, field: &ParsedField) -> Result<String> {
        let required = form.schema().is_required(&field.name);
        let control = self.render_field(field, &RenderContext {
            value: form.values().get(&field.name),
            widget: resolve_widget(field),
            required,
        })?;

        let errors: String = form
            .errors_for(&field.name)
            .map(|m| format!(r#"<div class="ox-error">{}</div>"#, html_escape(m)))
            .collect();

        let class = if field.custom_class.is_empty() {
            format!("col col-{}", field.span)
        } else {
            format!("col col-{} {}", field.span, html_escape(&field.custom_class))
        };

        Ok(format!(
            r#"<div class="{class}" style="grid-column:span {span}"><label for="{name}"{req}>{label}</label>{control}{errors}</div>"#,
            span = field.span,
            name = html_escape(&field.name),
            req = if required { r#" class="required""# } else { "" },
            label = html_escape(field.display_label()),
        ))
    }

    pub fn render_field(&self, field: &ParsedField, ctx: &RenderContext) -> Result<String> {
        let component_name = self.registry.resolve_component(ctx.widget);

        let renderer = self
            .registry
            .get_element_renderer(component_name)
            .ok_or_else(|| FormError::MissingRenderer(component_name.to_string()))?;

        renderer.render(field, ctx)
    }
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
