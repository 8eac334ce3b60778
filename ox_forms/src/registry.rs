use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Widget kind name (e.g. `select`) to component overrides, usually loaded
/// from a renderer mapping document.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TypeMappingConfig {
    #[serde(default)]
    pub mappings: HashMap<String, DefaultFieldConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DefaultFieldConfig {
    pub component: String,
}

use crate::traits::ElementRenderer;
use crate::widget::WidgetKind;
use std::sync::Arc;

#[derive(Default)]
pub struct TypeRegistry {
    /// Maps widget kinds (e.g. "select") to a component other than the default
    mapping: HashMap<String, DefaultFieldConfig>,
    /// Maps component names (e.g. "select-input") to actual renderers
    element_renderers: HashMap<String, Arc<dyn ElementRenderer>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_config(&mut self, config: TypeMappingConfig) {
        self.mapping.extend(config.mappings);
    }

    /// Component that renders `widget`: the configured override, else the
    /// widget's default component.
    pub fn resolve_component(&self, widget: WidgetKind) -> &str {
        self.mapping
            .get(widget.as_str())
            .map(|c| c.component.as_str())
            .unwrap_or_else(|| widget.default_component())
    }

    pub fn register_element_renderer(&mut self, name: &str, renderer: Arc<dyn ElementRenderer>) {
        self.element_renderers.insert(name.to_string(), renderer);
    }

    pub fn get_element_renderer(&self, component_name: &str) -> Option<Arc<dyn ElementRenderer>> {
        self.element_renderers.get(component_name).cloned()
    }
}
