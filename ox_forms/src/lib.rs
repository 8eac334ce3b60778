pub mod schema;
pub mod parser;
pub mod rules;
pub mod validation;
pub mod widget;
pub mod traits;
pub mod registry;
pub mod render;
pub mod binding;
pub mod loader;
pub mod error;

pub use schema::*;
pub use parser::{classify, parse_form_schema, FieldType, ParsedField};
pub use rules::{build_rules_form_field, ValidationRule};
pub use validation::{ValidationError, Validator};
pub use widget::{resolve_widget, WidgetKind};
pub use traits::*;
pub use registry::*;
pub use render::FormEngine;
pub use binding::{finish_with, FormProps, Orientation, SchemaForm, SubmitOutcome, SubmitState};
pub use error::FormError;

#[cfg(test)]
mod tests;
