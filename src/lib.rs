pub use ox_forms::*;
pub use ox_forms_std_renderers::register_standard_renderers;

/// Registry with every standard HTML renderer installed under its default
/// component name.
pub fn standard_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    register_standard_renderers(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn test_standard_registry_covers_every_widget() {
        let registry = standard_registry();
        for kind in WidgetKind::ALL {
            assert!(registry.get_element_renderer(registry.resolve_component(kind)).is_some());
        }
    }

    #[test]
    fn test_form_round_trip_through_facade() {
        let schema: FormSchema = serde_json::from_value(json!({
            "properties": {"city": {"type": "string", "maxLength": 5}},
            "required": ["city"]
        }))
        .unwrap();
        let mut form = SchemaForm::new(schema, None, finish_with(|_| Ok(())));
        form.set_value("city", json!("Amsterdam")).unwrap();

        let outcome = block_on(form.submit()).unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected(vec![ValidationError {
                field: "city".to_string(),
                message: "city must be at most 5 characters".to_string(),
            }])
        );

        let html = form.render(&standard_registry()).unwrap();
        assert!(html.contains(r#"value="Amsterdam""#));
        assert!(html.contains("city must be at most 5 characters"));
    }
}
