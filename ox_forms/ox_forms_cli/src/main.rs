use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use futures::executor::block_on;
use log::{error, info};
use ox_forms::binding::{finish_with, SchemaForm, SubmitOutcome};
use ox_forms::loader::load_document;
use ox_forms::{
    build_rules_form_field, parse_form_schema, FormError, FormSchema, TypeMappingConfig, TypeRegistry,
    UIFormSchema,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect, render and validate schema-driven forms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct FormDocuments {
    /// Form schema document (.json, .yaml, .yml or .toml)
    #[arg(short, long)]
    schema: PathBuf,
    /// UI schema document
    #[arg(short, long)]
    ui: Option<PathBuf>,
}

impl FormDocuments {
    fn load(&self) -> Result<(FormSchema, Option<UIFormSchema>)> {
        let schema: FormSchema = load_document(&self.schema)
            .with_context(|| format!("Failed to load form schema from {:?}", self.schema))?;
        let ui = match &self.ui {
            Some(path) => Some(
                load_document::<UIFormSchema>(path)
                    .with_context(|| format!("Failed to load UI schema from {:?}", path))?,
            ),
            None => None,
        };
        Ok((schema, ui))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the parsed field descriptors as JSON
    Parse {
        #[command(flatten)]
        docs: FormDocuments,
    },
    /// Print the validation rules of every field, or of one field
    Rules {
        #[command(flatten)]
        docs: FormDocuments,
        #[arg(short, long)]
        field: Option<String>,
    },
    /// Render the form as HTML
    Render {
        #[command(flatten)]
        docs: FormDocuments,
        /// Initial values document
        #[arg(long)]
        values: Option<PathBuf>,
        /// Widget kind to component mapping document
        #[arg(short, long)]
        renderers: Option<PathBuf>,
    },
    /// Submit a set of values; exits with status 1 when any rule fails
    Validate {
        #[command(flatten)]
        docs: FormDocuments,
        #[arg(long)]
        values: PathBuf,
    },
}

fn load_values(path: &Path) -> Result<Map<String, Value>> {
    load_document(path).with_context(|| format!("Failed to load values from {:?}", path))
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Parse { docs } => {
            let (schema, ui) = docs.load()?;
            let fields = parse_form_schema(&schema, ui.as_ref());
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        Command::Rules { docs, field } => {
            let (schema, _) = docs.load()?;
            let mut rules = Map::new();
            match field {
                Some(name) => {
                    let property = schema
                        .property(&name)
                        .ok_or_else(|| FormError::UnknownField(name.clone()))?;
                    let built = build_rules_form_field(&name, &schema, property);
                    rules.insert(name, serde_json::to_value(built)?);
                }
                None => {
                    for (name, property) in &schema.properties {
                        let built = build_rules_form_field(name, &schema, property);
                        rules.insert(name.clone(), serde_json::to_value(built)?);
                    }
                }
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(rules))?);
        }
        Command::Render { docs, values, renderers } => {
            let (schema, ui) = docs.load()?;
            let mut registry = TypeRegistry::new();
            ox_forms_std_renderers::register_standard_renderers(&mut registry);
            if let Some(path) = renderers {
                let config: TypeMappingConfig = load_document(&path)
                    .with_context(|| format!("Failed to load renderer mapping from {:?}", path))?;
                registry.load_from_config(config);
            }

            let mut form = SchemaForm::new(schema, ui, finish_with(|_| Ok(())));
            if let Some(path) = values {
                form = form.with_initial_values(load_values(&path)?);
            }
            println!("{}", form.render(&registry)?);
        }
        Command::Validate { docs, values } => {
            let (schema, ui) = docs.load()?;
            let mut form = SchemaForm::new(schema, ui, finish_with(|values| {
                info!("Accepted {} value(s)", values.len());
                Ok(())
            }))
            .with_initial_values(load_values(&values)?);

            match block_on(form.submit())? {
                SubmitOutcome::Submitted(values) => {
                    println!("{}", serde_json::to_string_pretty(&Value::Object(values))?);
                }
                SubmitOutcome::Rejected(errors) => {
                    for e in &errors {
                        println!("{}: {}", e.field, e.message);
                    }
                    return Ok(ExitCode::from(1));
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}
