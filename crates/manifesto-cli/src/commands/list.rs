//! Listing commands: show, layers, resources, blueprints.

use super::{OutputFormat, render};
use manifesto_core::{Mapping, ManifestDocument, Value};
use std::process::ExitCode;

pub fn show(manifest: &ManifestDocument, format: OutputFormat) -> ExitCode {
    let mut document = Mapping::new();
    document.insert("camadas".into(), Value::Mapping(manifest.layers().clone()));
    document.insert("recursos".into(), Value::Mapping(manifest.resources().clone()));
    document.insert(
        "blueprints".into(),
        Value::Mapping(manifest.blueprints().clone()),
    );
    print(&Value::Mapping(document), format)
}

pub fn layers(
    manifest: &ManifestDocument,
    technology: Option<&str>,
    format: OutputFormat,
) -> ExitCode {
    match technology {
        Some(tech) => print_names(manifest.layers_by_technology(tech), format),
        None => print(&Value::Mapping(manifest.layers().clone()), format),
    }
}

pub fn resources(
    manifest: &ManifestDocument,
    kind: Option<&str>,
    format: OutputFormat,
) -> ExitCode {
    match kind {
        Some(kind) => print_names(manifest.resources_by_type(kind), format),
        None => print(&Value::Mapping(manifest.resources().clone()), format),
    }
}

pub fn blueprints(
    manifest: &ManifestDocument,
    resource: Option<&str>,
    format: OutputFormat,
) -> ExitCode {
    match resource {
        Some(resource) => print_names(manifest.blueprints_for_resource(resource), format),
        None => print(&Value::Mapping(manifest.blueprints().clone()), format),
    }
}

fn print_names(names: Vec<String>, format: OutputFormat) -> ExitCode {
    print(&Value::Sequence(names.into_iter().map(Value::String).collect()), format)
}

fn print(value: &Value, format: OutputFormat) -> ExitCode {
    match render(value, format) {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
