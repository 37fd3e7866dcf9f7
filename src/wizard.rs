//! Wizard orchestration.
//!
//! One run either copies the template unmodified, walks the template's
//! field schema, or falls back to the built-in questions for the first
//! service. The compose document is parsed once, mutated in place and
//! rendered once at the end.

use crate::config::{Field, Schema};
use crate::document::{sequence_items, ComposeDocument};
use crate::env::{port_var, volume_var, EnvFile, Variables, CONTAINER_NAME_VAR};
use crate::error::{Error, Result};
use crate::fields::{ask_volume_host, resolve, FieldAnswer, VolumeSpec};
use crate::loader::Template;
use crate::prompt::{Prompter, Severity};
use crate::rewrite::{
    apply_port_plan, ask_ports, attach_network, declare_network, expose_ports, publish_ports,
    register_network, NetworkScope, PortBinding, PortPlan,
};
use log::{debug, warn};
use serde_yaml::Value;

/// Text of the files to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub compose: String,
    pub env: Option<String>,
    pub customized: bool,
}

/// Final state of a customized run.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardResult {
    pub document: ComposeDocument,
    pub environment: Option<EnvFile>,
}

impl WizardResult {
    /// Serializes the document and the environment file.
    pub fn render(&self) -> Result<Output> {
        Ok(Output {
            compose: self.document.render()?,
            env: self.environment.as_ref().map(EnvFile::render),
            customized: true,
        })
    }
}

enum Plan<'t> {
    Copy,
    Schema(&'t Schema),
    Fixed,
}

/// Runs the wizard for one template.
///
/// # Errors
/// Any fatal error aborts the run before anything is written.
pub fn run(template: &Template, prompter: &dyn Prompter, skip_customize: bool) -> Result<Output> {
    prompter.message(Severity::Info, &format!("Template '{}' found.", template.name));

    let plan = if skip_customize || !prompter.confirm("Customize the template?")? {
        Plan::Copy
    } else if let Some(schema) = &template.schema {
        Plan::Schema(schema)
    } else {
        prompter.message(
            Severity::Hint,
            "No customize.json in this template, asking the built-in questions.",
        );
        Plan::Fixed
    };

    let result = match plan {
        Plan::Copy => {
            debug!("Copying template '{}' unmodified.", template.name);
            return Ok(Output {
                compose: template.compose.clone(),
                env: template.env.clone(),
                customized: false,
            });
        }
        Plan::Schema(schema) => run_schema(template, schema, prompter)?,
        Plan::Fixed => run_fixed(template, prompter)?,
    };

    let output = result.render()?;
    prompter.message(Severity::Success, "Customization complete.");
    Ok(output)
}

/// Asks every schema field in order, then every key of the template `.env`.
pub fn run_schema(
    template: &Template,
    schema: &Schema,
    prompter: &dyn Prompter,
) -> Result<WizardResult> {
    let mut document = ComposeDocument::parse(&template.compose)?;

    for field in &schema.fields {
        apply_field(&mut document, field, prompter)?;
    }

    let environment = match &template.env {
        Some(text) => {
            prompter.message(Severity::Heading, "Environment variables");
            let mut env = EnvFile::parse(text);
            env.prompt_values(prompter)?;
            Some(env)
        }
        None => None,
    };

    Ok(WizardResult { document, environment })
}

/// Resolves one field and applies the answer to the document.
pub fn apply_field(
    document: &mut ComposeDocument,
    field: &Field,
    prompter: &dyn Prompter,
) -> Result<()> {
    if !field.description.is_empty() {
        prompter.message(Severity::Hint, &field.description);
    }

    match resolve(field, document.get_path(&field.key), prompter)? {
        FieldAnswer::Set(value) => document.set_path(&field.key, value),
        FieldAnswer::Ports(plan) => {
            let parent = field.key.rsplit_once('.').map(|(parent, _)| parent).unwrap_or("");
            apply_port_plan(document.mapping_at_mut(parent), plan);
        }
        FieldAnswer::Networks(declared) => {
            let section = document.mapping_at_mut(&field.key);
            for (name, options) in declared {
                declare_network(section, &name, options);
            }
        }
        FieldAnswer::Skip => {
            warn!("Skipping field '{}': unknown field type.", field.key);
            prompter.message(
                Severity::Warning,
                &format!("'{}' has an unknown field type and was skipped", field.key),
            );
        }
    }
    Ok(())
}

/// Built-in questions for the first service: container name, ports or
/// expose, volume host paths and one optional extra network. Answers are
/// externalized to the environment file.
pub fn run_fixed(template: &Template, prompter: &dyn Prompter) -> Result<WizardResult> {
    let mut document = ComposeDocument::parse(&template.compose)?;
    let service_name = document
        .first_service()
        .ok_or_else(|| Error::InvalidDocument("no services defined".to_string()))?;
    let mut variables = Variables::default();

    prompter.message(Severity::Heading, &format!("Configuring service: {service_name}"));
    let service = document.service_mut(&service_name)?;

    // container name
    let default_name = service
        .get("container_name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{service_name}-container"));
    let answer = prompter.ask("1. Container name", Some(&default_name))?;
    let name = if answer.is_empty() { default_name } else { answer };
    let reference = variables.record(CONTAINER_NAME_VAR, name);
    service.insert(Value::from("container_name"), Value::from(reference));

    // ports or expose
    let ports = sequence_items(service.get("ports"));
    if !ports.is_empty() {
        prompter.message(Severity::Heading, "2. Network exposure");
        match ask_ports(prompter, &ports)? {
            PortPlan::Expose(containers) => expose_ports(service, containers),
            PortPlan::Publish(bindings) => {
                let entries = bindings
                    .into_iter()
                    .map(|binding| match binding {
                        PortBinding::Short(port) => {
                            let reference =
                                variables.record(&port_var(&port.container), port.host);
                            Value::from(format!("{reference}:{}", port.container))
                        }
                        PortBinding::Kept(entry) => entry,
                    })
                    .collect();
                publish_ports(service, entries);
            }
        }
    }

    // volumes
    let volumes = sequence_items(service.get("volumes"));
    if !volumes.is_empty() {
        prompter.message(Severity::Heading, "3. Volumes");
        let mut rewritten = Vec::with_capacity(volumes.len());
        for volume in volumes {
            let spec = volume.as_str().and_then(VolumeSpec::parse);
            match spec {
                Some(spec) => {
                    let host = ask_volume_host(prompter, &spec)?;
                    let reference = variables.record(&volume_var(&spec.container), host);
                    rewritten.push(Value::from(spec.with_host(&reference)));
                }
                None => rewritten.push(volume),
            }
        }
        service.insert(Value::from("volumes"), Value::Sequence(rewritten));
    }

    // extra network
    prompter.message(Severity::Heading, "4. Networks");
    if prompter.confirm("Add an extra network?")? {
        let network = prompter.ask("Network name", None)?;
        if network.is_empty() {
            debug!("No network name given, skipping.");
        } else {
            prompter.message(Severity::Hint, "1. external (existing network, e.g. a proxy)");
            prompter.message(Severity::Hint, "2. internal (isolated)");
            let scope = match prompter.ask("Network type", Some("1"))?.as_str() {
                "2" => NetworkScope::Internal,
                _ => NetworkScope::External,
            };
            attach_network(document.service_mut(&service_name)?, &network);
            register_network(document.root_mut(), &network, scope);
        }
    }

    let environment = match &template.env {
        Some(text) => {
            let mut env = EnvFile::parse(text);
            env.merge(&variables);
            env
        }
        None => EnvFile::generated(&variables),
    };

    Ok(WizardResult { document, environment: Some(environment) })
}
