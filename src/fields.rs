//! Field prompt engine.
//! Asks the question declared by one schema field and turns the answer into
//! the value written back to the compose document.

use crate::config::{Field, FieldKind};
use crate::document::sequence_items;
use crate::error::Result;
use crate::prompt::{Prompter, Severity};
use crate::rewrite::{ask_network_scope, ask_ports, PortPlan};
use serde_yaml::{Mapping, Value};

/// What the wizard does with a resolved field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAnswer {
    /// Write the value at the field key, or delete the key when `None`.
    Set(Option<Value>),
    /// Rewrite the parent service's ports/expose pair.
    Ports(PortPlan),
    /// Add these declarations to the networks section at the field key.
    Networks(Vec<(String, Value)>),
    /// The field kind is not supported; leave the document alone.
    Skip,
}

/// A short-syntax volume entry: `host:container[:options]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSpec {
    pub host: String,
    pub container: String,
    pub options: Option<String>,
}

impl VolumeSpec {
    /// `None` for bare named volumes without a container path.
    pub fn parse(entry: &str) -> Option<Self> {
        let mut parts = entry.splitn(3, ':');
        let host = parts.next()?;
        let container = parts.next()?;
        Some(Self {
            host: host.to_string(),
            container: container.to_string(),
            options: parts.next().map(str::to_string),
        })
    }

    /// Renders the entry with another host side.
    pub fn with_host(&self, host: &str) -> String {
        match &self.options {
            Some(options) => format!("{host}:{}:{options}", self.container),
            None => format!("{host}:{}", self.container),
        }
    }
}

/// Asks for the host side of a volume; an empty answer keeps the current one.
pub fn ask_volume_host(prompter: &dyn Prompter, spec: &VolumeSpec) -> Result<String> {
    let answer =
        prompter.ask(&format!("Host path for {}", spec.container), Some(&spec.host))?;
    Ok(if answer.is_empty() { spec.host.clone() } else { answer })
}

/// Splits a comma-separated answer, dropping empty items.
pub fn split_list(answer: &str) -> Vec<String> {
    answer
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn string_sequence(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|item| Value::from(item.as_str())).collect())
}

/// Schema default entries when there are any, otherwise the entries the
/// document already holds. Long-syntax mappings come through as they are.
fn entries_or_current(default: Option<&[String]>, current: Option<&Value>) -> Vec<Value> {
    match default {
        Some(entries) if !entries.is_empty() => {
            entries.iter().map(|entry| Value::from(entry.as_str())).collect()
        }
        _ => sequence_items(current),
    }
}

/// Declarations from a networks default: a name -> options object, or a
/// list of names declared without options.
fn default_declarations(default: &serde_json::Value) -> Result<Vec<(String, Value)>> {
    match default {
        serde_json::Value::Object(map) => {
            let mut declared = Vec::with_capacity(map.len());
            for (name, options) in map {
                declared.push((name.clone(), serde_yaml::to_value(options)?));
            }
            Ok(declared)
        }
        serde_json::Value::Array(items) => Ok(items
            .iter()
            .map(|item| (display_json(item), Value::Mapping(Mapping::new())))
            .filter(|(name, _)| !name.is_empty())
            .collect()),
        serde_json::Value::Null => Ok(Vec::new()),
        other => Ok(vec![(display_json(other), Value::Mapping(Mapping::new()))]),
    }
}

fn json_to_yaml(value: &serde_json::Value) -> Result<Option<Value>> {
    match value {
        serde_json::Value::Null => Ok(None),
        other => Ok(Some(serde_yaml::to_value(other)?)),
    }
}

fn display_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Resolves one field.
///
/// `current` is the value the document holds at the field key; it is used
/// by ports and volumes when the schema declares no default entries.
pub fn resolve(
    field: &Field,
    current: Option<&Value>,
    prompter: &dyn Prompter,
) -> Result<FieldAnswer> {
    let label = field.prompt_label();

    match &field.kind {
        FieldKind::Text { default } => {
            let default = default.clone().unwrap_or(serde_json::Value::Null);
            let answer = prompter.ask(label, Some(&display_json(&default)))?;
            if answer.is_empty() {
                Ok(FieldAnswer::Set(json_to_yaml(&default)?))
            } else {
                Ok(FieldAnswer::Set(Some(Value::from(answer))))
            }
        }
        FieldKind::Select { options, default } => {
            for option in options {
                prompter.message(Severity::Hint, &format!("- {option}"));
            }
            let answer = prompter.ask(label, default.as_deref())?;
            let chosen = if answer.is_empty() {
                default.clone()
            } else if options.contains(&answer) {
                Some(answer)
            } else {
                prompter.message(
                    Severity::Warning,
                    &format!(
                        "'{answer}' is not one of {}; using '{}'",
                        options.join(", "),
                        default.as_deref().unwrap_or_default()
                    ),
                );
                default.clone()
            };
            Ok(FieldAnswer::Set(chosen.map(Value::from)))
        }
        FieldKind::List { default } => {
            let shown = default
                .as_ref()
                .and_then(|items| serde_json::to_string(items).ok())
                .unwrap_or_default();
            let answer = prompter.ask(label, Some(&shown))?;
            if answer.is_empty() {
                return Ok(FieldAnswer::Set(default.as_deref().map(string_sequence)));
            }
            let items = split_list(&answer);
            if items.is_empty() {
                Ok(FieldAnswer::Set(None))
            } else {
                Ok(FieldAnswer::Set(Some(string_sequence(&items))))
            }
        }
        FieldKind::Ports { default } => {
            let entries = entries_or_current(default.as_deref(), current);
            Ok(FieldAnswer::Ports(ask_ports(prompter, &entries)?))
        }
        FieldKind::Volumes { default } => {
            let entries = entries_or_current(default.as_deref(), current);
            let mut volumes = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry.as_str().and_then(VolumeSpec::parse) {
                    Some(spec) => {
                        let host = ask_volume_host(prompter, &spec)?;
                        volumes.push(Value::from(spec.with_host(&host)));
                    }
                    None => volumes.push(entry),
                }
            }
            Ok(FieldAnswer::Set(Some(Value::Sequence(volumes))))
        }
        FieldKind::Networks { default } => {
            let default = default.clone().unwrap_or(serde_json::Value::Null);
            let shown = match &default {
                serde_json::Value::Array(items) => {
                    items.iter().map(display_json).collect::<Vec<_>>().join(", ")
                }
                serde_json::Value::Object(map) => {
                    map.keys().cloned().collect::<Vec<_>>().join(", ")
                }
                other => display_json(other),
            };
            let answer = prompter.ask(label, Some(&shown))?;
            let names = split_list(&answer);

            if !field.is_top_level() {
                return Ok(match (answer.is_empty(), names.is_empty()) {
                    (true, _) => FieldAnswer::Set(json_to_yaml(&default)?),
                    (false, true) => FieldAnswer::Set(None),
                    (false, false) => FieldAnswer::Set(Some(string_sequence(&names))),
                });
            }

            // the top-level section only ever grows
            if answer.is_empty() {
                return Ok(FieldAnswer::Networks(default_declarations(&default)?));
            }
            let mut declared = Vec::with_capacity(names.len());
            for name in names {
                let scope = ask_network_scope(prompter, &name)?;
                declared.push((name, scope.to_value()));
            }
            Ok(FieldAnswer::Networks(declared))
        }
        FieldKind::Unknown => Ok(FieldAnswer::Skip),
    }
}
