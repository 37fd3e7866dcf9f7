//! Structural rewrites of a service.
//!
//! These changes touch more than one key at once: choosing `expose` removes
//! `ports` and the other way round, and adding a network updates both the
//! service and the top-level `networks` section.

use crate::document::{replace_entry, scalar_key};
use crate::error::Result;
use crate::prompt::{Prompter, Severity};
use log::{debug, warn};
use serde_yaml::{Mapping, Value};

/// A short-syntax port entry: `host:container` or bare `container`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub host: Option<String>,
    pub container: String,
}

impl PortSpec {
    /// Splits at the last `:`, so `127.0.0.1:8080:80` keeps `127.0.0.1:8080`
    /// as host part.
    pub fn parse(entry: &str) -> Self {
        match entry.rsplit_once(':') {
            Some((host, container)) => {
                Self { host: Some(host.to_string()), container: container.to_string() }
            }
            None => Self { host: None, container: entry.to_string() },
        }
    }

    /// Host part, or the container port when there is none.
    pub fn default_host(&self) -> &str {
        self.host.as_deref().unwrap_or(&self.container)
    }
}

/// A port with its host side decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPort {
    pub host: String,
    pub container: String,
}

impl std::fmt::Display for PublishedPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.container)
    }
}

/// One entry of a published `ports` list.
#[derive(Debug, Clone, PartialEq)]
pub enum PortBinding {
    /// Short syntax with its host side decided.
    Short(PublishedPort),
    /// Long-syntax entry, kept as written.
    Kept(Value),
}

impl PortBinding {
    pub fn to_value(&self) -> Value {
        match self {
            PortBinding::Short(port) => Value::from(port.to_string()),
            PortBinding::Kept(value) => value.clone(),
        }
    }
}

/// Outcome of the ports/expose question.
#[derive(Debug, Clone, PartialEq)]
pub enum PortPlan {
    /// Container ports reachable from other services only.
    Expose(Vec<String>),
    /// Ports bound on the host, in the order of the original entries.
    Publish(Vec<PortBinding>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortMode {
    Expose,
    Publish,
}

/// Asks whether ports are exposed or published. `expose` is the default.
pub fn ask_port_mode(prompter: &dyn Prompter) -> Result<PortMode> {
    prompter.message(Severity::Hint, "ports:  reachable through the host address (e.g. 80:80)");
    prompter.message(Severity::Hint, "expose: reachable by other services only (e.g. behind a proxy)");

    let answer = prompter.ask("Mode (expose/ports)", Some("expose"))?.to_lowercase();
    Ok(match answer.as_str() {
        "" => PortMode::Expose,
        a if a.starts_with('e') => PortMode::Expose,
        a if a.starts_with('p') => PortMode::Publish,
        other => {
            prompter.message(
                Severity::Warning,
                &format!("'{other}' is not a valid mode, using expose"),
            );
            PortMode::Expose
        }
    })
}

/// Container port of a long-syntax entry (`target: 443`).
fn long_syntax_target(entry: &Value) -> Option<String> {
    entry.get("target").and_then(scalar_key)
}

/// Asks for the mode and, when publishing, a host port for every
/// short-syntax entry. Long-syntax entries are not asked about: they are
/// kept when publishing and contribute their `target` when exposing.
pub fn ask_ports(prompter: &dyn Prompter, entries: &[Value]) -> Result<PortPlan> {
    match ask_port_mode(prompter)? {
        PortMode::Expose => {
            let mut containers = Vec::with_capacity(entries.len());
            for entry in entries {
                match scalar_key(entry) {
                    Some(short) => containers.push(PortSpec::parse(&short).container),
                    None => match long_syntax_target(entry) {
                        Some(target) => containers.push(target),
                        None => {
                            warn!("Dropping port entry without a target: {entry:?}");
                            prompter.message(
                                Severity::Warning,
                                "a port entry without a target cannot be exposed and was dropped",
                            );
                        }
                    },
                }
            }
            prompter.message(
                Severity::Hint,
                &format!("-> exposing {}", containers.join(", ")),
            );
            Ok(PortPlan::Expose(containers))
        }
        PortMode::Publish => {
            let mut bindings = Vec::with_capacity(entries.len());
            for entry in entries {
                let Some(short) = scalar_key(entry) else {
                    debug!("Keeping long-syntax port entry as written.");
                    bindings.push(PortBinding::Kept(entry.clone()));
                    continue;
                };
                let spec = PortSpec::parse(&short);
                let default_host = spec.default_host().to_string();
                let answer = prompter.ask(
                    &format!("Host port for {}", spec.container),
                    Some(&default_host),
                )?;
                let host = if answer.is_empty() { default_host } else { answer };
                bindings.push(PortBinding::Short(PublishedPort { host, container: spec.container }));
            }
            Ok(PortPlan::Publish(bindings))
        }
    }
}

/// Writes `expose` in place of `ports`.
pub fn expose_ports(service: &mut Mapping, containers: Vec<String>) {
    let exposed = Value::Sequence(containers.into_iter().map(Value::from).collect());
    replace_entry(service, "ports", "expose", exposed);
    debug!("Replaced ports by expose.");
}

/// Writes `ports` in place of `expose`.
pub fn publish_ports(service: &mut Mapping, entries: Vec<Value>) {
    replace_entry(service, "expose", "ports", Value::Sequence(entries));
    debug!("Replaced expose by ports.");
}

/// Applies a plan with the host ports written literally.
pub fn apply_port_plan(service: &mut Mapping, plan: PortPlan) {
    match plan {
        PortPlan::Expose(containers) => expose_ports(service, containers),
        PortPlan::Publish(bindings) => {
            publish_ports(service, bindings.iter().map(PortBinding::to_value).collect())
        }
    }
}

/// How a network is declared in the top-level `networks` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkScope {
    Default,
    External,
    Internal,
}

impl NetworkScope {
    pub fn to_value(self) -> Value {
        let mut options = Mapping::new();
        match self {
            NetworkScope::Default => {}
            NetworkScope::External => {
                options.insert(Value::from("external"), Value::Bool(true));
            }
            NetworkScope::Internal => {
                options.insert(Value::from("internal"), Value::Bool(true));
            }
        }
        Value::Mapping(options)
    }
}

/// Asks whether a network is external, then whether it is internal.
/// The first yes wins.
pub fn ask_network_scope(prompter: &dyn Prompter, name: &str) -> Result<NetworkScope> {
    if prompter.confirm(&format!("Is '{name}' an external network?"))? {
        return Ok(NetworkScope::External);
    }
    if prompter.confirm(&format!("Is '{name}' an internal network?"))? {
        return Ok(NetworkScope::Internal);
    }
    Ok(NetworkScope::Default)
}

/// Adds a network to a service, keeping the shape of its `networks` entry.
pub fn attach_network(service: &mut Mapping, name: &str) {
    let networks = service
        .entry(Value::from("networks"))
        .or_insert_with(|| Value::Sequence(Vec::new()));

    match networks {
        Value::Mapping(map) => {
            if !map.contains_key(name) {
                map.insert(Value::from(name), Value::Mapping(Mapping::new()));
            }
        }
        Value::Sequence(seq) => {
            if !seq.iter().any(|n| n.as_str() == Some(name)) {
                seq.push(Value::from(name));
            }
        }
        other => *other = Value::Sequence(vec![Value::from(name)]),
    }
}

/// Adds one declaration to a networks section. Other networks are left
/// untouched; redeclaring a name replaces its options.
pub fn declare_network(section: &mut Mapping, name: &str, options: Value) {
    if let Some(previous) = section.insert(Value::from(name), options) {
        debug!("Network '{name}' redeclared, previous options: {previous:?}");
    }
}

/// Declares a network in the top-level `networks` section.
pub fn register_network(root: &mut Mapping, name: &str, scope: NetworkScope) {
    let networks = root
        .entry(Value::from("networks"))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !networks.is_mapping() {
        *networks = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(section) = networks {
        declare_network(section, name, scope.to_value());
    }
}
