//! Environment files and externalized variables.
//!
//! A template's `.env` is kept line by line so comments and blank lines
//! survive a round trip. Values the wizard lifts out of the compose
//! document are collected in [`Variables`] and rendered after a
//! generated-by header.

use std::sync::LazyLock;

use indexmap::IndexMap;
use log::{debug, warn};
use regex::Regex;

use crate::constants::ENV_HEADER;
use crate::error::Result;
use crate::prompt::Prompter;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("static pattern is valid"));

/// Variable holding the container name.
pub const CONTAINER_NAME_VAR: &str = "CONTAINER_NAME";

/// Variable for the host side of a published port: `PORT_<container>`.
pub fn port_var(container_port: &str) -> String {
    format!("PORT_{container_port}")
}

/// Variable for the host side of a volume, derived from its container path.
///
/// Non-alphanumeric runs become a single `_`, the result is uppercased,
/// prefixed with `VOL` and stripped of a trailing `_`:
/// `/etc/nginx/nginx.conf` gives `VOL_ETC_NGINX_NGINX_CONF`.
pub fn volume_var(container_path: &str) -> String {
    let cleaned = NON_ALPHANUMERIC.replace_all(container_path, "_").to_uppercase();
    format!("VOL{cleaned}").trim_end_matches('_').to_string()
}

/// `${NAME}` reference used in place of an externalized value.
pub fn placeholder(name: &str) -> String {
    format!("${{{name}}}")
}

/// Values lifted out of the document, in first-recorded order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Variables {
    values: IndexMap<String, String>,
}

impl Variables {
    /// Records `name=value` and returns the placeholder to put in the document.
    ///
    /// A second value under the same name replaces the first one.
    pub fn record(&mut self, name: &str, value: impl Into<String>) -> String {
        let value = value.into();
        if let Some(previous) = self.values.insert(name.to_string(), value.clone()) {
            if previous != value {
                warn!("Variable {name} was already set to '{previous}', now '{value}'.");
            }
        }
        placeholder(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum EnvLine {
    Entry { key: String, value: String, raw: String },
    Verbatim(String),
}

/// A `.env` file as an ordered list of lines.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvFile {
    lines: Vec<EnvLine>,
}

impl EnvFile {
    /// Splits `KEY=value` lines from everything else. Rendering an
    /// untouched file gives back the exact input text.
    pub fn parse(text: &str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| {
                let trimmed = line.trim_start();
                match line.split_once('=') {
                    Some((key, value)) if !trimmed.starts_with('#') && !key.trim().is_empty() => {
                        EnvLine::Entry {
                            key: key.trim().to_string(),
                            value: value.trim().to_string(),
                            raw: line.to_string(),
                        }
                    }
                    _ => EnvLine::Verbatim(line.to_string()),
                }
            })
            .collect();
        Self { lines }
    }

    /// A fresh file: the generated-by header followed by one line per variable.
    pub fn generated(variables: &Variables) -> Self {
        let mut file = Self { lines: vec![EnvLine::Verbatim(ENV_HEADER.to_string())] };
        for (key, value) in variables.iter() {
            file.set(key, value);
        }
        file.lines.push(EnvLine::Verbatim(String::new()));
        file
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            EnvLine::Entry { key: k, value, .. } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Keys in file order.
    pub fn keys(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                EnvLine::Entry { key, .. } => Some(key.clone()),
                EnvLine::Verbatim(_) => None,
            })
            .collect()
    }

    /// Updates an existing entry in place or appends a new one before any
    /// trailing blank line.
    pub fn set(&mut self, key: &str, value: &str) {
        let new_line = EnvLine::Entry {
            key: key.to_string(),
            value: value.to_string(),
            raw: format!("{key}={value}"),
        };

        let existing = self
            .lines
            .iter_mut()
            .find(|line| matches!(line, EnvLine::Entry { key: k, .. } if k == key));
        if let Some(line) = existing {
            if let EnvLine::Entry { value: current, .. } = &*line {
                if current.as_str() == value {
                    return;
                }
            }
            *line = new_line;
            return;
        }

        let at = match self.lines.last() {
            Some(EnvLine::Verbatim(last)) if last.is_empty() => self.lines.len() - 1,
            _ => self.lines.len(),
        };
        self.lines.insert(at, new_line);
    }

    /// Merges externalized variables into this file.
    pub fn merge(&mut self, variables: &Variables) {
        for (key, value) in variables.iter() {
            self.set(key, value);
        }
    }

    /// Asks for every declared key in file order; an empty answer keeps
    /// the current value and the original line text.
    pub fn prompt_values(&mut self, prompter: &dyn Prompter) -> Result<()> {
        for key in self.keys() {
            let current = self.get(&key).unwrap_or_default().to_string();
            let answer = prompter.ask(&key, Some(&current))?;
            if !answer.is_empty() {
                debug!("Setting {key} in .env.");
                self.set(&key, &answer);
            }
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                EnvLine::Entry { raw, .. } => raw.as_str(),
                EnvLine::Verbatim(text) => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
