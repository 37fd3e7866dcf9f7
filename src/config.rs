//! Configuration handling for Dinsum.
//! Resolves where templates live and parses the `customize.json` field schema
//! that drives the interactive wizard.

use crate::constants::DEFAULT_TEMPLATES_DIR;
use crate::error::{Error, Result};
use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Returns the templates root: the explicit directory if one was given
/// (flag or environment), otherwise `templates/` next to the executable.
pub fn resolve_templates_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        debug!("Using templates directory '{}'.", dir.display());
        return Ok(dir);
    }

    let exe = std::env::current_exe()?;
    let base = exe.parent().map(PathBuf::from).unwrap_or_default();
    let dir = base.join(DEFAULT_TEMPLATES_DIR);
    debug!("Using bundled templates directory '{}'.", dir.display());
    Ok(dir)
}

/// Ordered list of interactive questions declared by a template.
#[derive(Debug, Clone, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// One interactive question and the dotted key path it writes to.
#[derive(Debug, Clone, Deserialize)]
pub struct Field {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl Field {
    /// Text shown in front of the answer; falls back to the key path.
    pub fn prompt_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.key
        } else {
            &self.label
        }
    }

    /// Whether the field targets a top-level section rather than a nested key.
    pub fn is_top_level(&self) -> bool {
        !self.key.contains('.')
    }
}

/// The closed set of field kinds, each with its own default payload.
///
/// Types this version does not know about deserialize as [`FieldKind::Unknown`]
/// so that newer schemas still load; the wizard skips such fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text {
        #[serde(default)]
        default: Option<serde_json::Value>,
    },
    Select {
        #[serde(default)]
        options: Vec<String>,
        #[serde(default)]
        default: Option<String>,
    },
    List {
        #[serde(default, deserialize_with = "string_list")]
        default: Option<Vec<String>>,
    },
    Ports {
        #[serde(default, deserialize_with = "string_list")]
        default: Option<Vec<String>>,
    },
    Volumes {
        #[serde(default, deserialize_with = "string_list")]
        default: Option<Vec<String>>,
    },
    /// Names as a list, or for the top-level section a name -> options mapping.
    Networks {
        #[serde(default)]
        default: Option<serde_json::Value>,
    },
    #[serde(other)]
    Unknown,
}

/// Accepts a list of strings or numbers (`["80:80", 443]`).
fn string_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    values
        .map(|values| {
            values
                .into_iter()
                .map(|value| match value {
                    serde_json::Value::String(s) => Ok(s),
                    serde_json::Value::Number(n) => Ok(n.to_string()),
                    other => Err(D::Error::custom(format!(
                        "expected a string or a number, got {other}"
                    ))),
                })
                .collect()
        })
        .transpose()
}

/// Parses the content of a `customize.json` file.
///
/// # Errors
/// * `Error::SchemaError` if the content is not a valid schema
pub fn parse_schema(content: &str) -> Result<Schema> {
    serde_json::from_str(content).map_err(|e| Error::SchemaError(e.to_string()))
}
