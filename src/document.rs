//! In-memory compose document.
//!
//! Parsing goes through `serde_yaml`; rendering walks the mapping itself so
//! sequences are indented the way compose files are usually written and
//! placeholder strings such as `${PORT_80}:80` are always double-quoted.

use crate::error::{Error, Result};
use log::debug;
use serde_yaml::{Mapping, Value};

/// A parsed `compose.yml`, rooted at a mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeDocument {
    root: Mapping,
}

impl ComposeDocument {
    /// Parses compose text. An empty document yields an empty mapping.
    ///
    /// # Errors
    /// * `Error::SerializationError` if the text is not valid YAML
    /// * `Error::InvalidDocument` if the root is not a mapping
    pub fn parse(text: &str) -> Result<Self> {
        match serde_yaml::from_str::<Value>(text)? {
            Value::Mapping(root) => Ok(Self { root }),
            Value::Null => Ok(Self::default()),
            _ => Err(Error::InvalidDocument("the root must be a mapping".to_string())),
        }
    }

    pub fn root_mut(&mut self) -> &mut Mapping {
        &mut self.root
    }

    /// Reads the value at a dotted key path.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.root.get(first)?, |value, segment| value.get(segment))
    }

    /// Writes `value` at a dotted key path, creating intermediate mappings.
    /// `None` removes the final key; removing a missing key is a no-op.
    pub fn set_path(&mut self, path: &str, value: Option<Value>) {
        set_path(&mut self.root, path, value);
    }

    /// Returns the mapping at a dotted key path, creating it when absent.
    /// An empty path is the root itself.
    pub fn mapping_at_mut(&mut self, path: &str) -> &mut Mapping {
        if path.is_empty() {
            &mut self.root
        } else {
            descend(&mut self.root, path.split('.'))
        }
    }

    /// Name of the first service, in document order.
    pub fn first_service(&self) -> Option<String> {
        self.root
            .get("services")
            .and_then(Value::as_mapping)
            .and_then(|services| services.keys().next())
            .and_then(scalar_key)
    }

    /// Mutable access to one service mapping.
    ///
    /// # Errors
    /// * `Error::InvalidDocument` if the service is missing or not a mapping
    pub fn service_mut(&mut self, name: &str) -> Result<&mut Mapping> {
        self.root
            .get_mut("services")
            .and_then(|services| services.get_mut(name))
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| {
                Error::InvalidDocument(format!("service '{name}' is not a mapping"))
            })
    }

    /// Renders the document as compose YAML text.
    ///
    /// # Errors
    /// * `Error::SerializationError` if a scalar cannot be serialized
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        write_mapping(&mut out, &self.root, 0)?;
        Ok(out)
    }
}

/// Key-path mutator over a bare mapping; see [`ComposeDocument::set_path`].
pub fn set_path(root: &mut Mapping, path: &str, value: Option<Value>) {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (descend(root, parent.split('.')), last),
        None => (root, path),
    };

    match value {
        Some(value) => {
            parent.insert(Value::from(last), value);
        }
        None => {
            if parent.shift_remove(last).is_some() {
                debug!("Removed '{path}'.");
            }
        }
    }
}

/// Replaces `old_key` by `new_key` at the same position. When `old_key` is
/// absent, `new_key` is updated in place or appended.
pub fn replace_entry(map: &mut Mapping, old_key: &str, new_key: &str, value: Value) {
    if old_key == new_key || !map.contains_key(old_key) {
        map.insert(Value::from(new_key), value);
        return;
    }
    map.shift_remove(new_key);

    let mut value = Some(value);
    let entries = std::mem::take(map);
    for (key, existing) in entries {
        if key.as_str() == Some(old_key) {
            if let Some(value) = value.take() {
                map.insert(Value::from(new_key), value);
            }
        } else {
            map.insert(key, existing);
        }
    }
}

fn descend<'a, 'b>(map: &'a mut Mapping, segments: impl Iterator<Item = &'b str>) -> &'a mut Mapping {
    let mut current = map;
    for segment in segments {
        let entry = current
            .entry(Value::from(segment))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !entry.is_mapping() {
            *entry = Value::Mapping(Mapping::new());
        }
        current = match entry {
            Value::Mapping(child) => child,
            _ => unreachable!("entry was just made a mapping"),
        };
    }
    current
}

/// String form of a scalar mapping key or sequence item.
pub fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Items of a sequence value, tagged or not. Anything else has none.
pub fn sequence_items(value: Option<&Value>) -> Vec<Value> {
    value.and_then(Value::as_sequence).cloned().unwrap_or_default()
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

fn write_mapping(out: &mut String, map: &Mapping, indent: usize) -> Result<()> {
    for (key, value) in map {
        pad(out, indent);
        out.push_str(&inline(key)?);
        out.push(':');
        write_nested(out, value, indent)?;
    }
    Ok(())
}

fn write_sequence(out: &mut String, seq: &[Value], indent: usize) -> Result<()> {
    for item in seq {
        pad(out, indent);
        out.push('-');
        match item {
            Value::Mapping(map) if !map.is_empty() => {
                let mut nested = String::new();
                write_mapping(&mut nested, map, indent + 2)?;
                out.push(' ');
                out.push_str(nested.trim_start());
            }
            _ => write_nested(out, item, indent)?,
        }
    }
    Ok(())
}

/// Writes what follows a `key:` or `-` marker.
fn write_nested(out: &mut String, value: &Value, indent: usize) -> Result<()> {
    match value {
        Value::Tagged(tagged) => {
            out.push(' ');
            out.push_str(&tagged.tag.to_string());
            write_nested(out, &tagged.value, indent)
        }
        Value::Mapping(map) if !map.is_empty() => {
            out.push('\n');
            write_mapping(out, map, indent + 2)
        }
        Value::Sequence(seq) if !seq.is_empty() => {
            out.push('\n');
            write_sequence(out, seq, indent + 2)
        }
        _ => {
            out.push(' ');
            out.push_str(&inline(value)?);
            out.push('\n');
            Ok(())
        }
    }
}

/// Strings that are always emitted double-quoted.
fn needs_double_quotes(s: &str) -> bool {
    s.contains("${") || s.contains(':') || s.contains('#') || s.contains('\n')
}

fn inline(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if needs_double_quotes(s) => {
            serde_json::to_string(s).map_err(|e| Error::InvalidDocument(e.to_string()))?
        }
        Value::Mapping(map) if map.is_empty() => "{}".to_string(),
        Value::Sequence(seq) if seq.is_empty() => "[]".to_string(),
        other => {
            let text = serde_yaml::to_string(other)?;
            text.trim_start_matches("--- ").trim_end().to_string()
        }
    })
}
