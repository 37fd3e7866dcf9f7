//! Template loading for Dinsum.
//! Templates are directories under the templates root, each holding a
//! `compose.yml` and optionally a `.env` and a `customize.json`.

use crate::config::{parse_schema, Schema};
use crate::constants::{COMPOSE_FILE, ENV_FILE, SCHEMA_FILE};
use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A template read from disk. Never modified after loading.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub root: PathBuf,
    /// Raw `compose.yml` text.
    pub compose: String,
    /// Raw `.env` text, if the template ships one.
    pub env: Option<String>,
    pub schema: Option<Schema>,
}

impl Template {
    /// Files to copy as-is, relative to the template root: everything but
    /// the compose document, the environment defaults and the schema.
    pub fn extra_files(&self) -> Result<Vec<PathBuf>> {
        let handled = [COMPOSE_FILE, ENV_FILE, SCHEMA_FILE];
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::IoError(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| Error::IoError(std::io::Error::other(e)))?;
            if entry.depth() == 1 && handled.iter().any(|name| relative == Path::new(name)) {
                continue;
            }
            files.push(relative.to_path_buf());
        }

        Ok(files)
    }
}

/// Loader for templates from a local templates root.
pub struct LocalLoader<P: AsRef<Path>> {
    root: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    /// Creates a new LocalLoader instance.
    pub fn new(root: P) -> Self {
        Self { root }
    }

    /// Names of the template directories, sorted. A missing root has none.
    pub fn available(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.root.as_ref()) else {
            debug!("Templates root '{}' is not readable.", self.root.as_ref().display());
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// Loads the named template.
    ///
    /// # Errors
    /// * `Error::MissingTemplate` if no such directory exists
    /// * `Error::MissingDocument` if it has no `compose.yml`
    /// * `Error::SchemaError` if `customize.json` is malformed
    pub fn load(&self, name: &str) -> Result<Template> {
        let root = self.root.as_ref().join(name);
        let plain_name = Path::new(name).components().count() == 1 && !name.starts_with('.');
        if !plain_name || !root.is_dir() {
            return Err(Error::MissingTemplate {
                name: name.to_string(),
                available: self.available(),
            });
        }

        let compose_path = root.join(COMPOSE_FILE);
        if !compose_path.is_file() {
            return Err(Error::MissingDocument { template: name.to_string() });
        }
        debug!("Loading compose document from {}", compose_path.display());
        let compose = fs::read_to_string(&compose_path)?;

        let env = read_optional(&root.join(ENV_FILE))?;
        let schema = match read_optional(&root.join(SCHEMA_FILE))? {
            Some(content) => Some(parse_schema(&content)?),
            None => {
                debug!("Template '{name}' has no {SCHEMA_FILE}.");
                None
            }
        };

        Ok(Template { name: name.to_string(), root, compose, env, schema })
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }
    debug!("Loading {}", path.display());
    Ok(Some(fs::read_to_string(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn templates() -> TempDir {
        let dir = TempDir::new().unwrap();
        let nginx = dir.path().join("nginx");
        fs::create_dir_all(nginx.join("conf")).unwrap();
        fs::write(nginx.join(COMPOSE_FILE), "services:\n  web:\n    image: nginx\n").unwrap();
        fs::write(nginx.join(ENV_FILE), "TAG=latest\n").unwrap();
        fs::write(nginx.join("conf").join("default.conf"), "server {}\n").unwrap();
        fs::create_dir_all(dir.path().join("broken")).unwrap();
        dir
    }

    #[test]
    fn test_available_is_sorted() {
        let dir = templates();
        let loader = LocalLoader::new(dir.path());
        assert_eq!(loader.available(), vec!["broken", "nginx"]);
        assert!(LocalLoader::new(dir.path().join("missing")).available().is_empty());
    }

    #[test]
    fn test_load_reads_optional_files() {
        let dir = templates();
        let template = LocalLoader::new(dir.path()).load("nginx").unwrap();

        assert_eq!(template.name, "nginx");
        assert_eq!(template.env.as_deref(), Some("TAG=latest\n"));
        assert!(template.schema.is_none());
        assert_eq!(
            template.extra_files().unwrap(),
            vec![PathBuf::from("conf").join("default.conf")]
        );
    }

    #[test]
    fn test_missing_template_lists_available() {
        let dir = templates();
        match LocalLoader::new(dir.path()).load("postgres") {
            Err(Error::MissingTemplate { name, available }) => {
                assert_eq!(name, "postgres");
                assert_eq!(available, vec!["broken", "nginx"]);
            }
            other => panic!("expected MissingTemplate, got {other:?}"),
        }
    }

    #[test]
    fn test_path_like_names_are_rejected() {
        let dir = templates();
        let loader = LocalLoader::new(dir.path().join("broken"));
        assert!(matches!(loader.load("../nginx"), Err(Error::MissingTemplate { .. })));
    }

    #[test]
    fn test_missing_document() {
        let dir = templates();
        assert!(matches!(
            LocalLoader::new(dir.path()).load("broken"),
            Err(Error::MissingDocument { .. })
        ));
    }
}
