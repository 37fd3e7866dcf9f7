//! Writes the wizard output into the target directory.

use crate::constants::{COMPOSE_FILE, ENV_FILE};
use crate::error::{Error, Result};
use crate::loader::Template;
use crate::wizard::Output;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths a run may write, relative to the output directory.
///
/// `.env` is included when the template ships one or when the built-in
/// questions could generate one.
pub fn planned_files(template: &Template) -> Result<Vec<PathBuf>> {
    let mut files = vec![PathBuf::from(COMPOSE_FILE)];
    if template.env.is_some() || template.schema.is_none() {
        files.push(PathBuf::from(ENV_FILE));
    }
    files.extend(template.extra_files()?);
    Ok(files)
}

/// Checks that the output directory can receive the files.
///
/// # Errors
/// * `Error::OutputExists` for the first planned file already present,
///   unless `force` is set
pub fn ensure_writable<P: AsRef<Path>>(
    output_dir: P,
    template: &Template,
    force: bool,
) -> Result<()> {
    if force {
        return Ok(());
    }
    for relative in planned_files(template)? {
        let target = output_dir.as_ref().join(relative);
        if target.exists() {
            return Err(Error::OutputExists { path: target.display().to_string() });
        }
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest)?;
    Ok(())
}

/// Writes `compose.yml`, `.env` when there is one, and the remaining
/// template files. Returns the written paths in order.
pub fn write_output<P: AsRef<Path>>(
    output_dir: P,
    output: &Output,
    template: &Template,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    let mut written = Vec::new();

    let compose_path = output_dir.join(COMPOSE_FILE);
    write_file(&compose_path, &output.compose)?;
    written.push(compose_path);

    if let Some(env) = &output.env {
        let env_path = output_dir.join(ENV_FILE);
        write_file(&env_path, env)?;
        written.push(env_path);
    }

    for relative in template.extra_files()? {
        let dest = output_dir.join(&relative);
        debug!("Copying file: {}", dest.display());
        copy_file(&template.root.join(&relative), &dest)?;
        written.push(dest);
    }

    Ok(written)
}
