//! Error handling for the Dinsum application.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for Dinsum operations.
///
/// Every variant here is fatal for the current run. Recoverable conditions
/// (an invalid select answer, an unknown field type, a template without a
/// schema) are reported to the user through the prompt session instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The named template directory does not exist under the templates root.
    #[error("Template '{name}' not found. Available templates: {}.", list_or_none(.available))]
    MissingTemplate { name: String, available: Vec<String> },

    /// The template exists but has no compose document.
    #[error("compose.yml not found in template '{template}'.")]
    MissingDocument { template: String },

    /// The compose document does not have the shape the wizard needs.
    #[error("Invalid compose document: {0}.")]
    InvalidDocument(String),

    /// The field schema could not be parsed.
    #[error("Invalid customize.json: {0}.")]
    SchemaError(String),

    /// Output would overwrite an existing file without `--force`.
    #[error("'{path}' already exists. Use --force to overwrite it.")]
    OutputExists { path: String },

    /// Terminal interaction failed (closed stdin, not a terminal, ...).
    #[error("Prompt error: {0}.")]
    PromptError(String),

    #[error("Serialization error: {0}.")]
    SerializationError(#[from] serde_yaml::Error),

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}
