//! Dinsum scaffolds Docker Compose templates into a working directory.
//! It can copy a template as-is or walk the user through an interactive
//! wizard that customizes the compose document and its environment file.

/// Command-line interface module for the Dinsum application
pub mod cli;

/// Templates root resolution and the `customize.json` field schema
pub mod config;

/// File names and other shared constants
pub mod constants;

/// Compose document parsing, key-path mutation and rendering
pub mod document;

/// `.env` files and externalized variables
pub mod env;

/// Error types and handling for the Dinsum application
pub mod error;

/// One prompt per schema field type
pub mod fields;

/// Template lookup and loading
pub mod loader;

pub mod logger;

/// User input and interaction handling
pub mod prompt;

/// Rewrites spanning several keys: ports/expose and networks
pub mod rewrite;

/// Orchestrates a wizard run from template to output text
pub mod wizard;

/// Writes the generated files to the output directory
pub mod writer;
