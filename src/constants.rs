//! Common constants used throughout the Dinsum application.

/// Compose document inside a template and in the output directory
pub const COMPOSE_FILE: &str = "compose.yml";

/// Field schema descriptor, never copied to the output
pub const SCHEMA_FILE: &str = "customize.json";

/// Environment defaults inside a template and in the output directory
pub const ENV_FILE: &str = ".env";

/// First line of every generated environment file
pub const ENV_HEADER: &str = "# Generated by Dinsum";

/// Environment variable that overrides the templates root
pub const TEMPLATES_DIR_ENV: &str = "DINSUM_TEMPLATES_DIR";

/// Directory next to the executable holding the bundled templates
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
