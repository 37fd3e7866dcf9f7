//! Command-line interface implementation for Dinsum.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

use crate::constants::TEMPLATES_DIR_ENV;

/// Command-line arguments structure for Dinsum.
#[derive(Parser, Debug)]
#[command(author, version, about = "Dinsum: Docker Compose templates with an interactive wizard", long_about = None)]
pub struct Args {
    /// Name of the template to scaffold
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Directory where compose.yml and .env are written
    #[arg(value_name = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Directory holding the available templates
    #[arg(short, long, value_name = "DIR", env = TEMPLATES_DIR_ENV)]
    pub templates_dir: Option<PathBuf>,

    /// Overwrite compose.yml and .env if they already exist in the output directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Copy the template unmodified without asking to customize it
    #[arg(long)]
    pub skip_customize: bool,

    /// Use plain line-based prompts even when attached to a terminal
    #[arg(long)]
    pub plain: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
