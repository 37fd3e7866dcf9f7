//! Dinsum's main application entry point.
//! Handles command-line argument parsing and coordinates loading the
//! template, running the wizard and writing the result.

use dinsum::{
    cli::{get_args, Args},
    config::resolve_templates_dir,
    error::{default_error_handler, Result},
    loader::LocalLoader,
    logger::init_logger,
    prompt::{session, Severity},
    wizard,
    writer::{ensure_writable, write_output},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Resolves the templates root and loads the named template
/// 2. Checks the output directory before any question is asked
/// 3. Runs the wizard inside one prompt session
/// 4. Writes compose.yml, .env and the remaining template files
fn run(args: Args) -> Result<()> {
    let templates_root = resolve_templates_dir(args.templates_dir)?;
    let template = LocalLoader::new(templates_root).load(&args.template)?;
    ensure_writable(&args.output_dir, &template, args.force)?;

    // the session is released before the result is inspected, on both paths
    let output = {
        let prompter = session(args.plain);
        prompter.message(Severity::Heading, "--- DINSUM COMPOSE ---");
        wizard::run(&template, &*prompter, args.skip_customize)
    }?;

    let written = write_output(&args.output_dir, &output, &template)?;
    for path in &written {
        println!("Created: '{}'", path.display());
    }
    if !output.customized {
        println!("Template '{}' copied without changes.", template.name);
    }
    println!("Use 'docker compose up -d' to start.");
    Ok(())
}
