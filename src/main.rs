//! trowel's main application entry point.
//! Parses arguments, gathers the scaffold request and reports the outcome.

use trowel::{
    checklist::render_checklist,
    cli::{get_args, Args},
    error::{default_error_handler, Result},
    prompt::DialoguerPrompter,
    registry::{Archetype, TemplateRegistry},
    scaffold::{scaffold, ScaffoldRequest},
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Locates the template registry
/// 2. Prompts for any value not given on the command line
/// 3. Validates, resolves and materializes the template
/// 4. Creates the API app and prints the checklist
fn run(args: Args) -> Result<()> {
    let prompt = DialoguerPrompter::new();

    let mut registry = match args.templates_dir {
        Some(dir) => TemplateRegistry::new(dir),
        None => TemplateRegistry::from_executable()?,
    };
    if args.fallback {
        registry = registry.with_fallback(Archetype::DjangoOnly);
    }

    let request = ScaffoldRequest::gather(&prompt, args.name, args.archetype, args.output)?;
    let report = scaffold(&prompt, &registry, &request, args.yes)?;

    println!("Done! 🎉🎉🎉");
    println!("{}", render_checklist(report.archetype));
    Ok(())
}
