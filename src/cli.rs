//! Command-line interface implementation for trowel.
//! Every value can be passed as a flag; anything missing is asked for interactively.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments structure for trowel.
#[derive(Parser, Debug)]
#[command(author, version, about = "trowel: interactive project scaffolding tool", long_about = None)]
pub struct Args {
    /// Project name; prompted for when omitted
    #[arg(short, long)]
    pub name: Option<String>,

    /// Project archetype (vue_vite, django_only); chosen from a menu when omitted
    #[arg(short, long)]
    pub archetype: Option<String>,

    /// Directory where the project will be created; prompted for when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory holding the templates. Defaults to `templates` next to the executable
    #[arg(long, value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Use the django_only template when the requested archetype is unknown
    /// or has no template, instead of failing
    #[arg(long)]
    pub fallback: bool,

    /// Answer yes to the confirmation for the default output path
    #[arg(short, long)]
    pub yes: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
pub fn get_args() -> Args {
    Args::parse()
}
