//! trowel is an interactive project scaffolding tool.
//! It materializes a new project tree from a shipped template, renaming
//! placeholder paths, substituting placeholder text and skipping excluded paths.

/// Post-create checklist rendering
pub mod checklist;

/// Command-line interface module for the trowel application
pub mod cli;

/// Per-template configuration
/// Supports JSON and YAML manifests (trowel.json, trowel.yml, trowel.yaml)
pub mod config;

/// Common constants
pub mod constants;

/// Template instantiation engine
/// Handles the walk, rename, substitution and exclusion passes
pub mod engine;

/// Error types and handling for the trowel application
pub mod error;

/// User input and interaction handling
pub mod prompt;

/// Archetype to template root resolution
pub mod registry;

/// Orchestration of a complete scaffold run
pub mod scaffold;

/// Project name and output path validation
pub mod validate;
