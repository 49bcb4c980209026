//! Error handling for trowel.
//! Defines the error type and result alias used throughout the crate.

use thiserror::Error;

/// Custom error types for trowel operations.
///
/// Validation failures (name collisions, existing destinations, declined
/// confirmations) are distinguished from unexpected failures so the binary can
/// pick an exit code and remediation message for each.
#[derive(Error, Debug)]
pub enum Error {
    /// The project name equals the final segment of the output path.
    #[error("Project name '{project_name}' cannot be the same as the directory in your output path ({output_path}).")]
    NameCollision { project_name: String, output_path: String },

    /// The project name cannot be used as a package identifier.
    #[error("Invalid project name '{project_name}': {reason}.")]
    InvalidProjectName { project_name: String, reason: String },

    /// A directory creation step targeted a path that already exists.
    #[error("Output path already exists ({path}); please delete it first.")]
    DestinationExists { path: String },

    /// The user declined a confirmation gate.
    #[error("Aborted.")]
    UserAborted,

    /// No template is registered for the requested archetype.
    #[error("Template not found: {0}.")]
    TemplateNotFound(String),

    /// Two template entries rendered to the same output path.
    #[error("Template entries '{first}' and '{second}' both render to '{target}'.")]
    OutputCollision { first: String, second: String, target: String },

    /// Represents errors in the template manifest.
    #[error("Manifest error: {0}.")]
    ManifestError(String),

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// Represents errors that occur while walking a template tree
    #[error("Walk error: {0}.")]
    WalkError(#[from] walkdir::Error),

    /// Represents invalid exclusion patterns
    #[error("Exclusion pattern error: {0}.")]
    GlobError(#[from] globset::Error),

    /// Represents errors raised by the interactive prompts
    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),

    #[error("YAML error: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Returns true for failures caused by the request itself rather than the
    /// environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NameCollision { .. }
                | Error::InvalidProjectName { .. }
                | Error::DestinationExists { .. }
                | Error::UserAborted
        )
    }

    /// Process exit code for this error: `1` for validation failures, `2` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_validation() {
            1
        } else {
            2
        }
    }
}

/// Convenience type alias for Results with trowel's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Message printed before any unexpected failure.
pub const REMEDIATION_MESSAGE: &str =
    "Something went wrong. Check the template directory and try your command again.";

/// Default error handler that prints the error and exits the program.
///
/// Validation errors are printed as-is. Unexpected errors print the generic
/// remediation message first and then the underlying failure detail.
pub fn default_error_handler(err: Error) {
    if !err.is_validation() {
        eprintln!("{REMEDIATION_MESSAGE}");
    }
    eprintln!("{err}");
    std::process::exit(err.exit_code());
}
