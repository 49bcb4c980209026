//! Request validation performed before anything touches the filesystem.
//!
//! Checks here only judge whether a request is sane. Whether the destination
//! is safe to write is decided by the engine when it creates the directory.

use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::constants::DEFAULT_OUTPUT_PATH;
use crate::error::{Error, Result};
use crate::prompt::Prompter;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"));

/// Returns the final segment of `output_path`, ignoring trailing separators.
pub fn terminal_segment(output_path: &str) -> Option<String> {
    let trimmed = output_path.trim_end_matches(&['/', '\\'][..]);
    Path::new(trimmed).file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Fails with [`Error::NameCollision`] when the project name equals the last
/// segment of the output path.
///
/// # Examples
/// ```
/// use trowel::validate::validate;
///
/// assert!(validate("foo", "/a/b/foo").is_err());
/// assert!(validate("foo", "/a/b/bar").is_ok());
/// ```
pub fn validate(project_name: &str, output_path: &str) -> Result<()> {
    if terminal_segment(output_path).as_deref() == Some(project_name) {
        return Err(Error::NameCollision {
            project_name: project_name.to_string(),
            output_path: output_path.to_string(),
        });
    }
    Ok(())
}

/// The name becomes a Python package (`<name>`, `<name>_api`, ...) inside the
/// generated project, so it has to be a valid identifier.
pub fn validate_project_name(project_name: &str) -> Result<()> {
    let reason = if project_name.is_empty() {
        "name must not be empty"
    } else if !IDENTIFIER_RE.is_match(project_name) {
        "use only letters, digits and underscores, and do not start with a digit"
    } else {
        return Ok(());
    };

    Err(Error::InvalidProjectName {
        project_name: project_name.to_string(),
        reason: reason.to_string(),
    })
}

pub fn is_default_path(output_path: &str) -> bool {
    output_path == DEFAULT_OUTPUT_PATH
}

/// Asks for explicit confirmation before scaffolding into the default path.
///
/// Returns [`Error::UserAborted`] when the user declines. Non-default paths and
/// `assume_yes` pass straight through without prompting.
pub fn confirm_output_path(
    prompt: &dyn Prompter,
    output_path: &str,
    assume_yes: bool,
) -> Result<()> {
    if !is_default_path(output_path) {
        return Ok(());
    }
    if assume_yes {
        debug!("Default output path pre-confirmed.");
        return Ok(());
    }

    let question = format!(
        "Custom output path was not provided. This will generate your project in {output_path}. Continue?"
    );
    if prompt.confirm(&question, false)? {
        Ok(())
    } else {
        Err(Error::UserAborted)
    }
}
