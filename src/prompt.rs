//! User input and interaction handling.
//! The [`Prompter`] trait is the seam between the orchestrator and the terminal,
//! so the scaffold flow can be driven by scripted answers in tests.

use dialoguer::{Confirm, Input};

use crate::error::Result;

/// Interactive question primitives used by the scaffold flow.
pub trait Prompter {
    /// Asks for free text. An empty answer yields `default` when one is given.
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Asks for an integer. Range checking is left to the caller.
    fn number(&self, prompt: &str) -> Result<i64>;

    /// Asks a yes/no question.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn number(&self, prompt: &str) -> Result<i64> {
        // dialoguer re-asks by itself when the answer does not parse.
        Ok(Input::<i64>::new().with_prompt(prompt).interact_text()?)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new().with_prompt(prompt).default(default).interact()?)
    }
}
