#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use trowel::error::Result;
use trowel::prompt::Prompter;

#[derive(Debug, Clone)]
pub enum Answer {
    Text(String),
    Number(i64),
    Confirm(bool),
}

/// Prompter replaying a fixed list of answers.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self { answers: RefCell::new(answers.into()), asked: RefCell::new(Vec::new()) }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, prompt: &str) -> Answer {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers.borrow_mut().pop_front().expect("no scripted answer left")
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        match self.next(prompt) {
            Answer::Text(text) if text.is_empty() => Ok(default.unwrap_or_default().to_string()),
            Answer::Text(text) => Ok(text),
            other => panic!("expected a text answer for '{prompt}', got {other:?}"),
        }
    }

    fn number(&self, prompt: &str) -> Result<i64> {
        match self.next(prompt) {
            Answer::Number(n) => Ok(n),
            other => panic!("expected a number answer for '{prompt}', got {other:?}"),
        }
    }

    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        match self.next(prompt) {
            Answer::Confirm(yes) => Ok(yes),
            other => panic!("expected a confirmation for '{prompt}', got {other:?}"),
        }
    }
}

/// Writes `files` (relative path, content) under `root`.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

/// Directory with the templates shipped in this repository.
pub fn shipped_templates() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}
