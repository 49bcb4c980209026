//! Scaffold orchestration.
//! Sequences validation, template resolution, materialization and the API app
//! post-steps for a single invocation.

use std::fs;
use std::path::{Path, PathBuf};

use cruet::Inflector;
use log::debug;

use crate::config::get_config;
use crate::constants::{DEFAULT_OUTPUT_PATH, EMPTY_ROUTES};
use crate::engine::{create_new_dir, materialize, OutputTree};
use crate::error::Result;
use crate::prompt::Prompter;
use crate::registry::{Archetype, TemplateRegistry};
use crate::validate::{confirm_output_path, validate, validate_project_name};

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldRequest {
    pub project_name: String,
    /// Archetype selector, e.g. `vue_vite`
    pub archetype: String,
    pub output_path: String,
}

impl ScaffoldRequest {
    /// Builds a request, prompting for every value not already provided.
    pub fn gather(
        prompt: &dyn Prompter,
        project_name: Option<String>,
        archetype: Option<String>,
        output_path: Option<String>,
    ) -> Result<Self> {
        let project_name = match project_name {
            Some(name) => name,
            None => ask_project_name(prompt)?,
        };
        let archetype = match archetype {
            Some(selector) => selector,
            None => choose_archetype(prompt)?.selector().to_string(),
        };
        // A blank flag means the default, the same as a blank answer.
        let output_path = match output_path {
            Some(path) if path.trim().is_empty() => DEFAULT_OUTPUT_PATH.to_string(),
            Some(path) => path,
            None => ask_output_path(prompt)?,
        };
        Ok(Self { project_name, archetype, output_path })
    }
}

/// Result of a successful scaffold.
#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    pub archetype: Archetype,
    pub tree: OutputTree,
    pub api_app_dir: PathBuf,
}

pub fn ask_project_name(prompt: &dyn Prompter) -> Result<String> {
    let project_name = prompt.text("Please enter the project name", None)?;
    println!("Project name: {project_name}");
    Ok(project_name)
}

/// Prints the numbered archetype menu and asks until a listed number is entered.
pub fn choose_archetype(prompt: &dyn Prompter) -> Result<Archetype> {
    let archetypes = Archetype::ALL;
    loop {
        println!("Please choose a project type:");
        for (i, archetype) in archetypes.iter().enumerate() {
            println!("{}. {}", i + 1, archetype);
        }

        let choice = prompt.number("Enter the number of your choice")?;
        let selected = usize::try_from(choice)
            .ok()
            .and_then(|choice| choice.checked_sub(1))
            .and_then(|index| archetypes.get(index));
        match selected {
            Some(archetype) => {
                println!("You chose: {archetype}");
                return Ok(*archetype);
            }
            None => println!(
                "Invalid choice. Please choose a number between 1 and {}.",
                archetypes.len()
            ),
        }
    }
}

pub fn ask_output_path(prompt: &dyn Prompter) -> Result<String> {
    let output_path = prompt.text(
        "Please enter the path for the project. If left blank, the project will be created in",
        Some(DEFAULT_OUTPUT_PATH),
    )?;
    let output_path = if output_path.trim().is_empty() {
        DEFAULT_OUTPUT_PATH.to_string()
    } else {
        output_path
    };
    println!("Project path: {output_path}");
    Ok(output_path)
}

fn api_app_files(app_name: &str) -> Vec<(&'static str, String)> {
    let config_class = format!("{}Config", app_name.to_pascal_case());
    vec![
        ("__init__.py", String::new()),
        ("admin.py", "from django.contrib import admin\n\n# Register your models here.\n".to_string()),
        (
            "apps.py",
            format!(
                "from django.apps import AppConfig\n\n\nclass {config_class}(AppConfig):\n    default_auto_field = 'django.db.models.BigAutoField'\n    name = '{app_name}'\n"
            ),
        ),
        ("migrations/__init__.py", String::new()),
        ("models.py", "from django.db import models\n\n# Create your models here.\n".to_string()),
        ("tests.py", "from django.test import TestCase\n\n# Create your tests here.\n".to_string()),
        ("views.py", "from django.shortcuts import render\n\n# Create your views here.\n".to_string()),
        ("urls.py", EMPTY_ROUTES.to_string()),
    ]
}

/// Creates `<output_dir>/src/<project_name>_api` with a Django app skeleton and
/// an empty route table.
///
/// # Errors
/// * `Error::DestinationExists` if the app directory is already there
pub fn create_api_app<P: AsRef<Path>>(project_name: &str, output_dir: P) -> Result<PathBuf> {
    let app_name = format!("{project_name}_api");
    let app_dir = output_dir.as_ref().join("src").join(&app_name);

    println!("Creating {app_name} app...");
    create_new_dir(&app_dir)?;

    for (file, content) in api_app_files(&app_name) {
        let path = app_dir.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Writing file: {}", path.display());
        fs::write(&path, content)?;
    }

    Ok(app_dir)
}

/// Runs the whole pipeline for `request`.
///
/// Nothing touches the filesystem until validation, the default-path
/// confirmation and template resolution have all passed. After that, failures
/// leave whatever was already written in place.
pub fn scaffold(
    prompt: &dyn Prompter,
    registry: &TemplateRegistry,
    request: &ScaffoldRequest,
    assume_yes: bool,
) -> Result<ScaffoldReport> {
    let ScaffoldRequest { project_name, archetype, output_path } = request;

    validate_project_name(project_name)?;
    validate(project_name, output_path)?;
    confirm_output_path(prompt, output_path, assume_yes)?;

    let template_root = registry.resolve_selector(archetype)?;
    let output_dir = PathBuf::from(output_path);
    let project_directory = std::path::absolute(&output_dir)?;
    let config = get_config(template_root.path(), project_name, &project_directory)?;

    println!("Creating base directory for the {project_name} project at {output_path}");
    let tree = materialize(
        template_root.path(),
        &output_dir,
        &config.rename_table,
        &config.context,
        &config.exclusions,
    )?;
    debug!("Materialized {} files.", tree.files().len());

    let api_app_dir = create_api_app(project_name, &output_dir)?;

    Ok(ScaffoldReport { archetype: template_root.archetype(), tree, api_app_dir })
}
