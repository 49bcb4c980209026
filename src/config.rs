//! Per-template configuration.
//!
//! A template root may carry a manifest (`trowel.json`, `trowel.yml` or
//! `trowel.yaml`) extending the built-in rename tokens, exclusions and
//! substitutions. Without one, the defaults alone apply.

use std::path::{Path, PathBuf};

use cruet::Inflector;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::constants::{
    CAMEL_CASE_PROJECT_NAME_KEY, DEFAULT_EXCLUSIONS, MANIFEST_FILES, PROJECT_DIRECTORY_KEY,
    PROJECT_NAME_KEY, PROJECT_NAME_TOKEN, TEMPLATE_SUFFIX,
};
use crate::engine::{ExclusionSet, RenameTable, SubstitutionContext};
use crate::error::{Error, Result};

/// A rename entry as written in a manifest: either a comma-joined string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RenameValue {
    Declaration(String),
    Literals(Vec<String>),
}

/// Template manifest contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Path-segment token -> replacement literal(s)
    pub rename: IndexMap<String, RenameValue>,
    /// Additional excluded segment names, matched exactly
    pub exclude: Vec<String>,
    /// Additional excluded single-segment glob patterns
    pub exclude_patterns: Vec<String>,
    /// Additional content placeholders
    pub substitutions: IndexMap<String, String>,
}

/// Finds the manifest file in `template_root`, if any.
pub fn find_manifest<P: AsRef<Path>>(template_root: P) -> Option<PathBuf> {
    MANIFEST_FILES
        .iter()
        .map(|file| template_root.as_ref().join(file))
        .find(|path| path.is_file())
}

/// Parses manifest content. JSON is used for `.json` files, YAML otherwise.
pub fn parse_manifest(content: &str, is_json: bool) -> Result<Manifest> {
    if content.trim().is_empty() {
        return Ok(Manifest::default());
    }
    let manifest: Manifest = if is_json {
        serde_json::from_str(content)?
    } else {
        serde_yaml::from_str(content)?
    };
    Ok(manifest)
}

/// Loads the manifest from `template_root`, returning the default one if no
/// manifest file is present.
pub fn load_manifest<P: AsRef<Path>>(template_root: P) -> Result<Manifest> {
    let Some(path) = find_manifest(&template_root) else {
        debug!("No manifest in '{}'.", template_root.as_ref().display());
        return Ok(Manifest::default());
    };

    debug!("Loading manifest from {}", path.display());
    let content = std::fs::read_to_string(&path)?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    parse_manifest(&content, is_json)
        .map_err(|e| Error::ManifestError(format!("'{}': {}", path.display(), e)))
}

/// The three transformation inputs handed to the engine for one invocation.
#[derive(Debug, Clone)]
pub struct TemplateConfig {
    pub rename_table: RenameTable,
    pub context: SubstitutionContext,
    pub exclusions: ExclusionSet,
}

impl TemplateConfig {
    /// Builds the transformation inputs for `project_name` from the defaults and
    /// `manifest`. Manifest entries override defaults with the same key.
    ///
    /// Manifest literals and substitution values may themselves contain the
    /// default placeholders (e.g. `{{ project_name }}_api`); they are expanded
    /// against the default context. Manifest file names are always excluded.
    pub fn new(project_name: &str, project_directory: &Path, manifest: &Manifest) -> Result<Self> {
        let mut context = SubstitutionContext::new();
        context.insert(PROJECT_NAME_KEY, project_name);
        context.insert(CAMEL_CASE_PROJECT_NAME_KEY, project_name.to_pascal_case());
        context.insert(PROJECT_DIRECTORY_KEY, project_directory.display().to_string());
        let defaults = context.clone();

        for (key, value) in &manifest.substitutions {
            context.insert(key.as_str(), defaults.apply(value));
        }

        // Manifest tokens go first so they see names before the suffix is stripped.
        let mut rename_table = RenameTable::new();
        for (token, value) in &manifest.rename {
            match value {
                RenameValue::Declaration(declaration) => {
                    rename_table.insert_declaration(token.as_str(), &defaults.apply(declaration))
                }
                RenameValue::Literals(literals) => rename_table.insert_many(
                    token.as_str(),
                    literals.iter().map(|literal| defaults.apply(literal)),
                ),
            }
        }
        if rename_table.get(PROJECT_NAME_TOKEN).is_none() {
            rename_table.insert(PROJECT_NAME_TOKEN, project_name);
        }
        if rename_table.get(TEMPLATE_SUFFIX).is_none() {
            rename_table.insert(TEMPLATE_SUFFIX, "");
        }

        let exclusions = ExclusionSet::new(
            DEFAULT_EXCLUSIONS
                .iter()
                .chain(MANIFEST_FILES.iter())
                .map(|name| name.to_string())
                .chain(manifest.exclude.iter().cloned()),
        )?
        .with_patterns(manifest.exclude_patterns.iter().cloned())?;

        Ok(Self { rename_table, context, exclusions })
    }
}

/// Loads the manifest of `template_root` and builds its [`TemplateConfig`].
pub fn get_config<P: AsRef<Path>>(
    template_root: P,
    project_name: &str,
    project_directory: &Path,
) -> Result<TemplateConfig> {
    let manifest = load_manifest(template_root)?;
    TemplateConfig::new(project_name, project_directory, &manifest)
}
