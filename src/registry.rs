//! Template registry: maps a project archetype to the template tree shipped
//! with the tool.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, warn};

use crate::constants::TEMPLATES_DIR;
use crate::error::{Error, Result};

/// Kind of project to scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// Django backend with a Vue + Vite frontend
    VueVite,
    /// Django backend only
    DjangoOnly,
}

impl Archetype {
    /// Every archetype, in menu order.
    pub const ALL: [Archetype; 2] = [Archetype::VueVite, Archetype::DjangoOnly];

    pub fn selector(&self) -> &'static str {
        match self {
            Archetype::VueVite => "vue_vite",
            Archetype::DjangoOnly => "django_only",
        }
    }

    /// Name of the template directory under the templates root.
    pub fn template_dir_name(&self) -> &'static str {
        match self {
            Archetype::VueVite => "vue-vite",
            Archetype::DjangoOnly => "django-only",
        }
    }

    /// Whether the generated project carries a second toolchain manifest
    /// (`package.json`) next to `requirements.txt`.
    pub fn has_frontend(&self) -> bool {
        matches!(self, Archetype::VueVite)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

impl FromStr for Archetype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Archetype::ALL
            .into_iter()
            .find(|archetype| archetype.selector() == s || archetype.template_dir_name() == s)
            .ok_or_else(|| Error::TemplateNotFound(format!("unknown archetype '{s}'")))
    }
}

/// A resolved, read-only template tree on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRoot {
    archetype: Archetype,
    path: PathBuf,
}

impl TemplateRoot {
    pub fn new<P: Into<PathBuf>>(archetype: Archetype, path: P) -> Self {
        Self { archetype, path: path.into() }
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolves archetypes to template roots.
///
/// Resolution is strict by default: an unknown selector or a missing template
/// directory is [`Error::TemplateNotFound`]. A fallback archetype can be opted
/// into with [`TemplateRegistry::with_fallback`], in which case those failures
/// resolve to the fallback template and a warning is logged.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates_dir: PathBuf,
    fallback: Option<Archetype>,
}

impl TemplateRegistry {
    pub fn new<P: Into<PathBuf>>(templates_dir: P) -> Self {
        Self { templates_dir: templates_dir.into(), fallback: None }
    }

    /// Registry over the `templates` directory installed next to the running executable.
    pub fn from_executable() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let install_dir = exe.parent().ok_or_else(|| {
            Error::TemplateNotFound(format!(
                "cannot locate the installation directory of '{}'",
                exe.display()
            ))
        })?;
        Ok(Self::new(install_dir.join(TEMPLATES_DIR)))
    }

    pub fn with_fallback(mut self, fallback: Archetype) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    fn template_path(&self, archetype: Archetype) -> PathBuf {
        self.templates_dir.join(archetype.template_dir_name())
    }

    fn lookup(&self, archetype: Archetype) -> Result<TemplateRoot> {
        let path = self.template_path(archetype);
        if !path.is_dir() {
            return Err(Error::TemplateNotFound(format!(
                "no template for '{}' at '{}'",
                archetype,
                path.display()
            )));
        }
        debug!("Resolved '{}' to '{}'.", archetype, path.display());
        Ok(TemplateRoot::new(archetype, path))
    }

    /// Returns the template root for `archetype`.
    pub fn resolve(&self, archetype: Archetype) -> Result<TemplateRoot> {
        match self.lookup(archetype) {
            Ok(root) => Ok(root),
            Err(err) => match self.fallback {
                Some(fallback) if fallback != archetype => {
                    warn!("{err} Falling back to the '{fallback}' template.");
                    self.lookup(fallback)
                }
                _ => Err(err),
            },
        }
    }

    /// Parses `selector` and resolves it.
    pub fn resolve_selector(&self, selector: &str) -> Result<TemplateRoot> {
        match selector.parse::<Archetype>() {
            Ok(archetype) => self.resolve(archetype),
            Err(err) => match self.fallback {
                Some(fallback) => {
                    warn!("{err} Falling back to the '{fallback}' template.");
                    self.lookup(fallback)
                }
                None => Err(err),
            },
        }
    }
}
