//! Template instantiation engine.
//!
//! Turns a template tree into a fresh project tree in two independent passes:
//! a rename pass over path segments driven by a [`RenameTable`], and a content
//! pass over text files driven by a [`SubstitutionContext`]. Paths containing a
//! segment listed in the [`ExclusionSet`] are pruned before either pass runs.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use log::debug;
use walkdir::WalkDir;

use crate::constants::BINARY_SNIFF_LEN;
use crate::error::{Error, Result};

/// Ordered mapping from a path-segment token to the literals replacing it.
///
/// A token mapped to several literals expands every path containing it into one
/// output path per literal. Tokens are applied in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameTable {
    entries: IndexMap<String, Vec<String>>,
}

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `token` to a single literal, replacing any previous mapping.
    pub fn insert<T: Into<String>, L: Into<String>>(&mut self, token: T, literal: L) {
        self.entries.insert(token.into(), vec![literal.into()]);
    }

    /// Maps `token` to several literals, replacing any previous mapping.
    pub fn insert_many<T, I, L>(&mut self, token: T, literals: I)
    where
        T: Into<String>,
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.entries.insert(token.into(), literals.into_iter().map(Into::into).collect());
    }

    /// Maps `token` to a comma-joined declaration such as
    /// `"Dockerfile,Dockerfile.prod"`. Surrounding whitespace is trimmed and
    /// empty items are dropped. A declaration with no items strips the token,
    /// the same as `insert(token, "")`.
    pub fn insert_declaration<T: Into<String>>(&mut self, token: T, declaration: &str) {
        let literals: Vec<&str> = declaration
            .split(',')
            .map(str::trim)
            .filter(|literal| !literal.is_empty())
            .collect();
        if literals.is_empty() {
            self.insert(token, "");
        } else {
            self.insert_many(token, literals);
        }
    }

    pub fn get(&self, token: &str) -> Option<&[String]> {
        self.entries.get(token).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(token, literals)| (token.as_str(), literals.as_slice()))
    }

    /// Applies every token to one path segment and returns each resulting variant.
    ///
    /// # Examples
    /// ```
    /// use trowel::engine::RenameTable;
    ///
    /// let mut table = RenameTable::new();
    /// table.insert("project_name", "acme");
    /// table.insert_declaration("env.tmpl", ".env,.env.prod");
    ///
    /// assert_eq!(table.rename_segment("project_name_auth"), vec!["acme_auth"]);
    /// assert_eq!(table.rename_segment("env.tmpl"), vec![".env", ".env.prod"]);
    /// assert_eq!(table.rename_segment("README.md"), vec!["README.md"]);
    /// ```
    pub fn rename_segment(&self, segment: &str) -> Vec<String> {
        let mut variants = vec![segment.to_string()];
        for (token, literals) in &self.entries {
            if token.is_empty() {
                continue;
            }
            variants = variants
                .into_iter()
                .flat_map(|variant| {
                    if variant.contains(token.as_str()) {
                        literals.iter().map(|literal| variant.replace(token.as_str(), literal)).collect()
                    } else {
                        vec![variant]
                    }
                })
                .collect();
        }
        variants
    }

    /// Renames every segment of a relative path.
    ///
    /// Returns the cartesian product of the per-segment variants. Variants
    /// where a segment renders to an empty, `.` or `..` name are dropped, so an
    /// empty result means the entry must not be written at all. Segments that
    /// are not valid UTF-8 cannot hold a token and are kept unchanged.
    pub fn rename_path(&self, relative: &Path) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::new()];
        for component in relative.iter() {
            let segments: Vec<OsString> = match component.to_str() {
                Some(segment) => self
                    .rename_segment(segment)
                    .into_iter()
                    .filter(|segment| is_valid_segment(segment))
                    .map(OsString::from)
                    .collect(),
                None => vec![component.to_os_string()],
            };
            paths = paths
                .iter()
                .flat_map(|prefix| segments.iter().map(move |segment| prefix.join(segment)))
                .collect();
        }
        paths
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

/// Ordered mapping from a content placeholder to its literal value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionContext {
    values: IndexMap<String, String>,
}

impl SubstitutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces every occurrence of each key, in insertion order.
    pub fn apply(&self, content: &str) -> String {
        self.values
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .fold(content.to_string(), |acc, (key, value)| acc.replace(key.as_str(), value))
    }
}

/// Path segments that are never copied.
///
/// Names match a segment exactly. Glob patterns (`*.pyc`) added with
/// [`ExclusionSet::with_patterns`] are matched against a single segment.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    names: Vec<String>,
    patterns: Vec<String>,
    matcher: GlobSet,
}

impl ExclusionSet {
    /// Builds a set matching each of `names` literally.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect();
        Self::build(names, Vec::new())
    }

    /// Adds single-segment glob patterns.
    pub fn with_patterns<I, S>(self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = self.patterns;
        all.extend(patterns.into_iter().map(Into::into));
        Self::build(self.names, all)
    }

    fn build(names: Vec<String>, patterns: Vec<String>) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for name in &names {
            builder.add(Glob::new(&globset::escape(name))?);
        }
        for pattern in &patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self { names, patterns, matcher: builder.build()? })
    }

    pub fn empty() -> Self {
        Self { names: Vec::new(), patterns: Vec::new(), matcher: GlobSet::empty() }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn matches_segment<S: AsRef<OsStr>>(&self, segment: S) -> bool {
        self.matcher.is_match(Path::new(segment.as_ref()))
    }

    /// True when any segment of `relative` is excluded.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        relative.iter().any(|component| self.matches_segment(component))
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// The materialized project tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTree {
    root: PathBuf,
    directories: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

impl OutputTree {
    fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf(), directories: Vec::new(), files: Vec::new() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Created directories, relative to the root, in walk order.
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Written files, relative to the root, in walk order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn contains_file<P: AsRef<Path>>(&self, relative: P) -> bool {
        self.files.iter().any(|file| file == relative.as_ref())
    }
}

/// Returns the content as text unless it looks binary.
///
/// Content is binary when a NUL byte appears in the first
/// [`BINARY_SNIFF_LEN`] bytes or when it is not valid UTF-8.
pub fn as_text(bytes: &[u8]) -> Option<&str> {
    let sniffed = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniffed.contains(&0) {
        return None;
    }
    std::str::from_utf8(bytes).ok()
}

/// Creates `path`, failing with [`Error::DestinationExists`] if anything is
/// already there. Missing parents are created first; the final directory is
/// created with a single create-if-absent call.
pub fn create_new_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let exists = || Error::DestinationExists { path: path.display().to_string() };

    if fs::symlink_metadata(path).is_ok() {
        return Err(exists());
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir(path).map_err(|err| match err.kind() {
        io::ErrorKind::AlreadyExists => exists(),
        _ => Error::IoError(err),
    })
}

fn collision(first: &Path, second: &Path, target: &Path) -> Error {
    Error::OutputCollision {
        first: first.display().to_string(),
        second: second.display().to_string(),
        target: target.display().to_string(),
    }
}

/// Walks a template tree and writes the transformed copy.
pub struct Materializer<'a> {
    rename_table: &'a RenameTable,
    context: &'a SubstitutionContext,
    exclusions: &'a ExclusionSet,
}

impl<'a> Materializer<'a> {
    pub fn new(
        rename_table: &'a RenameTable,
        context: &'a SubstitutionContext,
        exclusions: &'a ExclusionSet,
    ) -> Self {
        Self { rename_table, context, exclusions }
    }

    /// Materializes `template_root` into `destination`.
    ///
    /// `destination` must not exist; it is created before the walk starts and
    /// nothing is written if that fails. The walk is depth-first and sorted by
    /// file name. Failures mid-walk abort and leave the partial output in place.
    ///
    /// # Errors
    /// * `Error::TemplateNotFound` if `template_root` is not a directory
    /// * `Error::DestinationExists` if `destination` already exists
    /// * `Error::OutputCollision` if two entries render to the same file
    /// * `Error::IoError` / `Error::WalkError` on filesystem failures
    pub fn materialize(&self, template_root: &Path, destination: &Path) -> Result<OutputTree> {
        if !template_root.is_dir() {
            return Err(Error::TemplateNotFound(format!(
                "template root '{}' is not a directory",
                template_root.display()
            )));
        }
        create_new_dir(destination)?;
        debug!("Created '{}'.", destination.display());

        let mut tree = OutputTree::new(destination);
        // Rendered target -> (template entry it came from, whether it is a directory).
        let mut sources: HashMap<PathBuf, (PathBuf, bool)> = HashMap::new();

        let walker = WalkDir::new(template_root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let excluded = entry
                    .path()
                    .strip_prefix(template_root)
                    .map(|relative| self.exclusions.is_excluded(relative))
                    .unwrap_or(false);
                if excluded {
                    debug!("Pruning '{}'.", entry.path().display());
                }
                !excluded
            });

        for entry in walker {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(template_root)
                .map_err(io::Error::other)?
                .to_path_buf();

            let targets = self.rename_table.rename_path(&relative);
            if targets.is_empty() {
                debug!("Skipping '{}': renamed to an empty path.", relative.display());
                continue;
            }

            if entry.file_type().is_dir() {
                for target in targets {
                    // Two template directories may render to the same directory.
                    match sources.get(&target) {
                        Some((_, true)) => continue,
                        Some((first, false)) => return Err(collision(first, &relative, &target)),
                        None => {}
                    }
                    fs::create_dir_all(destination.join(&target))?;
                    sources.insert(target.clone(), (relative.clone(), true));
                    tree.directories.push(target);
                }
                continue;
            }

            let bytes = fs::read(entry.path())?;
            let permissions = entry.metadata()?.permissions();
            let rendered = as_text(&bytes).map(|text| self.context.apply(text));

            for target in targets {
                if let Some((first, _)) = sources.get(&target) {
                    return Err(collision(first, &relative, &target));
                }

                let abs_target = destination.join(&target);
                if let Some(parent) = abs_target.parent() {
                    fs::create_dir_all(parent)?;
                }
                match &rendered {
                    Some(content) => {
                        debug!("Writing file: {}", abs_target.display());
                        fs::write(&abs_target, content)?;
                        fs::set_permissions(&abs_target, permissions.clone())?;
                    }
                    None => {
                        debug!("Copying file: {}", abs_target.display());
                        fs::copy(entry.path(), &abs_target)?;
                    }
                }

                sources.insert(target.clone(), (relative.clone(), false));
                tree.files.push(target);
            }
        }

        Ok(tree)
    }
}

/// Materializes `template_root` into `destination`. See [`Materializer::materialize`].
pub fn materialize(
    template_root: &Path,
    destination: &Path,
    rename_table: &RenameTable,
    context: &SubstitutionContext,
    exclusions: &ExclusionSet,
) -> Result<OutputTree> {
    Materializer::new(rename_table, context, exclusions).materialize(template_root, destination)
}
