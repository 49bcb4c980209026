mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::write_tree;
use tempfile::TempDir;
use trowel::engine::{
    materialize, ExclusionSet, Materializer, RenameTable, SubstitutionContext,
};
use trowel::error::Error;
use walkdir::WalkDir;

/// Relative paths of every file under `root`, sorted.
fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

fn name_context(value: &str) -> SubstitutionContext {
    let mut context = SubstitutionContext::new();
    context.insert("{{name}}", value);
    context
}

#[test_log::test]
fn test_dockerfile_rename_and_substitution() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(&template, &[("Dockerfile.tmpl", "IMAGE={{name}}")]);

    let mut rename = RenameTable::new();
    rename.insert("Dockerfile.tmpl", "Dockerfile");
    let output = temp.path().join("out");

    let tree = materialize(&template, &output, &rename, &name_context("acme"), &ExclusionSet::empty())?;

    assert_eq!(list_files(&output), vec![PathBuf::from("Dockerfile")]);
    assert_eq!(fs::read_to_string(output.join("Dockerfile"))?, "IMAGE=acme");
    assert_eq!(tree.files(), &[PathBuf::from("Dockerfile")]);
    assert_eq!(tree.root(), output.as_path());
    Ok(())
}

#[test]
fn test_git_directory_is_excluded() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(
        &template,
        &[(".git/config", "[core]"), (".git/refs/heads/main", "abc"), ("README.md", "hi")],
    );
    let output = temp.path().join("out");

    materialize(
        &template,
        &output,
        &RenameTable::new(),
        &SubstitutionContext::new(),
        &ExclusionSet::new([".git"])?,
    )?;

    assert!(!output.join(".git").exists());
    assert_eq!(list_files(&output), vec![PathBuf::from("README.md")]);
    Ok(())
}

#[test]
fn test_existing_empty_destination_is_untouched() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(&template, &[("file.txt", "content")]);
    let output = temp.path().join("out");
    fs::create_dir(&output)?;

    let result = materialize(
        &template,
        &output,
        &RenameTable::new(),
        &SubstitutionContext::new(),
        &ExclusionSet::empty(),
    );

    assert!(matches!(result, Err(Error::DestinationExists { .. })));
    assert!(output.is_dir());
    assert_eq!(fs::read_dir(&output)?.count(), 0);
    Ok(())
}

#[test]
fn test_existing_destination_contents_unchanged() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(&template, &[("file.txt", "new"), ("nested/other.txt", "new")]);
    let output = temp.path().join("out");
    write_tree(&output, &[("file.txt", "old"), ("keep/me.txt", "old")]);
    let snapshot = temp.path().join("snapshot");
    write_tree(&snapshot, &[("file.txt", "old"), ("keep/me.txt", "old")]);

    let result = materialize(
        &template,
        &output,
        &RenameTable::new(),
        &SubstitutionContext::new(),
        &ExclusionSet::empty(),
    );

    assert!(matches!(result, Err(Error::DestinationExists { .. })));
    assert!(!dir_diff::is_different(&output, &snapshot).unwrap());
    Ok(())
}

#[test]
fn test_destination_that_is_a_file() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    fs::create_dir(&template)?;
    let output = temp.path().join("out");
    fs::write(&output, "not a directory")?;

    let result = materialize(
        &template,
        &output,
        &RenameTable::new(),
        &SubstitutionContext::new(),
        &ExclusionSet::empty(),
    );

    assert!(matches!(result, Err(Error::DestinationExists { .. })));
    assert_eq!(fs::read_to_string(&output)?, "not a directory");
    Ok(())
}

#[test]
fn test_exclusion_prunes_whole_subtree() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    let mut files: Vec<(String, &str)> = (0..25)
        .map(|i| (format!("node_modules/pkg{}/deep/index{}.js", i % 5, i), "module.exports = {}"))
        .collect();
    files.push(("src/app.js".to_string(), "app"));
    files.push(("src/node_modules/nested.js".to_string(), "nested"));
    let files: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), *c)).collect();
    write_tree(&template, &files);
    let output = temp.path().join("out");

    let tree = materialize(
        &template,
        &output,
        &RenameTable::new(),
        &SubstitutionContext::new(),
        &ExclusionSet::new(["node_modules"])?,
    )?;

    assert_eq!(list_files(&output), vec![PathBuf::from("src/app.js")]);
    assert!(tree.directories().iter().all(|dir| !dir.starts_with("node_modules")));
    Ok(())
}

#[test]
fn test_inert_rename_token() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(&template, &[("a/b.txt", "b"), ("c.txt", "c"), ("project/d.py", "d")]);

    let mut rename = RenameTable::new();
    rename.insert("never_present", "x");
    rename.insert_many("also_absent", ["y", "z"]);

    let with_table = temp.path().join("with");
    let without_table = temp.path().join("without");
    let context = SubstitutionContext::new();
    let exclusions = ExclusionSet::empty();
    materialize(&template, &with_table, &rename, &context, &exclusions)?;
    materialize(&template, &without_table, &RenameTable::new(), &context, &exclusions)?;

    assert_eq!(list_files(&with_table), list_files(&without_table));
    assert!(!dir_diff::is_different(&with_table, &without_table).unwrap());
    Ok(())
}

#[test]
fn test_inert_substitution_key() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    let content = "def main():\n    return '{{ other }}'\n";
    write_tree(&template, &[("project_name.py", content)]);

    let mut rename = RenameTable::new();
    rename.insert("project_name", "acme");
    let output = temp.path().join("out");
    materialize(&template, &output, &rename, &name_context("acme"), &ExclusionSet::empty())?;

    assert_eq!(fs::read(output.join("acme.py"))?, content.as_bytes());
    Ok(())
}

#[test]
fn test_empty_template_root() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    fs::create_dir(&template)?;
    let output = temp.path().join("nested/out");

    let tree = materialize(
        &template,
        &output,
        &RenameTable::new(),
        &SubstitutionContext::new(),
        &ExclusionSet::empty(),
    )?;

    assert!(output.is_dir());
    assert!(tree.files().is_empty());
    assert!(tree.directories().is_empty());
    Ok(())
}

#[test]
fn test_missing_template_root_writes_nothing() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let output = temp.path().join("out");

    let result = materialize(
        &temp.path().join("missing"),
        &output,
        &RenameTable::new(),
        &SubstitutionContext::new(),
        &ExclusionSet::empty(),
    );

    assert!(matches!(result, Err(Error::TemplateNotFound(_))));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_token_group_expands_files_and_directories() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(
        &template,
        &[("docker/compose.tmpl", "name: {{name}}"), ("env/settings.py", "DEBUG = True")],
    );

    let mut rename = RenameTable::new();
    rename.insert_declaration("compose.tmpl", "docker-compose.yml,docker-compose.prod.yml");
    rename.insert_many("env", ["dev", "prod"]);
    let output = temp.path().join("out");

    materialize(&template, &output, &rename, &name_context("acme"), &ExclusionSet::empty())?;

    assert_eq!(
        list_files(&output),
        vec![
            PathBuf::from("dev/settings.py"),
            PathBuf::from("docker/docker-compose.prod.yml"),
            PathBuf::from("docker/docker-compose.yml"),
            PathBuf::from("prod/settings.py"),
        ]
    );
    assert_eq!(fs::read_to_string(output.join("docker/docker-compose.prod.yml"))?, "name: acme");
    Ok(())
}

#[test]
fn test_output_collision_is_reported() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(&template, &[("README.md", "plain"), ("README.md.tmpl", "templated")]);

    let mut rename = RenameTable::new();
    rename.insert(".tmpl", "");
    let output = temp.path().join("out");

    let result = materialize(
        &template,
        &output,
        &rename,
        &SubstitutionContext::new(),
        &ExclusionSet::empty(),
    );

    match result {
        Err(Error::OutputCollision { first, second, target }) => {
            assert_eq!(first, "README.md");
            assert_eq!(second, "README.md.tmpl");
            assert_eq!(target, "README.md");
        }
        other => panic!("expected an output collision, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_file_rendering_onto_directory_is_reported() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(&template, &[("a/x.txt", "in dir"), ("a.tmpl", "file")]);

    let mut rename = RenameTable::new();
    rename.insert(".tmpl", "");
    let output = temp.path().join("out");

    let result = materialize(
        &template,
        &output,
        &rename,
        &SubstitutionContext::new(),
        &ExclusionSet::empty(),
    );

    assert!(matches!(result, Err(Error::OutputCollision { .. })));
    assert_eq!(fs::read_to_string(output.join("a/x.txt"))?, "in dir");
    Ok(())
}

#[test]
fn test_directory_rendering_onto_file_is_reported() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(&template, &[("b", "file"), ("b.tmpl/y.txt", "in dir")]);

    let mut rename = RenameTable::new();
    rename.insert(".tmpl", "");
    let output = temp.path().join("out");

    let result = materialize(
        &template,
        &output,
        &rename,
        &SubstitutionContext::new(),
        &ExclusionSet::empty(),
    );

    match result {
        Err(Error::OutputCollision { first, second, .. }) => {
            assert_eq!(first, "b");
            assert_eq!(second, "b.tmpl");
        }
        other => panic!("expected an output collision, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(output.join("b"))?, "file");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_read_failure_keeps_partial_output() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(&template, &[("a.txt", "first"), ("b/c.txt", "second")]);
    std::os::unix::fs::symlink(temp.path().join("missing"), template.join("z_broken"))?;
    let output = temp.path().join("out");

    let result = materialize(
        &template,
        &output,
        &RenameTable::new(),
        &SubstitutionContext::new(),
        &ExclusionSet::empty(),
    );

    assert!(matches!(result, Err(Error::IoError(_))));
    assert_eq!(fs::read_to_string(output.join("a.txt"))?, "first");
    assert_eq!(fs::read_to_string(output.join("b/c.txt"))?, "second");
    assert!(!output.join("z_broken").exists());
    Ok(())
}

#[test]
fn test_binary_files_are_copied_verbatim() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    fs::create_dir(&template)?;
    let mut image = b"\x89PNG\r\n\x1a\n\0\0{{name}}".to_vec();
    image.extend_from_slice(&[0xff, 0x00, 0xfe]);
    fs::write(template.join("logo.png"), &image)?;
    let output = temp.path().join("out");

    materialize(
        &template,
        &output,
        &RenameTable::new(),
        &name_context("acme"),
        &ExclusionSet::empty(),
    )?;

    assert_eq!(fs::read(output.join("logo.png"))?, image);
    Ok(())
}

#[test]
fn test_walk_order_is_sorted() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(&template, &[("b.txt", ""), ("a/z.txt", ""), ("a/c.txt", ""), ("0.txt", "")]);
    let output = temp.path().join("out");

    let tree = Materializer::new(
        &RenameTable::new(),
        &SubstitutionContext::new(),
        &ExclusionSet::empty(),
    )
    .materialize(&template, &output)?;

    assert_eq!(
        tree.files(),
        &[
            PathBuf::from("0.txt"),
            PathBuf::from("a/c.txt"),
            PathBuf::from("a/z.txt"),
            PathBuf::from("b.txt"),
        ]
    );
    assert_eq!(tree.directories(), &[PathBuf::from("a")]);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_permissions_are_preserved() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new()?;
    let template = temp.path().join("template");
    write_tree(&template, &[("scripts/entrypoint.sh", "#!/bin/sh\necho {{name}}\n")]);
    fs::set_permissions(
        template.join("scripts/entrypoint.sh"),
        fs::Permissions::from_mode(0o755),
    )?;
    let output = temp.path().join("out");

    materialize(
        &template,
        &output,
        &RenameTable::new(),
        &name_context("acme"),
        &ExclusionSet::empty(),
    )?;

    let script = output.join("scripts/entrypoint.sh");
    assert_eq!(fs::read_to_string(&script)?, "#!/bin/sh\necho acme\n");
    assert_eq!(fs::metadata(&script)?.permissions().mode() & 0o777, 0o755);
    Ok(())
}
