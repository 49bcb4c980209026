//! Common constants used throughout trowel.

/// Output path used when the user leaves the path prompt blank.
pub const DEFAULT_OUTPUT_PATH: &str = "./test/";

/// Supported template manifest file names, in lookup order
pub const MANIFEST_FILES: [&str; 3] = ["trowel.json", "trowel.yml", "trowel.yaml"];

/// Directory holding the shipped templates, relative to the executable
pub const TEMPLATES_DIR: &str = "templates";

/// Path-name token replaced with the project name
pub const PROJECT_NAME_TOKEN: &str = "project_name";

/// Filename suffix stripped from template-only file names
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Segment names never copied from a template
pub const DEFAULT_EXCLUSIONS: [&str; 5] =
    [".git", "bundles", "node_modules", "staticfiles", "__pycache__"];

pub const PROJECT_NAME_KEY: &str = "{{ project_name }}";
pub const CAMEL_CASE_PROJECT_NAME_KEY: &str = "{{ camel_case_project_name }}";
pub const PROJECT_DIRECTORY_KEY: &str = "{{ project_directory }}";

/// Number of leading bytes inspected when sniffing for binary content
pub const BINARY_SNIFF_LEN: usize = 8000;

/// Route table written into the generated API app
pub const EMPTY_ROUTES: &str = "urlpatterns = []";
