//! Default catalog files compiled into the binary.
//!
//! The project root `templates/` directory is embedded with `rust-embed`.
//! It doubles as the catalog used when a project has no `.showcase/`
//! directory and as the source for `showcase init`.

use rust_embed::RustEmbed;

/// Embedded files from the project root `templates/` directory.
///
/// With the `debug-embed` feature the files are embedded in debug builds
/// too, so tests see the same catalog as release binaries.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Template content by relative path (e.g. `processes/cicd.yaml`).
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// Template paths starting with `prefix`, sorted.
///
/// # Example
/// ```
/// use ps_core::init::templates::list_templates;
///
/// let processes = list_templates("processes/");
/// assert!(processes.contains(&"processes/cicd.yaml".to_string()));
/// ```
pub fn list_templates(prefix: &str) -> Vec<String> {
    let mut paths: Vec<String> = TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect();
    paths.sort();
    paths
}
