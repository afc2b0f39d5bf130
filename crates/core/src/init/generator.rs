//! Directory structure and file generation for `.showcase/` initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::loader::SHOWCASE_DIR;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Process written by `--minimal`.
const MINIMAL_PROCESS: &str = "cicd";

/// Options for initializing a `.showcase/` directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory under which `.showcase/` is created.
    pub target_dir: PathBuf,

    /// Overwrite files of an existing `.showcase/` directory.
    pub force: bool,

    /// Only write the CI/CD process and its content.
    pub minimal: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
            minimal: false,
        }
    }
}

/// Generate a `.showcase/` directory from the embedded templates.
///
/// ```text
/// .showcase/
/// ├── config.toml
/// ├── processes/
/// │   ├── cicd.yaml
/// │   ├── iac.yaml          (unless minimal)
/// │   └── containers.yaml   (unless minimal)
/// └── content/
///     ├── cicd/*.md
///     ├── iac/*.md          (unless minimal)
///     └── containers/*.md   (unless minimal)
/// ```
///
/// Returns the paths written, relative to `.showcase/`.
///
/// # Errors
///
/// Fails when `.showcase/` exists and `force` is not set, or when a file
/// cannot be written.
///
/// # Example
/// ```no_run
/// use ps_core::init::{generate_showcase_structure, InitOptions};
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = InitOptions {
///     target_dir: PathBuf::from("."),
///     force: false,
///     minimal: true,
/// };
///
/// generate_showcase_structure(options).await?;
/// # Ok(())
/// # }
/// ```
pub async fn generate_showcase_structure(options: InitOptions) -> InitResult<Vec<String>> {
    let showcase_dir = options.target_dir.join(SHOWCASE_DIR);

    if showcase_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(showcase_dir));
    }

    let mut paths = vec!["config.toml".to_string()];
    if options.minimal {
        paths.push(format!("processes/{MINIMAL_PROCESS}.yaml"));
        paths.extend(list_templates(&format!("content/{MINIMAL_PROCESS}/")));
    } else {
        paths.extend(list_templates("processes/"));
        paths.extend(list_templates("content/"));
    }

    for template_path in &paths {
        write_template_file(&showcase_dir, template_path)?;
    }

    debug!(dir = %showcase_dir.display(), files = paths.len(), "Showcase initialized");
    Ok(paths)
}

fn write_template_file(showcase_dir: &Path, template_path: &str) -> InitResult<()> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = showcase_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path,
        source,
    })?;

    Ok(())
}
