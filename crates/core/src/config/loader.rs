//! Configuration loader for the `.showcase/` directory structure.
//!
//! This module loads and validates:
//! - `config.toml`: global settings and timing
//! - `processes/*.yaml`: one process definition per file
//! - `content/<process>/<stage>.md`: stage code samples with YAML front matter
//!
//! When a project has no `.showcase/` directory, the same files are read
//! from the templates compiled into the binary.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::{AppConfig, ConfigSource};
use crate::content::ContentStore;
use crate::init::templates::{get_template, list_templates};
use gray_matter::engine::YAML;
use gray_matter::Matter;
use ps_protocol::catalog_models::{Catalog, ProcessDef};
use ps_protocol::config_models::GlobalConfig;
use ps_protocol::content_models::StageContent;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Name of the configuration directory under a project root.
pub const SHOWCASE_DIR: &str = ".showcase";

/// Loads all configuration from the `.showcase/` directory under `root`.
///
/// Missing files inside an existing `.showcase/` fall back to defaults
/// (`config.toml`) or to nothing (`content/`). The catalog itself must
/// end up non-empty.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML, YAML, or Markdown front matter)
/// - The catalog is empty, has duplicate ids, or the configured default
///   process does not exist
///
/// # Example
///
/// ```rust,no_run
/// use ps_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} processes", config.catalog.len());
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let showcase_dir = root.join(SHOWCASE_DIR);

    if !showcase_dir.exists() {
        debug!(root = %root.display(), "No .showcase directory, using embedded catalog");
        return load_embedded();
    }

    let global = load_global_config(&showcase_dir)?;
    let processes = load_processes(&showcase_dir)?;
    let content = load_content(&showcase_dir)?;

    build_config(
        global,
        processes,
        content,
        ConfigSource::Directory(showcase_dir),
    )
}

/// Loads the default catalog compiled into the binary.
pub fn load_embedded() -> ConfigResult<AppConfig> {
    let global = match get_template("config.toml") {
        Some(text) => parse_global_config(Path::new("config.toml"), &text)?,
        None => GlobalConfig::default(),
    };

    let mut process_paths = list_templates("processes/");
    process_paths.sort();
    let mut processes = Vec::new();
    for template_path in process_paths {
        let path = PathBuf::from(&template_path);
        if !is_yaml(&path) {
            continue;
        }
        let text = read_template(&template_path)?;
        processes.push((path.clone(), parse_process(&path, &text)?));
    }

    let mut content_paths = list_templates("content/");
    content_paths.sort();
    let mut content = ContentStore::new();
    for template_path in content_paths {
        let path = PathBuf::from(&template_path);
        let Some((process_id, stage_id)) = content_key(&path) else {
            continue;
        };
        let text = read_template(&template_path)?;
        content.insert(process_id, stage_id, parse_stage_content(&path, &text)?);
    }

    build_config(global, processes, content, ConfigSource::Embedded)
}

fn read_template(template_path: &str) -> ConfigResult<String> {
    get_template(template_path).ok_or_else(|| ConfigError::FileRead {
        path: PathBuf::from(template_path),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "embedded template missing"),
    })
}

fn read_file(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(showcase_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = showcase_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let text = read_file(&config_path)?;
    parse_global_config(&config_path, &text)
}

/// Loads all process definitions from `processes/*.yaml` and `*.yml`.
fn load_processes(showcase_dir: &Path) -> ConfigResult<Vec<(PathBuf, ProcessDef)>> {
    let processes_dir = showcase_dir.join("processes");

    if !processes_dir.exists() {
        return Ok(Vec::new());
    }

    let mut processes = Vec::new();

    for entry in WalkDir::new(&processes_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: processes_dir.clone(),
            source,
        })?;

        let path = entry.path();
        if !is_yaml(path) {
            continue;
        }

        let text = read_file(path)?;
        processes.push((path.to_path_buf(), parse_process(path, &text)?));
    }

    Ok(processes)
}

/// Loads all stage content from `content/<process>/<stage>.md`.
fn load_content(showcase_dir: &Path) -> ConfigResult<ContentStore> {
    let content_dir = showcase_dir.join("content");
    let mut store = ContentStore::new();

    if !content_dir.exists() {
        return Ok(store);
    }

    for entry in WalkDir::new(&content_dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: content_dir.clone(),
            source,
        })?;

        let path = entry.path();
        let Some((process_id, stage_id)) = content_key(path) else {
            continue;
        };

        let text = read_file(path)?;
        store.insert(process_id, stage_id, parse_stage_content(path, &text)?);
    }

    Ok(store)
}

pub fn parse_global_config(path: &Path, text: &str) -> ConfigResult<GlobalConfig> {
    toml::from_str(text).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_process(path: &Path, text: &str) -> ConfigResult<ProcessDef> {
    serde_yaml::from_str(text).map_err(|source| ConfigError::YamlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a stage content file: YAML front matter plus a body holding the
/// source text, optionally wrapped in a fenced code block.
///
/// A missing `language` is taken from the fence's info string.
pub fn parse_stage_content(path: &Path, text: &str) -> ConfigResult<StageContent> {
    let matter = Matter::<YAML>::new();
    let result = matter.parse(text);

    let mut content: StageContent = result
        .data
        .ok_or_else(|| ConfigError::MarkdownParse {
            path: path.to_path_buf(),
            reason: "Missing YAML front matter".to_string(),
        })?
        .deserialize()
        .map_err(|e| ConfigError::MarkdownParse {
            path: path.to_path_buf(),
            reason: format!("Failed to deserialize front matter: {}", e),
        })?;

    let (fence_language, source_text) = split_code_fence(&result.content);
    if content.language.is_empty() {
        if let Some(language) = fence_language {
            content.language = language;
        }
    }
    content.source_text = source_text;

    Ok(content)
}

/// Strips a surrounding code fence from a Markdown body.
///
/// Returns the fence's info string (if any) and the text inside it. Bodies
/// without a leading fence are returned with blank edges trimmed.
fn split_code_fence(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim_matches(['\n', '\r']);

    let Some(rest) = trimmed.strip_prefix("```") else {
        return (None, trimmed.to_string());
    };

    let (info, inner) = rest.split_once('\n').unwrap_or((rest, ""));
    let inner = inner.trim_end();
    let inner = inner.strip_suffix("```").unwrap_or(inner);

    let info = info.trim();
    let language = (!info.is_empty()).then(|| info.to_string());

    (language, inner.trim_end_matches(['\n', '\r']).to_string())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// `content/<process>/<stage>.md` → `(process, stage)`.
fn content_key(path: &Path) -> Option<(String, String)> {
    if path.extension().and_then(|s| s.to_str()) != Some("md") {
        return None;
    }
    let stage_id = path.file_stem()?.to_str()?.to_string();
    let process_id = path.parent()?.file_name()?.to_str()?.to_string();
    Some((process_id, stage_id))
}

/// Validates the loaded pieces and assembles the final configuration.
fn build_config(
    global: GlobalConfig,
    processes: Vec<(PathBuf, ProcessDef)>,
    content: ContentStore,
    source: ConfigSource,
) -> ConfigResult<AppConfig> {
    let base = match &source {
        ConfigSource::Directory(dir) => dir.clone(),
        ConfigSource::Embedded => PathBuf::new(),
    };

    if processes.is_empty() {
        return Err(ConfigError::InvalidConfig {
            path: base.join("processes"),
            reason: "no processes defined".to_string(),
        });
    }

    let mut process_ids = HashSet::new();
    for (path, process) in &processes {
        if !process_ids.insert(process.id.as_str()) {
            return Err(ConfigError::InvalidConfig {
                path: path.clone(),
                reason: format!("duplicate process id '{}'", process.id),
            });
        }

        let mut stage_ids = HashSet::new();
        for stage in &process.stages {
            if !stage_ids.insert(stage.id.as_str()) {
                return Err(ConfigError::InvalidConfig {
                    path: path.clone(),
                    reason: format!(
                        "duplicate stage id '{}' in process '{}'",
                        stage.id, process.id
                    ),
                });
            }
        }
    }

    let catalog = Catalog::new(processes.into_iter().map(|(_, p)| p).collect());

    if let Some(default_process) = &global.default_process {
        if !catalog.contains(default_process) {
            return Err(ConfigError::InvalidConfig {
                path: base.join("config.toml"),
                reason: format!("default-process '{}' is not in the catalog", default_process),
            });
        }
    }

    for (process_id, stage_id) in content.keys() {
        let known = catalog
            .process(process_id)
            .is_some_and(|p| p.stage(stage_id).is_some());
        if !known {
            warn!(process_id, stage_id, "Content for unknown stage is ignored");
        }
    }

    debug!(
        processes = catalog.len(),
        content = content.len(),
        "Configuration loaded"
    );

    Ok(AppConfig {
        global,
        catalog: Arc::new(catalog),
        content: Arc::new(content),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentProvider;
    use std::fs;
    use tempfile::tempdir;

    const PIPELINE_YAML: &str = r#"id: release
title: Release Train
description: Ship it
color: cyan
order: 1
stages:
  - id: tag
    name: Tag
  - id: publish
    name: Publish
"#;

    const TAG_MD: &str = r#"---
title: "Tag the release"
description: "Annotated git tag"
tools:
  - "git"
---

```bash
git tag -a v1.0.0 -m "release"
git push --tags
```
"#;

    fn write_showcase(root: &Path) -> PathBuf {
        let showcase_dir = root.join(SHOWCASE_DIR);
        fs::create_dir_all(showcase_dir.join("processes")).unwrap();
        fs::create_dir_all(showcase_dir.join("content/release")).unwrap();
        fs::write(showcase_dir.join("processes/release.yaml"), PIPELINE_YAML).unwrap();
        fs::write(showcase_dir.join("content/release/tag.md"), TAG_MD).unwrap();
        showcase_dir
    }

    #[tokio::test]
    async fn test_load_config_acceptance() {
        let dir = tempdir().expect("Failed to create temp dir");
        let showcase_dir = write_showcase(dir.path());
        fs::write(
            showcase_dir.join("config.toml"),
            "default-process = \"release\"\n[timing]\nstage-dwell-ms = 1500\n",
        )
        .unwrap();

        let config = load_config(dir.path()).await.expect("Failed to load config");

        assert_eq!(config.source, ConfigSource::Directory(showcase_dir));
        assert_eq!(config.global.default_process.as_deref(), Some("release"));
        assert_eq!(config.timing().stage_dwell_ms, 1500);
        // unspecified timing keys keep their defaults
        assert_eq!(config.timing().settle_ms, 1000);

        assert_eq!(config.catalog.len(), 1);
        let process = config.catalog.process("release").unwrap();
        assert_eq!(process.stage_ids(), vec!["tag", "publish"]);

        let content = config.content.lookup("release", "tag").unwrap();
        assert_eq!(content.title, "Tag the release");
        assert_eq!(content.language, "bash");
        assert_eq!(content.tools, vec!["git"]);
        assert_eq!(
            content.source_text,
            "git tag -a v1.0.0 -m \"release\"\ngit push --tags"
        );
        assert!(config.content.lookup("release", "publish").is_none());
    }

    #[tokio::test]
    async fn test_load_config_missing_directory_uses_embedded() {
        let dir = tempdir().expect("Failed to create temp dir");

        let config = load_config(dir.path())
            .await
            .expect("Should fall back to embedded catalog");

        assert_eq!(config.source, ConfigSource::Embedded);
        let ids: Vec<&str> = config.catalog.processes.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["cicd", "iac", "containers"]);
        assert_eq!(config.initial_process().map(|p| p.id.as_str()), Some("cicd"));

        let cicd = config.catalog.process("cicd").unwrap();
        assert_eq!(
            cicd.stage_ids(),
            vec!["source", "build", "security", "deploy", "monitor"]
        );
        for process in &config.catalog.processes {
            for stage in &process.stages {
                let content = config.content.lookup(&process.id, &stage.id);
                assert!(content.is_some(), "missing content for {}/{}", process.id, stage.id);
                assert!(content.unwrap().line_count() > 0);
            }
        }
    }

    #[tokio::test]
    async fn test_load_config_without_config_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        write_showcase(dir.path());

        let config = load_config(dir.path()).await.unwrap();

        assert_eq!(config.global, GlobalConfig::default());
        assert_eq!(config.initial_process().map(|p| p.id.as_str()), Some("release"));
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let showcase_dir = write_showcase(dir.path());
        fs::write(showcase_dir.join("config.toml"), "default-process = [invalid toml").unwrap();

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::TomlParse { path, .. }) = result {
            assert!(path.ends_with("config.toml"));
        } else {
            panic!("Expected TomlParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_invalid_yaml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let showcase_dir = write_showcase(dir.path());
        fs::write(
            showcase_dir.join("processes/broken.yaml"),
            "id: broken\n  title: [yaml",
        )
        .unwrap();

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::YamlParse { path, .. }) = result {
            assert!(path.ends_with("broken.yaml"));
        } else {
            panic!("Expected YamlParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_content_without_front_matter() {
        let dir = tempdir().expect("Failed to create temp dir");
        let showcase_dir = write_showcase(dir.path());
        fs::write(
            showcase_dir.join("content/release/publish.md"),
            "Just plain markdown content",
        )
        .unwrap();

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::MarkdownParse { path, reason }) = result {
            assert!(path.ends_with("publish.md"));
            assert!(reason.contains("Missing YAML front matter"));
        } else {
            panic!("Expected MarkdownParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_content_missing_title() {
        let dir = tempdir().expect("Failed to create temp dir");
        let showcase_dir = write_showcase(dir.path());
        fs::write(
            showcase_dir.join("content/release/publish.md"),
            "---\nlanguage: bash\n---\n\ncargo publish\n",
        )
        .unwrap();

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::MarkdownParse { reason, .. }) = result {
            assert!(reason.contains("Failed to deserialize"));
        } else {
            panic!("Expected MarkdownParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_ignores_non_matching_files() {
        let dir = tempdir().expect("Failed to create temp dir");
        let showcase_dir = write_showcase(dir.path());
        fs::write(showcase_dir.join("processes/notes.txt"), "Not a yaml file").unwrap();
        fs::write(showcase_dir.join("content/release/readme.txt"), "Not markdown").unwrap();
        fs::write(showcase_dir.join("content/stray.md"), "---\ntitle: x\n---\n").unwrap();

        let config = load_config(dir.path()).await.unwrap();

        assert_eq!(config.catalog.len(), 1);
        assert_eq!(config.content.len(), 1);
    }

    #[tokio::test]
    async fn test_load_config_yml_extension_and_ordering() {
        let dir = tempdir().expect("Failed to create temp dir");
        let showcase_dir = write_showcase(dir.path());
        fs::write(
            showcase_dir.join("processes/audit.yml"),
            "id: audit\ntitle: Audit\norder: 0\n",
        )
        .unwrap();

        let config = load_config(dir.path()).await.unwrap();

        let ids: Vec<&str> = config.catalog.processes.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["audit", "release"]);
        assert_eq!(config.catalog.process("audit").unwrap().stage_count(), 0);
    }

    #[tokio::test]
    async fn test_load_config_duplicate_process_id() {
        let dir = tempdir().expect("Failed to create temp dir");
        let showcase_dir = write_showcase(dir.path());
        fs::write(showcase_dir.join("processes/release2.yaml"), PIPELINE_YAML).unwrap();

        let result = load_config(dir.path()).await;

        match result {
            Err(ConfigError::InvalidConfig { path, reason }) => {
                assert!(path.ends_with("release2.yaml"));
                assert!(reason.contains("duplicate process id"));
            }
            other => panic!("Expected InvalidConfig error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_load_config_duplicate_stage_id() {
        let dir = tempdir().expect("Failed to create temp dir");
        let showcase_dir = write_showcase(dir.path());
        fs::write(
            showcase_dir.join("processes/release.yaml"),
            "id: release\ntitle: R\nstages:\n  - id: tag\n    name: A\n  - id: tag\n    name: B\n",
        )
        .unwrap();

        let result = load_config(dir.path()).await;

        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfig { reason, .. }) if reason.contains("duplicate stage id")
        ));
    }

    #[tokio::test]
    async fn test_load_config_unknown_default_process() {
        let dir = tempdir().expect("Failed to create temp dir");
        let showcase_dir = write_showcase(dir.path());
        fs::write(showcase_dir.join("config.toml"), "default-process = \"nope\"\n").unwrap();

        let result = load_config(dir.path()).await;

        match result {
            Err(ConfigError::InvalidConfig { path, reason }) => {
                assert!(path.ends_with("config.toml"));
                assert!(reason.contains("nope"));
            }
            other => panic!("Expected InvalidConfig error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_load_config_empty_catalog() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join(SHOWCASE_DIR)).unwrap();

        let result = load_config(dir.path()).await;

        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfig { reason, .. }) if reason == "no processes defined"
        ));
    }

    #[test]
    fn test_split_code_fence() {
        let (language, text) = split_code_fence("\n```hcl\nresource \"x\" {}\n```\n");
        assert_eq!(language.as_deref(), Some("hcl"));
        assert_eq!(text, "resource \"x\" {}");

        let (language, text) = split_code_fence("\n\n  indented\nplain\n\n");
        assert_eq!(language, None);
        assert_eq!(text, "  indented\nplain");

        let (language, text) = split_code_fence("```\nno info string\n```");
        assert_eq!(language, None);
        assert_eq!(text, "no info string");
    }

    #[test]
    fn test_content_key() {
        assert_eq!(
            content_key(Path::new("content/cicd/build.md")),
            Some(("cicd".to_string(), "build".to_string()))
        );
        assert_eq!(content_key(Path::new("content/cicd/build.txt")), None);
    }
}
