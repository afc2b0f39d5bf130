//! The aggregate configuration handed to the simulator and the views.

use crate::content::ContentStore;
use ps_protocol::catalog_models::{Catalog, ProcessDef};
use ps_protocol::config_models::{GlobalConfig, TimingConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a configuration was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A `.showcase/` directory on disk.
    Directory(PathBuf),

    /// The default catalog compiled into the binary.
    Embedded,
}

/// Unified application configuration.
///
/// Aggregates:
/// - `config.toml`: global settings and timing
/// - `processes/*.yaml`: the process catalog
/// - `content/<process>/<stage>.md`: stage code samples
///
/// # Example
///
/// ```rust,no_run
/// use ps_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} processes and {} content files",
///          config.catalog.len(),
///          config.content.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub global: GlobalConfig,

    /// Validated, ordered process catalog.
    pub catalog: Arc<Catalog>,

    /// Stage content keyed by process and stage id.
    pub content: Arc<ContentStore>,

    pub source: ConfigSource,
}

impl AppConfig {
    pub fn timing(&self) -> TimingConfig {
        self.global.timing
    }

    /// The process shown on start: the configured default, else the first
    /// process of the catalog.
    pub fn initial_process(&self) -> Option<&ProcessDef> {
        self.global
            .default_process
            .as_deref()
            .and_then(|id| self.catalog.process(id))
            .or_else(|| self.catalog.first())
    }
}
