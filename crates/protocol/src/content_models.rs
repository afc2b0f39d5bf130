//! Stage content payloads for `.showcase/content/<process>/<stage>.md`.
//!
//! Content files are Markdown with YAML front matter. The front matter
//! carries the metadata below; the body carries the source text that is
//! displayed and revealed line by line during a run.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The code sample and metadata displayed for one stage.
///
/// # Example
///
/// ````markdown
/// ---
/// title: Automated Build & Testing
/// description: Docker multi-stage build with automated testing
/// language: yaml
/// tools:
///   - Docker
///   - npm audit
/// ---
///
/// ```yaml
/// FROM node:18-alpine AS builder
/// ```
/// ````
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StageContent {
    /// Heading of the code viewer.
    pub title: String,

    /// Sub-heading of the code viewer.
    #[serde(default)]
    pub description: String,

    /// Language badge for the sample (e.g. `yaml`, `hcl`).
    #[serde(default)]
    pub language: String,

    /// Tools and technologies listed on the tools tab.
    #[serde(default)]
    pub tools: Vec<String>,

    /// The sample itself, taken from the Markdown body.
    #[serde(skip)]
    pub source_text: String,
}

impl StageContent {
    /// Lines of the source text, in reveal order.
    pub fn lines(&self) -> Vec<&str> {
        self.source_text.lines().collect()
    }

    /// Number of lines the reveal walks through.
    pub fn line_count(&self) -> usize {
        self.source_text.lines().count()
    }
}
