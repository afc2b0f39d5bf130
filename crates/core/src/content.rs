//! Stage content lookup.
//!
//! The simulator and the views only see content through [`ContentProvider`].
//! Content is immutable once loaded; a stage without content is valid and
//! simply has nothing to display or reveal.

use ps_protocol::content_models::StageContent;
use std::collections::HashMap;

/// Read access to the code sample of a stage.
pub trait ContentProvider: Send + Sync {
    /// Content for `stage_id` within `process_id`, if any.
    fn lookup(&self, process_id: &str, stage_id: &str) -> Option<&StageContent>;
}

/// In-memory content table keyed by `(process id, stage id)`.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    entries: HashMap<(String, String), StageContent>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the content of a stage.
    pub fn insert(
        &mut self,
        process_id: impl Into<String>,
        stage_id: impl Into<String>,
        content: StageContent,
    ) {
        self.entries
            .insert((process_id.into(), stage_id.into()), content);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every `(process id, stage id)` pair that has content.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .keys()
            .map(|(process_id, stage_id)| (process_id.as_str(), stage_id.as_str()))
    }
}

impl ContentProvider for ContentStore {
    fn lookup(&self, process_id: &str, stage_id: &str) -> Option<&StageContent> {
        self.entries
            .get(&(process_id.to_string(), stage_id.to_string()))
    }
}
