//! Process catalog models for `.showcase/processes/*.yaml`.
//!
//! A catalog is the immutable, ordered list of simulated workflows shown by
//! the showcase. Each process declares the stages that a run walks through.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One ordered step within a process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StageDef {
    /// Identifier, unique within its process (e.g. `build`).
    pub id: String,

    /// Display name shown on the stage card.
    pub name: String,

    /// One-line description shown under the name.
    #[serde(default)]
    pub description: String,
}

/// A top-level simulated workflow and its ordered stages.
///
/// # Example
///
/// ```yaml
/// id: cicd
/// title: CI/CD Pipeline
/// description: Automated build, test, and deployment workflows
/// color: blue
/// order: 1
/// stages:
///   - id: source
///     name: Source Control
///     description: Git workflows with feature branches and PR reviews
///   - id: build
///     name: Build & Test
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ProcessDef {
    /// Identifier used to select the process (e.g. `cicd`).
    pub id: String,

    /// Display title used on the process tab.
    pub title: String,

    /// Longer description shown in the process header.
    #[serde(default)]
    pub description: String,

    /// Terminal color hint for the process accent.
    ///
    /// Free-form; the view maps names like `blue` or `magenta` and falls
    /// back to its default accent for anything else.
    #[serde(default)]
    pub color: String,

    /// Sort key for the catalog. Ties keep load order.
    #[serde(default)]
    pub order: u32,

    /// Stages in execution order. May be empty.
    #[serde(default)]
    pub stages: Vec<StageDef>,
}

impl ProcessDef {
    /// Number of stages a run of this process walks through.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Look up a stage by id.
    pub fn stage(&self, stage_id: &str) -> Option<&StageDef> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    /// Position of a stage in the execution order.
    pub fn stage_index(&self, stage_id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id == stage_id)
    }

    /// Stage ids in declaration order.
    pub fn stage_ids(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.id.clone()).collect()
    }
}

/// The ordered set of processes available to the simulator.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct Catalog {
    pub processes: Vec<ProcessDef>,
}

impl Catalog {
    /// Build a catalog, ordering processes by their `order` key.
    pub fn new(mut processes: Vec<ProcessDef>) -> Self {
        processes.sort_by_key(|p| p.order);
        Self { processes }
    }

    pub fn process(&self, process_id: &str) -> Option<&ProcessDef> {
        self.processes.iter().find(|p| p.id == process_id)
    }

    pub fn first(&self) -> Option<&ProcessDef> {
        self.processes.first()
    }

    pub fn contains(&self, process_id: &str) -> bool {
        self.process(process_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Index of a process in catalog order, used for tab navigation.
    pub fn position(&self, process_id: &str) -> Option<usize> {
        self.processes.iter().position(|p| p.id == process_id)
    }
}
