use thiserror::Error;

/// Errors returned by [`PipelineSimulator`](super::PipelineSimulator).
///
/// Only reachable from free-form input: ids coming from the catalog are
/// always accepted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulatorError {
    #[error("Unknown process '{0}'")]
    UnknownProcess(String),

    #[error("Unknown stage '{stage_id}' in process '{process_id}'")]
    UnknownStage {
        process_id: String,
        stage_id: String,
    },

    #[error("The catalog has no processes")]
    EmptyCatalog,
}
