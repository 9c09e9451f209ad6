use thiserror::Error;

use crate::domain::values::pipeline_stage::PipelineStage;
use crate::domain::values::source_kind::SourceKind;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Database(s)
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}

/// Why a single source kind produced no records for a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("source {kind} unavailable: {reason}")]
    Unavailable { kind: SourceKind, reason: String },

    #[error("source {kind} timed out after {timeout_ms}ms")]
    Timeout { kind: SourceKind, timeout_ms: u64 },

    #[error("source {kind} returned unparseable data: {reason}")]
    Parse { kind: SourceKind, reason: String },
}

impl SourceError {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceError::Unavailable { kind, .. }
            | SourceError::Timeout { kind, .. }
            | SourceError::Parse { kind, .. } => *kind,
        }
    }
}

/// A raw record that could not become a `Signal`. Never fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("no category could be determined and no fallback is configured")]
    UnknownCategory,
}

/// Run-wide failure. The pipeline is in the `Errored` state when one of these
/// is returned, and `stage` is where it got there.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config store unavailable during {stage}: {reason}")]
    ConfigUnavailable { stage: PipelineStage, reason: String },

    #[error("invariant violated during {stage}: {detail}")]
    InvariantViolation { stage: PipelineStage, detail: String },

    #[error("run cancelled before {stage}")]
    Cancelled { stage: PipelineStage },
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::ConfigUnavailable { stage, .. }
            | PipelineError::InvariantViolation { stage, .. }
            | PipelineError::Cancelled { stage } => *stage,
        }
    }
}
