use serde::Serialize;
use std::fmt;

/// Per-run state machine. Nothing here outlives a single `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Fetching,
    Normalizing,
    Scoring,
    Deduplicating,
    Ranking,
    Done,
    Errored,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Fetching => "fetching",
            PipelineStage::Normalizing => "normalizing",
            PipelineStage::Scoring => "scoring",
            PipelineStage::Deduplicating => "deduplicating",
            PipelineStage::Ranking => "ranking",
            PipelineStage::Done => "done",
            PipelineStage::Errored => "errored",
        };
        f.write_str(s)
    }
}
