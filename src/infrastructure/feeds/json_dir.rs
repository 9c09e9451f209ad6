use super::records_from_value;
use crate::domain::error::SourceError;
use crate::domain::ports::signal_source::{FilterHints, RawRecord, SignalSource};
use crate::domain::values::source_kind::SourceKind;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads `<kind>.json` files (e.g. `competitor.json`, `media.json`) from a
/// directory. Each file holds an array of raw records.
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, kind: SourceKind) -> PathBuf {
        self.dir.join(format!("{kind}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SignalSource for JsonDirSource {
    fn name(&self) -> &str {
        "json_dir"
    }

    fn kinds(&self) -> Vec<SourceKind> {
        SourceKind::ALL
            .into_iter()
            .filter(|kind| self.path_for(*kind).is_file())
            .collect()
    }

    async fn fetch(
        &self,
        kind: SourceKind,
        _hints: &FilterHints,
    ) -> Result<Vec<RawRecord>, SourceError> {
        let path = self.path_for(kind);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SourceError::Unavailable {
                kind,
                reason: format!("{}: {e}", path.display()),
            })?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| SourceError::Parse {
                kind,
                reason: format!("{}: {e}", path.display()),
            })?;
        records_from_value(kind, value)
    }
}
