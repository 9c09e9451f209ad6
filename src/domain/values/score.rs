use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A score on the 0–100 scale. Construction always clamps, so a `Score`
/// can never leave the range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    pub const MIN: Score = Score(0.0);
    pub const MAX: Score = Score(100.0);

    /// Clamp into [0, 100]. NaN collapses to 0.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Score(0.0);
        }
        Score(value.clamp(0.0, 100.0))
    }

    /// Strict constructor for values coming from configuration.
    pub fn new(value: f64) -> Result<Self, String> {
        if !(0.0..=100.0).contains(&value) {
            return Err(format!("Score must be between 0 and 100, got {value}"));
        }
        Ok(Score(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Total order over scores; the clamp guarantees no NaN gets here.
    pub fn total_cmp(&self, other: &Score) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
