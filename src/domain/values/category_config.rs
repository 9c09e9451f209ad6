use serde::{Deserialize, Serialize};

use crate::domain::values::category::Category;

pub const DEFAULT_WEIGHT: f64 = 50.0;

/// Per-category policy supplied by the config store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub enabled: bool,
    /// 0–100. 50 leaves scores unchanged.
    pub weight: f64,
}

impl CategoryConfig {
    pub fn new(enabled: bool, weight: f64) -> Result<Self, String> {
        if !(0.0..=100.0).contains(&weight) {
            return Err(format!("Weight must be between 0 and 100, got {weight}"));
        }
        Ok(Self { enabled, weight })
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            weight: DEFAULT_WEIGHT,
        }
    }

    /// Score multiplier `0.5 + weight/100`: weight 0 halves, 50 is neutral,
    /// 100 gives 1.5x.
    pub fn multiplier(&self) -> f64 {
        0.5 + self.weight / 100.0
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: DEFAULT_WEIGHT,
        }
    }
}

/// Engine-wide settings that are not tied to a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Floor below which scored signals are dropped.
    pub minimum_score: f64,
    /// Entities the organisation tracks (competitors, stakeholder groups).
    pub tracked_entities: Vec<String>,
    /// Category for records no keyword matcher recognises. `None` makes such
    /// records normalization failures.
    pub fallback_category: Option<Category>,
    /// Per-feed fetch budget.
    pub feed_timeout_ms: u64,
    /// Cap on returned opportunities after ranking.
    pub max_results: Option<usize>,
    /// How far back feeds are asked to look.
    pub lookback_hours: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            minimum_score: 0.0,
            tracked_entities: Vec::new(),
            fallback_category: Some(Category::NarrativeGap),
            feed_timeout_ms: 5_000,
            max_results: None,
            lookback_hours: 720,
        }
    }
}
