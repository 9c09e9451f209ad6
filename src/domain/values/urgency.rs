use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::values::category::Category;

/// Coarse display label derived from time-to-expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyBucket {
    Critical,
    High,
    Medium,
    Low,
}

impl UrgencyBucket {
    pub const ALL: [UrgencyBucket; 4] = [
        UrgencyBucket::Critical,
        UrgencyBucket::High,
        UrgencyBucket::Medium,
        UrgencyBucket::Low,
    ];

    /// `critical` under 24h to expiry, `high` under 72h, `medium` under 7
    /// days, `low` otherwise. Window-less categories and signals without a
    /// window are always `low`.
    pub fn classify(
        category: Category,
        window_end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        if category.is_window_less() {
            return UrgencyBucket::Low;
        }
        let Some(end) = window_end else {
            return UrgencyBucket::Low;
        };
        let remaining = end - now;
        if remaining < Duration::hours(24) {
            UrgencyBucket::Critical
        } else if remaining < Duration::hours(72) {
            UrgencyBucket::High
        } else if remaining < Duration::days(7) {
            UrgencyBucket::Medium
        } else {
            UrgencyBucket::Low
        }
    }
}

impl fmt::Display for UrgencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyBucket::Critical => write!(f, "critical"),
            UrgencyBucket::High => write!(f, "high"),
            UrgencyBucket::Medium => write!(f, "medium"),
            UrgencyBucket::Low => write!(f, "low"),
        }
    }
}
