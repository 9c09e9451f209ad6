use crate::domain::values::category::Category;
use chrono::{DateTime, Utc};

/// Hours after observation at which a signal's timeliness reaches zero.
pub fn timeliness_horizon_hours(category: &Category) -> f64 {
    match category {
        // Fast-moving: press windows and crises go stale within days
        Category::MediaOpportunity => 72.0, // 3 days
        Category::RiskAlert => 48.0,        // 2 days

        // Medium
        Category::CompetitorMove => 168.0,      // 7 days
        Category::StakeholderActivity => 336.0, // 14 days
        Category::NarrativeGap => 336.0,        // 14 days

        // Slow: regulatory processes run for weeks
        Category::RegulatoryChange => 720.0, // 30 days
    }
}

/// Linear timeliness on the 0–100 scale: 100 when the signal was observed at
/// `now`, 0 once its age reaches the category horizon. Timestamps in the
/// future count as fresh.
pub fn timeliness(category: &Category, observed_at: &DateTime<Utc>, now: &DateTime<Utc>) -> f64 {
    let age_hours = (*now - *observed_at).num_seconds() as f64 / 3600.0;
    if age_hours <= 0.0 {
        return 100.0;
    }
    let horizon = timeliness_horizon_hours(category);
    (100.0 * (1.0 - age_hours / horizon)).clamp(0.0, 100.0)
}

const URGENT_HOURS: f64 = 24.0;
const RELAXED_HOURS: f64 = 30.0 * 24.0;
const NO_WINDOW_URGENCY: f64 = 50.0;

/// Urgency factor on the 0–100 scale: 100 when the window closes within 24h,
/// falling linearly to 0 at 30 days out. A window that has already closed
/// scores 0. Signals without a window sit at a neutral 50.
pub fn urgency_factor(window_end: Option<&DateTime<Utc>>, now: &DateTime<Utc>) -> f64 {
    let Some(end) = window_end else {
        return NO_WINDOW_URGENCY;
    };
    if end < now {
        return 0.0;
    }
    let remaining_hours = (*end - *now).num_seconds() as f64 / 3600.0;
    if remaining_hours <= URGENT_HOURS {
        return 100.0;
    }
    if remaining_hours >= RELAXED_HOURS {
        return 0.0;
    }
    100.0 * (RELAXED_HOURS - remaining_hours) / (RELAXED_HOURS - URGENT_HOURS)
}
