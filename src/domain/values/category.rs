use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of signal classifications. Adding a category means adding a
/// variant here plus its rows in the keyword, horizon and rubric tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    CompetitorMove,
    StakeholderActivity,
    MediaOpportunity,
    NarrativeGap,
    RegulatoryChange,
    RiskAlert,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::CompetitorMove,
        Category::StakeholderActivity,
        Category::MediaOpportunity,
        Category::NarrativeGap,
        Category::RegulatoryChange,
        Category::RiskAlert,
    ];

    /// Order in which keyword matchers are tried when a record carries no
    /// explicit category. First match wins.
    pub const INFERENCE_ORDER: [Category; 6] = [
        Category::RegulatoryChange,
        Category::RiskAlert,
        Category::CompetitorMove,
        Category::MediaOpportunity,
        Category::StakeholderActivity,
        Category::NarrativeGap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CompetitorMove => "competitor_move",
            Category::StakeholderActivity => "stakeholder_activity",
            Category::MediaOpportunity => "media_opportunity",
            Category::NarrativeGap => "narrative_gap",
            Category::RegulatoryChange => "regulatory_change",
            Category::RiskAlert => "risk_alert",
        }
    }

    /// Window-less categories never expire: `window_end` is ignored by the
    /// window filter and they always land in the `low` urgency bucket.
    pub fn is_window_less(&self) -> bool {
        matches!(self, Category::NarrativeGap)
    }

    /// Lowercase keyword stems used for category inference and for the
    /// keyword-strength relevance factor.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::CompetitorMove => &[
                "competitor",
                "rival",
                "launch",
                "acqui",
                "pricing",
                "partnership",
                "funding",
                "market share",
            ],
            Category::StakeholderActivity => &[
                "stakeholder",
                "investor",
                "analyst",
                "board",
                "employee",
                "customer",
                "advocacy",
                "community",
            ],
            Category::MediaOpportunity => &[
                "journalist",
                "reporter",
                "interview",
                "podcast",
                "press",
                "media",
                "editorial",
                "op-ed",
            ],
            Category::NarrativeGap => &[
                "narrative",
                "trending",
                "conversation",
                "sentiment",
                "white space",
                "theme",
                "unaddressed",
            ],
            Category::RegulatoryChange => &[
                "regulat",
                "compliance",
                "legislat",
                "lawmaker",
                "rulemaking",
                "antitrust",
                "gdpr",
                "ftc",
            ],
            Category::RiskAlert => &[
                "crisis",
                "breach",
                "lawsuit",
                "recall",
                "outage",
                "backlash",
                "boycott",
                "scandal",
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "competitor_move" | "competitor" | "competitive" => Ok(Category::CompetitorMove),
            "stakeholder_activity" | "stakeholder" => Ok(Category::StakeholderActivity),
            "media_opportunity" | "media" => Ok(Category::MediaOpportunity),
            "narrative_gap" | "narrative" => Ok(Category::NarrativeGap),
            "regulatory_change" | "regulatory" => Ok(Category::RegulatoryChange),
            "risk_alert" | "risk" | "crisis" => Ok(Category::RiskAlert),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}
