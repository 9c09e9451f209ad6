use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External feed types. Each kind delivers raw records in its own shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Competitor monitoring feed (launches, pricing, executive moves)
    Competitor,
    /// Media and journalist request feed
    Media,
    /// Stakeholder tracking (investors, analysts, advocacy groups)
    Stakeholder,
    /// Risk and crisis monitoring
    Risk,
    /// Generic intel records that already carry category and entities
    Intel,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Competitor,
        SourceKind::Media,
        SourceKind::Stakeholder,
        SourceKind::Risk,
        SourceKind::Intel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Competitor => "competitor",
            Self::Media => "media",
            Self::Stakeholder => "stakeholder",
            Self::Risk => "risk",
            Self::Intel => "intel",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "competitor" | "competitors" => Ok(Self::Competitor),
            "media" => Ok(Self::Media),
            "stakeholder" | "stakeholders" => Ok(Self::Stakeholder),
            "risk" | "risks" => Ok(Self::Risk),
            "intel" | "generic" => Ok(Self::Intel),
            _ => Err(format!(
                "Invalid source kind: '{}'. Use competitor, media, stakeholder, risk or intel",
                s
            )),
        }
    }
}
