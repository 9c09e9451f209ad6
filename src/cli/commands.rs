use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signal-intel", about = "Opportunity scoring over competitive, media and stakeholder intelligence")]
pub struct Cli {
    /// Read configuration from a JSON file instead of the database
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where raw records come from for `run` and `digest`.
#[derive(clap::Args, Debug, Clone)]
pub struct FeedArgs {
    /// Directory with one `<kind>.json` file per source kind
    /// (competitor, media, stakeholder, risk, intel). Without it, feeds are
    /// read from SIGNAL_INTEL_FEED_<KIND> URLs.
    #[arg(long)]
    pub feeds: Option<PathBuf>,
    /// Evaluation time (RFC3339 or YYYY-MM-DD). Defaults to the current time.
    #[arg(long)]
    pub now: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the ranked opportunity set
    Run {
        #[command(flatten)]
        feeds: FeedArgs,
        /// Print flat records instead of the full result with diagnostics
        #[arg(long)]
        records: bool,
        /// Only print the top N opportunities
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Summarize a run by category, urgency and entity
    Digest {
        #[command(flatten)]
        feeds: FeedArgs,
    },
    /// Show or change stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List categories with their enabled flag and weight
    Categories,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print settings and every category config
    Show,
    /// Enable, disable or reweight a category
    Set {
        /// Category (competitor_move, stakeholder_activity, media_opportunity,
        /// narrative_gap, regulatory_change, risk_alert)
        category: String,
        #[arg(long)]
        enabled: Option<bool>,
        /// 0-100; 50 leaves scores unchanged
        #[arg(long)]
        weight: Option<f64>,
    },
    /// Set the minimum priority score (0-100)
    MinScore { score: f64 },
    /// Start tracking an entity
    Track { entity: String },
    /// Stop tracking an entity
    Untrack { entity: String },
    /// Set the fallback category for unrecognised records, or `none`
    Fallback { category: String },
    /// Cap the number of returned opportunities, or `none`
    MaxResults { max: String },
    /// Per-feed fetch timeout in milliseconds
    Timeout { ms: u64 },
    /// How many hours back feeds are asked to look
    Lookback { hours: u32 },
}
