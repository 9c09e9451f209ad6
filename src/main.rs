use clap::Parser;
use signal_intel::cli::commands::{Cli, Commands, ConfigAction, FeedArgs};
use signal_intel::domain::ports::signal_source::SignalSource;
use signal_intel::domain::values::category::Category;
use signal_intel::infrastructure::feeds::http::HttpFeedSource;
use signal_intel::infrastructure::feeds::json_dir::JsonDirSource;
use signal_intel::SignalIntel;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays machine-readable JSON.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("signal_intel=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let si = match &cli.config {
        Some(path) => SignalIntel::from_config_file(path),
        None => {
            let db_path =
                std::env::var("SIGNAL_INTEL_DB").unwrap_or_else(|_| "./signal-intel.db".into());
            SignalIntel::new(&db_path)
        }
    };
    let si = match si {
        Ok(si) => si,
        Err(e) => {
            eprintln!("Error initializing signal-intel: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(si, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(si: SignalIntel, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Run {
            feeds,
            records,
            limit,
        } => {
            let (source, now) = resolve_feeds(&feeds)?;
            let set = si.run(source.as_ref(), now).await?;
            if records {
                let mut rows = set.records();
                if let Some(limit) = limit {
                    rows.truncate(limit);
                }
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                let mut set = set;
                if let Some(limit) = limit {
                    set.opportunities.truncate(limit);
                }
                println!("{}", serde_json::to_string_pretty(&set)?);
            }
        }
        Commands::Digest { feeds } => {
            let (source, now) = resolve_feeds(&feeds)?;
            let digest = si.digest(source.as_ref(), now).await?;
            println!("{}", serde_json::to_string_pretty(&digest)?);
        }
        Commands::Config { action } => run_config(&si, action)?,
        Commands::Categories => {
            for c in si.categories()? {
                let state = if c.enabled { "enabled" } else { "disabled" };
                let window = if c.window_less { " (no window)" } else { "" };
                println!("{}: {state}, weight {}{window}", c.category, c.weight);
            }
        }
    }
    Ok(())
}

fn run_config(si: &SignalIntel, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&si.snapshot()?)?);
        }
        ConfigAction::Set {
            category,
            enabled,
            weight,
        } => {
            let cat: Category = category.parse().map_err(|e: String| e)?;
            if enabled.is_none() && weight.is_none() {
                return Err("Nothing to change: pass --enabled and/or --weight".into());
            }
            let cfg = si.configure_category(cat, enabled, weight)?;
            println!("{cat}: enabled={}, weight={}", cfg.enabled, cfg.weight);
        }
        ConfigAction::MinScore { score } => {
            si.set_minimum_score(score)?;
            println!("Minimum score set to {score}");
        }
        ConfigAction::Track { entity } => {
            if si.track_entity(&entity)? {
                println!("Tracking {entity}");
            } else {
                println!("{entity} is already tracked");
            }
        }
        ConfigAction::Untrack { entity } => {
            if si.untrack_entity(&entity)? {
                println!("Stopped tracking {entity}");
            } else {
                println!("{entity} was not tracked");
            }
        }
        ConfigAction::Fallback { category } => {
            let cat = parse_optional(&category)?
                .map(|c| c.parse::<Category>())
                .transpose()
                .map_err(|e: String| e)?;
            si.set_fallback_category(cat)?;
            match cat {
                Some(cat) => println!("Fallback category set to {cat}"),
                None => println!("Fallback category cleared"),
            }
        }
        ConfigAction::MaxResults { max } => {
            let max = parse_optional(&max)?
                .map(|m| m.parse::<usize>())
                .transpose()
                .map_err(|e| format!("Invalid max results: {e}"))?;
            si.set_max_results(max)?;
            match max {
                Some(max) => println!("Returning at most {max} opportunities"),
                None => println!("Result cap removed"),
            }
        }
        ConfigAction::Timeout { ms } => {
            si.set_feed_timeout_ms(ms)?;
            println!("Feed timeout set to {ms}ms");
        }
        ConfigAction::Lookback { hours } => {
            si.set_lookback_hours(hours)?;
            println!("Feeds will look back {hours}h");
        }
    }
    Ok(())
}

/// `none` (any case) clears an optional setting.
fn parse_optional(s: &str) -> Result<Option<&str>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Value must not be empty".into());
    }
    if s.eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        Ok(Some(s))
    }
}

fn resolve_feeds(
    args: &FeedArgs,
) -> Result<(Box<dyn SignalSource>, chrono::DateTime<chrono::Utc>), Box<dyn std::error::Error>> {
    let now = parse_date(&args.now)?.unwrap_or_else(chrono::Utc::now);
    let source: Box<dyn SignalSource> = match &args.feeds {
        Some(dir) => Box::new(JsonDirSource::new(dir.clone())),
        None => {
            let http = HttpFeedSource::from_env();
            if http.is_empty() {
                return Err(
                    "No feeds configured: pass --feeds <dir> or set SIGNAL_INTEL_FEED_<KIND>".into(),
                );
            }
            Box::new(http)
        }
    };
    Ok((source, now))
}

fn parse_date(s: &Option<String>) -> Result<Option<chrono::DateTime<chrono::Utc>>, String> {
    match s {
        None => Ok(None),
        Some(s) => {
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
                return Ok(Some(dt.with_timezone(&chrono::Utc)));
            }
            if let Some(dt) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
            {
                return Ok(Some(chrono::DateTime::from_naive_utc_and_offset(
                    dt,
                    chrono::Utc,
                )));
            }
            Err(format!(
                "Invalid date format: {s}. Use YYYY-MM-DD or RFC3339"
            ))
        }
    }
}
