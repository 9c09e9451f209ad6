//! Signal normalizer: turns per-feed raw records into uniform [`Signal`]s.
//!
//! Each [`SourceKind`] names the fields its feed uses for title, description,
//! timestamps and entities. Candidates are tried in order and the first
//! non-empty one wins. Category comes from the record, then the feed's own
//! category, then keyword inference, then the configured fallback.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::signal::Signal;
use crate::domain::error::NormalizationError;
use crate::domain::ports::signal_source::RawRecord;
use crate::domain::values::category::Category;
use crate::domain::values::source_kind::SourceKind;

/// Candidate field names for one feed shape.
struct FieldMap {
    title: &'static [&'static str],
    description: &'static [&'static str],
    timestamp: &'static [&'static str],
    window_end: &'static [&'static str],
    entities: &'static [&'static str],
    default_category: Option<Category>,
}

const ID_FIELDS: &[&str] = &["id", "uuid", "external_id"];
const CATEGORY_FIELDS: &[&str] = &["category", "type"];

/// Attribute holding an explicit category value that matched no category.
pub const UNMAPPED_CATEGORY: &str = "unmapped_category";

/// Canonical scoring attributes and the raw names that feed them.
const CANONICAL_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("relevance_hint", &["relevance_hint", "relevance"]),
    ("confidence", &["confidence"]),
    ("severity", &["severity", "threat_level", "impact"]),
    ("reach", &["reach", "audience"]),
    ("influence", &["influence"]),
];

fn field_map(kind: SourceKind) -> FieldMap {
    match kind {
        SourceKind::Competitor => FieldMap {
            title: &["headline", "title", "action"],
            description: &["details", "description", "summary", "body"],
            timestamp: &["observed_at", "timestamp", "published_at", "date"],
            window_end: &["expires_at", "window_end", "deadline"],
            entities: &["competitor", "competitors", "entities"],
            default_category: Some(Category::CompetitorMove),
        },
        SourceKind::Media => FieldMap {
            title: &["headline", "title", "topic"],
            description: &["summary", "description", "pitch", "body"],
            timestamp: &["published_at", "timestamp", "date"],
            window_end: &["deadline", "window_end", "expires_at"],
            entities: &["outlet", "journalist", "entities", "topics"],
            default_category: Some(Category::MediaOpportunity),
        },
        SourceKind::Stakeholder => FieldMap {
            title: &["activity", "title", "headline"],
            description: &["description", "details", "summary"],
            timestamp: &["timestamp", "observed_at", "date"],
            window_end: &["window_end", "respond_by", "deadline"],
            entities: &["stakeholder", "group", "entities"],
            default_category: Some(Category::StakeholderActivity),
        },
        SourceKind::Risk => FieldMap {
            title: &["alert", "title", "headline"],
            description: &["description", "details", "summary"],
            timestamp: &["detected_at", "timestamp", "date"],
            window_end: &["window_end", "expires_at", "respond_by"],
            entities: &["entities", "affected", "subject"],
            default_category: Some(Category::RiskAlert),
        },
        SourceKind::Intel => FieldMap {
            title: &["title", "headline"],
            description: &["description", "body", "summary"],
            timestamp: &["timestamp", "source_timestamp", "observed_at"],
            window_end: &["window_end", "expires_at"],
            entities: &["entities", "subject_entities", "tags"],
            default_category: None,
        },
    }
}

/// Infer a category from free text using the fixed keyword table.
/// Matchers are tried in [`Category::INFERENCE_ORDER`]; first hit wins.
pub fn infer_category(text: &str) -> Option<Category> {
    let lower = text.to_lowercase();
    Category::INFERENCE_ORDER
        .into_iter()
        .find(|cat| cat.keywords().iter().any(|kw| lower.contains(kw)))
}

/// Collapse runs of whitespace and trim.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read a 0–100 level from a number (0–1 fraction, 1–10 scale or 0–100) or
/// a label such as `"high"`.
pub fn parse_level(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => {
            let x = n.as_f64()?;
            if !x.is_finite() || x < 0.0 {
                None
            } else if x <= 1.0 {
                Some(x * 100.0)
            } else if x <= 10.0 {
                Some(x * 10.0)
            } else {
                Some(x.min(100.0))
            }
        }
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "none" | "minimal" => Some(0.0),
            "low" => Some(25.0),
            "medium" | "moderate" => Some(50.0),
            "high" | "elevated" => Some(75.0),
            "critical" | "severe" | "very high" => Some(100.0),
            other => other.parse::<f64>().ok().and_then(|x| parse_level(&Value::from(x))),
        },
        _ => None,
    }
}

/// Stateless apart from the fallback category chosen by configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    fallback_category: Option<Category>,
}

impl Normalizer {
    pub fn new(fallback_category: Option<Category>) -> Self {
        Self { fallback_category }
    }

    pub fn normalize(
        &self,
        raw: &RawRecord,
        kind: SourceKind,
    ) -> Result<Signal, NormalizationError> {
        let obj = raw.as_object().ok_or(NormalizationError::NotAnObject)?;
        let fields = field_map(kind);

        let title = first_text(obj, fields.title).ok_or(NormalizationError::MissingField("title"))?;
        let description = first_text(obj, fields.description)
            .ok_or(NormalizationError::MissingField("description"))?;

        let source_timestamp = first_present(obj, fields.timestamp)
            .ok_or(NormalizationError::MissingField("timestamp"))
            .and_then(|(_, v)| parse_timestamp("timestamp", v))?;
        let window_end = match first_present(obj, fields.window_end) {
            Some((_, v)) => Some(parse_timestamp("window_end", v)?),
            None => None,
        };

        let explicit_category = first_text(obj, CATEGORY_FIELDS);
        let parsed_category = explicit_category
            .as_deref()
            .and_then(|s| s.parse::<Category>().ok());
        if let (Some(raw), None) = (&explicit_category, parsed_category) {
            debug!(source = %kind, category = %raw, "unrecognised category on record");
        }
        let category = self.resolve_category(parsed_category, &fields, &title, &description)?;
        let subject_entities = collect_entities(obj, fields.entities);
        let mut raw_attributes = collect_attributes(obj, &fields);

        if let (Some(raw), None) = (explicit_category, parsed_category) {
            raw_attributes.insert(UNMAPPED_CATEGORY.to_string(), Value::String(raw));
        }

        let id = match first_present(obj, ID_FIELDS).and_then(|(_, v)| scalar_text(v)) {
            Some(explicit) => format!("{kind}:{explicit}"),
            None => derived_id(category, &title, &source_timestamp),
        };

        Ok(Signal {
            id,
            category,
            source_kind: kind,
            title,
            description,
            source_timestamp,
            window_end,
            raw_attributes,
            subject_entities,
        })
    }

    fn resolve_category(
        &self,
        explicit: Option<Category>,
        fields: &FieldMap,
        title: &str,
        description: &str,
    ) -> Result<Category, NormalizationError> {
        if let Some(explicit) = explicit {
            return Ok(explicit);
        }
        if let Some(cat) = fields.default_category {
            return Ok(cat);
        }
        if let Some(cat) = infer_category(&format!("{title} {description}")) {
            return Ok(cat);
        }
        self.fallback_category
            .ok_or(NormalizationError::UnknownCategory)
    }
}

fn first_present<'a>(
    obj: &'a Map<String, Value>,
    names: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
    names.iter().find_map(|name| match obj.get(*name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some((*name, v)),
    })
}

fn first_text(obj: &Map<String, Value>, names: &[&'static str]) -> Option<String> {
    names.iter().find_map(|name| {
        obj.get(*name)
            .and_then(scalar_text)
            .map(|s| normalize_text(&s))
            .filter(|s| !s.is_empty())
    })
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(field: &'static str, v: &Value) -> Result<DateTime<Utc>, NormalizationError> {
    let invalid = |reason: String| NormalizationError::InvalidField { field, reason };
    match v {
        Value::Number(n) => {
            let secs = n
                .as_i64()
                .ok_or_else(|| invalid(format!("{n} is not a whole number of seconds")))?;
            Utc.timestamp_opt(secs, 0)
                .single()
                .ok_or_else(|| invalid(format!("{secs} is out of range")))
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc));
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                    return Ok(DateTime::from_naive_utc_and_offset(dt, Utc));
                }
            }
            Err(invalid(format!("'{s}' is not RFC3339 or YYYY-MM-DD")))
        }
        other => Err(invalid(format!("unsupported value {other}"))),
    }
}

fn collect_entities(obj: &Map<String, Value>, names: &[&'static str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |v: &Value| {
        let name = match v {
            Value::Object(o) => o.get("name").and_then(scalar_text),
            other => scalar_text(other),
        };
        if let Some(name) = name.map(|n| normalize_text(&n)) {
            if !name.is_empty() && !out.contains(&name) {
                out.push(name);
            }
        }
    };
    for name in names {
        match obj.get(*name) {
            Some(Value::Array(items)) => items.iter().for_each(&mut push),
            Some(v) => push(v),
            None => {}
        }
    }
    out
}

/// Everything that is not a core field is kept verbatim; canonical scoring
/// attributes are added on top as 0–100 numbers.
fn collect_attributes(obj: &Map<String, Value>, fields: &FieldMap) -> BTreeMap<String, Value> {
    let core: Vec<&str> = ID_FIELDS
        .iter()
        .chain(CATEGORY_FIELDS)
        .chain(fields.title)
        .chain(fields.description)
        .chain(fields.timestamp)
        .chain(fields.window_end)
        .chain(fields.entities)
        .copied()
        .collect();

    let mut attrs: BTreeMap<String, Value> = obj
        .iter()
        .filter(|(k, _)| !core.contains(&k.as_str()) && k.as_str() != "attributes")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    // Intel records may nest their attributes.
    if let Some(Value::Object(nested)) = obj.get("attributes") {
        for (k, v) in nested {
            attrs.insert(k.clone(), v.clone());
        }
    }

    for (canonical, aliases) in CANONICAL_ATTRIBUTES {
        let level = aliases
            .iter()
            .find_map(|alias| attrs.get(*alias).and_then(parse_level));
        match level {
            Some(level) => {
                attrs.insert((*canonical).to_string(), Value::from(level));
            }
            None => {
                // A canonical name holding something unreadable must not be
                // mistaken for a score later on.
                if attrs.get(*canonical).is_some_and(|v| !v.is_number()) {
                    attrs.remove(*canonical);
                }
            }
        }
    }
    attrs
}

fn derived_id(category: Category, title: &str, observed_at: &DateTime<Utc>) -> String {
    let key = format!("{}|{}|{}", category, title.to_lowercase(), observed_at.to_rfc3339());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_level_scales() {
        assert_eq!(parse_level(&json!(0.8)), Some(80.0));
        assert_eq!(parse_level(&json!(7)), Some(70.0));
        assert_eq!(parse_level(&json!(65)), Some(65.0));
        assert_eq!(parse_level(&json!(250)), Some(100.0));
        assert_eq!(parse_level(&json!("High")), Some(75.0));
        assert_eq!(parse_level(&json!("0.5")), Some(50.0));
        assert_eq!(parse_level(&json!(-1)), None);
        assert_eq!(parse_level(&json!("unclear")), None);
    }

    #[test]
    fn test_infer_category_priority() {
        // Both regulatory and competitor keywords: regulatory is tried first.
        assert_eq!(
            infer_category("Rival launch delayed by new compliance rules"),
            Some(Category::RegulatoryChange)
        );
        assert_eq!(infer_category("Podcast interview request"), Some(Category::MediaOpportunity));
        assert_eq!(infer_category("Quarterly picnic"), None);
    }

    #[test]
    fn test_normalize_text_collapses_whitespace() {
        assert_eq!(normalize_text("  Acme \n launches\tthing  "), "Acme launches thing");
    }
}
