pub mod fixture;
pub mod http;
pub mod json_dir;

use crate::domain::error::SourceError;
use crate::domain::ports::signal_source::RawRecord;
use crate::domain::values::source_kind::SourceKind;
use serde_json::Value;

/// Accept either a bare JSON array of records or an envelope object with a
/// `records`, `data` or `items` array.
pub fn records_from_value(kind: SourceKind, value: Value) -> Result<Vec<RawRecord>, SourceError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => {
            for key in ["records", "data", "items"] {
                if let Some(Value::Array(items)) = obj.remove(key) {
                    return Ok(items);
                }
            }
            Err(SourceError::Parse {
                kind,
                reason: "expected an array or an object with a records/data/items array".into(),
            })
        }
        other => Err(SourceError::Parse {
            kind,
            reason: format!("expected an array, got {}", type_name(&other)),
        }),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_bare_array_and_envelopes() {
        let bare = records_from_value(SourceKind::Media, json!([{"a": 1}])).unwrap();
        assert_eq!(bare.len(), 1);
        let wrapped = records_from_value(SourceKind::Media, json!({"data": [{}, {}]})).unwrap();
        assert_eq!(wrapped.len(), 2);
    }

    #[test]
    fn test_rejects_scalars() {
        let err = records_from_value(SourceKind::Risk, json!("nope")).unwrap_err();
        assert!(matches!(err, SourceError::Parse { kind: SourceKind::Risk, .. }));
    }
}
