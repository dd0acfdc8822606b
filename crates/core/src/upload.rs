//! Bulk upload payload parsing.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, TableError};
use crate::record::Record;

/// Key of the array holding the records to upload.
pub const SOURCE_KEY: &str = "_source";

/// Outcome of a bulk upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub uploaded: usize,
}

impl fmt::Display for UploadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} items uploaded", self.uploaded)
    }
}

/// Parses an upload payload into records.
///
/// The payload is an object whose `_source` array holds either JSON objects
/// or strings containing a JSON object. String entries must be JSON text;
/// single-quoted object literals such as `{'school_id': '1'}` are rejected.
///
/// # Examples
///
/// ```
/// use cbdynamo_core::upload::parse_upload_payload;
/// use serde_json::json;
///
/// let payload = json!({"_source": [{"school_id": "1"}, "{\"school_id\": \"2\"}"]});
/// let records = parse_upload_payload(&payload).unwrap();
/// assert_eq!(records.len(), 2);
/// ```
pub fn parse_upload_payload(payload: &Value) -> Result<Vec<Record>> {
    let entries = payload
        .get(SOURCE_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            TableError::InvalidData(format!("upload payload must contain a '{SOURCE_KEY}' array"))
        })?;

    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            parse_entry(entry).map_err(|msg| {
                TableError::InvalidData(format!("{SOURCE_KEY}[{position}]: {msg}"))
            })
        })
        .collect()
}

fn parse_entry(entry: &Value) -> std::result::Result<Record, String> {
    match entry {
        Value::Object(map) => Ok(map.clone()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err("string entry does not hold a JSON object".to_string()),
            Err(e) => Err(format!("invalid JSON: {e}")),
        },
        _ => Err("entry must be an object or a JSON string".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_mixed_entries() {
        let payload = json!({
            "_source": [
                {"school_id": "1", "country": "chile"},
                "{\"school_id\": \"2\", \"country\": \"peru\"}",
            ]
        });

        let records = parse_upload_payload(&payload).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["country"], json!("chile"));
        assert_eq!(records[1]["school_id"], json!("2"));
    }

    #[test]
    fn test_missing_source_array() {
        let err = parse_upload_payload(&json!({"items": []})).unwrap_err();
        assert_eq!(
            err,
            TableError::InvalidData("upload payload must contain a '_source' array".to_string())
        );
    }

    #[test]
    fn test_bad_entry_reports_position() {
        let payload = json!({"_source": [{"a": 1}, 42]});

        let err = parse_upload_payload(&payload).unwrap_err();

        assert_eq!(
            err,
            TableError::InvalidData(
                "_source[1]: entry must be an object or a JSON string".to_string()
            )
        );
    }

    #[test]
    fn test_string_entry_must_be_object() {
        let payload = json!({"_source": ["[1, 2]"]});
        assert!(matches!(
            parse_upload_payload(&payload),
            Err(TableError::InvalidData(msg)) if msg.contains("does not hold a JSON object")
        ));
    }

    #[test]
    fn test_single_quoted_entry_is_rejected() {
        let payload = json!({"_source": ["{'school_id': '1'}"]});

        assert!(matches!(
            parse_upload_payload(&payload),
            Err(TableError::InvalidData(msg)) if msg.starts_with("_source[0]: invalid JSON")
        ));
    }

    #[test]
    fn test_summary_display() {
        assert_eq!(UploadSummary { uploaded: 3 }.to_string(), "3 items uploaded");
    }
}
