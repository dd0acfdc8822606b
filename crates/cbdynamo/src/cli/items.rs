//! Item read and write commands.

use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;

use crate::table::ItemKey;
use cbdynamo_core::Record;

/// Parses a JSON object argument.
pub fn parse_record(raw: &str) -> Result<Record, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {other}")),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

/// Parses an item key: a JSON object of key attributes, or a bare partition
/// key value.
pub fn parse_item_key(raw: &str) -> Result<ItemKey, String> {
    if raw.trim_start().starts_with('{') {
        parse_record(raw).map(ItemKey::Attributes)
    } else {
        Ok(ItemKey::Partition(raw.to_string()))
    }
}

/// Parses a `name=value` filter.
pub fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

/// Format and write a message.
#[derive(Debug, Parser)]
pub struct PutCommand {
    /// Record to write, as a JSON object.
    #[arg(value_parser = parse_record)]
    pub data: Record,
    /// Timestamp to stamp the message with (default: now).
    #[arg(long)]
    pub timestamp: Option<String>,
    /// Do not write a generated message_id.
    #[arg(long)]
    pub no_message_id: bool,
}

/// Write an item as given.
#[derive(Debug, Parser)]
pub struct PutItemCommand {
    /// Item to write, as a JSON object.
    #[arg(value_parser = parse_record)]
    pub data: Record,
}

/// Read one item.
#[derive(Debug, Parser)]
pub struct GetCommand {
    /// Partition key value, or a JSON object with every key attribute.
    #[arg(value_parser = parse_item_key)]
    pub key: ItemKey,
}

/// Read every item.
#[derive(Debug, Parser)]
pub struct ScanCommand {}

/// Search a secondary index.
#[derive(Debug, Parser)]
pub struct SearchCommand {
    /// Index name or the attribute it is keyed on.
    pub index: String,
    /// Value to match.
    pub value: String,
}

/// Read one attribute of every item.
#[derive(Debug, Parser)]
pub struct ColumnCommand {
    /// Attribute to read.
    pub attribute: String,
    /// Equality filter (repeatable).
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
}

impl ColumnCommand {
    /// Filters as a record of string values.
    pub fn filter_record(&self) -> Record {
        self.filters
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect()
    }
}

/// Write every record of an upload file.
#[derive(Debug, Parser)]
pub struct UploadCommand {
    /// JSON file with a `_source` array of records.
    pub path: PathBuf,
    /// Timestamp to stamp every message with (default: now).
    #[arg(long)]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        let record = parse_record(r#"{"school_id": "42"}"#).unwrap();
        assert_eq!(record["school_id"], "42");

        assert!(parse_record("[1, 2]").is_err());
        assert!(parse_record("{oops").is_err());
    }

    #[test]
    fn test_parse_item_key() {
        assert_eq!(
            parse_item_key("abc").unwrap(),
            ItemKey::Partition("abc".to_string())
        );
        assert!(matches!(
            parse_item_key(r#"{"message_id": "abc"}"#).unwrap(),
            ItemKey::Attributes(_)
        ));
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("country=new haven").unwrap(),
            ("country".to_string(), "new haven".to_string())
        );
        assert_eq!(
            parse_filter("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_filter("country").is_err());
        assert!(parse_filter("=chile").is_err());
    }

    #[test]
    fn test_filter_record() {
        let cmd = ColumnCommand {
            attribute: "school_id".to_string(),
            filters: vec![("country".to_string(), "chile".to_string())],
        };
        assert_eq!(cmd.filter_record()["country"], "chile");
    }
}
