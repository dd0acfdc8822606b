//! Pretty output formatting.
//!
//! Headings carry ANSI colors; print through `anstream` so they are stripped
//! when stdout is not a terminal.

use std::collections::BTreeMap;

use serde_json::Value;

use cbdynamo_core::schema::{KeySchemaElement, KeyType};
use cbdynamo_core::Record;

pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const GREEN: &str = "\x1b[38;2;158;206;106m"; // #9ece6a
    pub const YELLOW: &str = "\x1b[38;2;224;175;104m"; // #e0af68
    pub const BLUE: &str = "\x1b[38;2;122;162;247m"; // #7aa2f7
}

pub fn green(text: &str) -> String {
    format!("{}{}{}", colors::GREEN, text, colors::RESET)
}

pub fn yellow(text: &str) -> String {
    format!("{}{}{}", colors::YELLOW, text, colors::RESET)
}

pub fn blue(text: &str) -> String {
    format!("{}{}{}", colors::BLUE, text, colors::RESET)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Format a record for display, one attribute per line in name order.
pub fn format_record(record: &Record) -> String {
    let mut names: Vec<&String> = record.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| format!("  {}: {}", name, format_value(&record[name])))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format records for display.
pub fn format_records(records: &[Record]) -> String {
    if records.is_empty() {
        return "No items found.".to_string();
    }
    let mut output = blue(&format!("ITEMS ({})", records.len()));
    output.push('\n');
    output.push_str(&"-".repeat(40));
    for record in records {
        output.push_str(&format!("\n{}", format_record(record)));
        output.push('\n');
    }
    output
}

fn key_type_label(key_type: KeyType) -> &'static str {
    match key_type {
        KeyType::Hash => "HASH",
        KeyType::Range => "RANGE",
    }
}

/// Format a key schema for display.
pub fn format_key_schema(key_schema: &[KeySchemaElement]) -> String {
    key_schema
        .iter()
        .map(|k| format!("  {} [{}]", k.attribute_name, key_type_label(k.key_type)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format secondary indexes for display.
pub fn format_indexes(indexes: &BTreeMap<String, Vec<KeySchemaElement>>) -> String {
    if indexes.is_empty() {
        return "No secondary indexes.".to_string();
    }
    let mut output = blue(&format!("INDEXES ({})", indexes.len()));
    output.push('\n');
    output.push_str(&"-".repeat(40));
    for (name, key_schema) in indexes {
        output.push_str(&format!("\n{}\n{}\n", name, format_key_schema(key_schema)));
    }
    output
}
