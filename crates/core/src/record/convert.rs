//! Typed conversions between JSON values and store attributes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Number, Value};

use super::types::{Attribute, RawItem, Record};
use crate::error::{Result, TableError};

/// Converts a store attribute into a JSON value.
///
/// Numbers come back as integers when they fit in an `i64` and as floats
/// otherwise. Binary data is returned base64 encoded.
pub fn attribute_to_value(attribute: &Attribute) -> Result<Value> {
    let value = match attribute {
        Attribute::S(s) => Value::String(s.clone()),
        Attribute::N(n) => Value::Number(parse_number(n)?),
        Attribute::B(bytes) => Value::String(STANDARD.encode(bytes)),
        Attribute::Ss(values) => Value::Array(values.iter().cloned().map(Value::String).collect()),
        Attribute::Ns(values) => Value::Array(
            values
                .iter()
                .map(|n| parse_number(n).map(Value::Number))
                .collect::<Result<_>>()?,
        ),
        Attribute::Bs(values) => Value::Array(
            values
                .iter()
                .map(|bytes| Value::String(STANDARD.encode(bytes)))
                .collect(),
        ),
        Attribute::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| attribute_to_value(v).map(|v| (k.clone(), v)))
                .collect::<Result<_>>()?,
        ),
        Attribute::L(list) => Value::Array(
            list.iter().map(attribute_to_value).collect::<Result<_>>()?,
        ),
        Attribute::Null => Value::Null,
        Attribute::Bool(b) => Value::Bool(*b),
    };
    Ok(value)
}

/// Converts a JSON value into a store attribute without coercion.
pub fn value_to_attribute(value: &Value) -> Attribute {
    match value {
        Value::Null => Attribute::Null,
        Value::Bool(b) => Attribute::Bool(*b),
        Value::Number(n) => Attribute::N(n.to_string()),
        Value::String(s) => Attribute::S(s.clone()),
        Value::Array(values) => Attribute::L(values.iter().map(value_to_attribute).collect()),
        Value::Object(map) => Attribute::M(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_attribute(v)))
                .collect(),
        ),
    }
}

/// Converts a record into a typed item, keeping value types as given.
pub fn record_to_item(record: &Record) -> RawItem {
    record
        .iter()
        .map(|(k, v)| (k.clone(), value_to_attribute(v)))
        .collect()
}

/// Deserializes a raw item into a record.
pub fn unformat_item(item: &RawItem) -> Result<Record> {
    item.iter()
        .map(|(k, v)| {
            attribute_to_value(v)
                .map(|value| (k.clone(), value))
                .map_err(|e| match e {
                    TableError::InvalidData(msg) => {
                        TableError::InvalidData(format!("attribute '{k}': {msg}"))
                    }
                    other => other,
                })
        })
        .collect()
}

/// Deserializes a list of raw items.
pub fn unformat_items(items: &[RawItem]) -> Result<Vec<Record>> {
    items.iter().map(unformat_item).collect()
}

fn parse_number(raw: &str) -> Result<Number> {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(Number::from(i));
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Ok(Number::from(u));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| TableError::InvalidData(format!("invalid number: {raw}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use serde_json::json;

    #[test]
    fn test_unformat_scalar_types() {
        let item: RawItem = HashMap::from([
            ("name".to_string(), Attribute::S("colegio".into())),
            ("students".to_string(), Attribute::N("120".into())),
            ("ratio".to_string(), Attribute::N("0.25".into())),
            ("active".to_string(), Attribute::Bool(true)),
            ("deleted_at".to_string(), Attribute::Null),
        ]);

        let record = unformat_item(&item).unwrap();

        assert_eq!(record["name"], json!("colegio"));
        assert_eq!(record["students"], json!(120));
        assert_eq!(record["ratio"], json!(0.25));
        assert_eq!(record["active"], json!(true));
        assert_eq!(record["deleted_at"], Value::Null);
    }

    #[test]
    fn test_unformat_collections() {
        let item: RawItem = HashMap::from([
            (
                "tags".to_string(),
                Attribute::Ss(vec!["a".into(), "b".into()]),
            ),
            (
                "scores".to_string(),
                Attribute::Ns(vec!["1".into(), "2.5".into()]),
            ),
            ("raw".to_string(), Attribute::B(b"hi".to_vec())),
            (
                "meta".to_string(),
                Attribute::M(HashMap::from([(
                    "nested".to_string(),
                    Attribute::L(vec![Attribute::S("x".into()), Attribute::Null]),
                )])),
            ),
        ]);

        let record = unformat_item(&item).unwrap();

        assert_eq!(record["tags"], json!(["a", "b"]));
        assert_eq!(record["scores"], json!([1, 2.5]));
        assert_eq!(record["raw"], json!("aGk="));
        assert_eq!(record["meta"], json!({"nested": ["x", null]}));
    }

    #[test]
    fn test_unformat_invalid_number_names_the_attribute() {
        let item: RawItem = HashMap::from([("count".to_string(), Attribute::N("abc".into()))]);

        let err = unformat_item(&item).unwrap_err();

        assert_eq!(
            err,
            TableError::InvalidData("attribute 'count': invalid number: abc".to_string())
        );
    }

    #[test]
    fn test_unformat_items_empty() {
        assert!(unformat_items(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_record_to_item_keeps_types() {
        let record = json!({
            "id": "abc",
            "count": 3,
            "ok": false,
            "none": null,
            "list": [1, "two"],
            "obj": {"k": "v"},
        })
        .as_object()
        .cloned()
        .unwrap();

        let item = record_to_item(&record);

        assert_eq!(item["id"], Attribute::S("abc".into()));
        assert_eq!(item["count"], Attribute::N("3".into()));
        assert_eq!(item["ok"], Attribute::Bool(false));
        assert_eq!(item["none"], Attribute::Null);
        assert_eq!(
            item["list"],
            Attribute::L(vec![Attribute::N("1".into()), Attribute::S("two".into())])
        );
        assert_eq!(
            item["obj"],
            Attribute::M(HashMap::from([("k".to_string(), Attribute::S("v".into()))]))
        );
    }

    #[test]
    fn test_large_unsigned_number() {
        let value = attribute_to_value(&Attribute::N("18446744073709551615".into())).unwrap();
        assert_eq!(value, json!(18446744073709551615u64));
    }
}
