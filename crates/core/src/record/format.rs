//! Outbound message formatting.
//!
//! Every record value is written as a lowercase string. The generated
//! identifier and the timestamp are the only attributes left untouched.

use serde_json::Value;
use uuid::Uuid;

use super::types::{Action, Attribute, FormattedMessage, RawItem, Record};

/// Attribute holding the generated message identifier.
pub const MESSAGE_ID_ATTR: &str = "message_id";

/// Attribute holding the message timestamp.
pub const TIMESTAMP_ATTR: &str = "timestamp";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Current local time in the format messages are stamped with.
///
/// Pattern: `YYYY-MM-DD HH:MM:SS.ffffff`
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Coerces a JSON value into the lowercase string that gets stored.
///
/// Null becomes the empty string; arrays and objects are stored as their
/// compact JSON text.
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

/// Formats a record for writing, generating a fresh message identifier.
pub fn format_message(
    record: &Record,
    action: Action,
    timestamp: Option<&str>,
) -> FormattedMessage {
    format_message_with_id(record, action, timestamp, Uuid::new_v4())
}

/// Formats a record for writing with the given message identifier.
///
/// `timestamp` defaults to [`current_timestamp`]. Record attributes are
/// applied after the generated ones, so a record carrying its own
/// `timestamp` wins.
pub fn format_message_with_id(
    record: &Record,
    action: Action,
    timestamp: Option<&str>,
    message_id: Uuid,
) -> FormattedMessage {
    let mut item = RawItem::with_capacity(record.len() + 2);

    if action == Action::Put {
        item.insert(
            MESSAGE_ID_ATTR.to_string(),
            Attribute::S(message_id.to_string()),
        );
    }

    let stamp = match timestamp {
        Some(ts) => ts.to_string(),
        None => current_timestamp(),
    };
    item.insert(TIMESTAMP_ATTR.to_string(), Attribute::S(stamp));

    for (key, value) in record {
        item.insert(key.clone(), Attribute::S(coerce_value(value)));
    }

    FormattedMessage { message_id, item }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> Record {
        json!({
            "school_email": "Mail@Mail.CL",
            "school_id": 22,
            "contact_type": "Parent",
            "country": "chile",
            "verified": true,
            "phone": null,
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn fixed_id() -> Uuid {
        Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap()
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value(&json!("New Haven")), "new haven");
        assert_eq!(coerce_value(&json!(22)), "22");
        assert_eq!(coerce_value(&json!(1.5)), "1.5");
        assert_eq!(coerce_value(&json!(true)), "true");
        assert_eq!(coerce_value(&json!(null)), "");
        assert_eq!(coerce_value(&json!(["A", "b"])), r#"["a","b"]"#);
    }

    #[test]
    fn test_put_adds_message_id_and_timestamp() {
        let message = format_message_with_id(
            &sample_record(),
            Action::Put,
            Some("2024-01-15 10:30:00.000000"),
            fixed_id(),
        );

        assert_eq!(message.message_id, fixed_id());
        assert_eq!(
            message.item.get(MESSAGE_ID_ATTR),
            Some(&Attribute::S(fixed_id().to_string()))
        );
        assert_eq!(
            message.item.get(TIMESTAMP_ATTR),
            Some(&Attribute::S("2024-01-15 10:30:00.000000".to_string()))
        );
        assert_eq!(message.item.len(), sample_record().len() + 2);
    }

    #[test]
    fn test_update_only_stamps_timestamp() {
        let message = format_message(&sample_record(), Action::Update, None);

        assert!(!message.item.contains_key(MESSAGE_ID_ATTR));
        assert!(message.item.contains_key(TIMESTAMP_ATTR));
        assert_eq!(message.item.len(), sample_record().len() + 1);
    }

    #[test]
    fn test_every_value_is_a_lowercase_string() {
        let message = format_message(&sample_record(), Action::Put, None);

        for (key, attribute) in &message.item {
            let value = attribute.as_s().expect("every attribute is a string");
            if key != MESSAGE_ID_ATTR && key != TIMESTAMP_ATTR {
                assert_eq!(value, value.to_lowercase());
            }
        }
        assert_eq!(message.item["school_email"], Attribute::S("mail@mail.cl".into()));
        assert_eq!(message.item["school_id"], Attribute::S("22".into()));
        assert_eq!(message.item["verified"], Attribute::S("true".into()));
        assert_eq!(message.item["phone"], Attribute::S(String::new()));
    }

    #[test]
    fn test_record_timestamp_overrides_generated_one() {
        let mut record = sample_record();
        record.insert("timestamp".to_string(), json!("Yesterday"));

        let message = format_message(&record, Action::Put, Some("2024-01-15"));

        assert_eq!(message.item[TIMESTAMP_ATTR], Attribute::S("yesterday".into()));
    }

    #[test]
    fn test_empty_record_still_gets_generated_attributes() {
        let message = format_message(&Record::new(), Action::Put, None);
        assert_eq!(message.item.len(), 2);
    }

    #[test]
    fn test_current_timestamp_shape() {
        let ts = current_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }
}
