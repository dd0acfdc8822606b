//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between SDK types and the core item model.
//! These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::{
    AttributeValue, KeySchemaElement as SdkKeySchemaElement, KeyType as SdkKeyType,
    TableDescription as SdkTableDescription,
};
use cbdynamo_core::schema::{KeySchemaElement, KeyType, SecondaryIndex, TableDescription};
use cbdynamo_core::{Attribute, RawItem, Result, TableError};

// ============================================================================
// Attribute conversions
// ============================================================================

/// Convert a core attribute to an SDK attribute value.
pub fn to_attribute_value(attribute: Attribute) -> AttributeValue {
    match attribute {
        Attribute::S(s) => AttributeValue::S(s),
        Attribute::N(n) => AttributeValue::N(n),
        Attribute::B(bytes) => AttributeValue::B(Blob::new(bytes)),
        Attribute::Ss(values) => AttributeValue::Ss(values),
        Attribute::Ns(values) => AttributeValue::Ns(values),
        Attribute::Bs(values) => AttributeValue::Bs(values.into_iter().map(Blob::new).collect()),
        Attribute::M(map) => AttributeValue::M(to_attribute_map(map)),
        Attribute::L(list) => AttributeValue::L(list.into_iter().map(to_attribute_value).collect()),
        Attribute::Null => AttributeValue::Null(true),
        Attribute::Bool(b) => AttributeValue::Bool(b),
    }
}

/// Convert an SDK attribute value to a core attribute.
pub fn from_attribute_value(value: AttributeValue) -> Result<Attribute> {
    let attribute = match value {
        AttributeValue::S(s) => Attribute::S(s),
        AttributeValue::N(n) => Attribute::N(n),
        AttributeValue::B(blob) => Attribute::B(blob.into_inner()),
        AttributeValue::Ss(values) => Attribute::Ss(values),
        AttributeValue::Ns(values) => Attribute::Ns(values),
        AttributeValue::Bs(values) => {
            Attribute::Bs(values.into_iter().map(Blob::into_inner).collect())
        }
        AttributeValue::M(map) => Attribute::M(from_attribute_map(map)?),
        AttributeValue::L(list) => Attribute::L(
            list.into_iter()
                .map(from_attribute_value)
                .collect::<Result<_>>()?,
        ),
        AttributeValue::Null(_) => Attribute::Null,
        AttributeValue::Bool(b) => Attribute::Bool(b),
        other => {
            return Err(TableError::InvalidData(format!(
                "unsupported attribute value: {:?}",
                other
            )))
        }
    };
    Ok(attribute)
}

/// Convert a core item to an SDK item.
pub fn to_attribute_map(item: RawItem) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(k, v)| (k, to_attribute_value(v)))
        .collect()
}

/// Convert an SDK item to a core item.
pub fn from_attribute_map(item: HashMap<String, AttributeValue>) -> Result<RawItem> {
    item.into_iter()
        .map(|(k, v)| from_attribute_value(v).map(|v| (k, v)))
        .collect()
}

// ============================================================================
// Table description conversions
// ============================================================================

/// Convert an SDK key schema element.
pub fn key_schema_from_sdk(element: &SdkKeySchemaElement) -> KeySchemaElement {
    KeySchemaElement {
        attribute_name: element.attribute_name().to_string(),
        key_type: match element.key_type() {
            SdkKeyType::Range => KeyType::Range,
            _ => KeyType::Hash,
        },
    }
}

/// Convert an SDK table description.
///
/// `requested_name` is used when the response omits the table name.
pub fn table_description_from_sdk(
    requested_name: &str,
    table: &SdkTableDescription,
) -> TableDescription {
    TableDescription {
        table_name: table.table_name().unwrap_or(requested_name).to_string(),
        item_count: table.item_count().unwrap_or_default(),
        key_schema: table.key_schema().iter().map(key_schema_from_sdk).collect(),
        secondary_indexes: table
            .global_secondary_indexes()
            .iter()
            .map(|gsi| SecondaryIndex {
                name: gsi.index_name().unwrap_or_default().to_string(),
                key_schema: gsi.key_schema().iter().map(key_schema_from_sdk).collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::GlobalSecondaryIndexDescription;

    fn sdk_key(name: &str, key_type: SdkKeyType) -> SdkKeySchemaElement {
        SdkKeySchemaElement::builder()
            .attribute_name(name)
            .key_type(key_type)
            .build()
            .unwrap()
    }

    #[test]
    fn test_nested_item_round_trip() {
        let item: RawItem = HashMap::from([
            ("message_id".to_string(), Attribute::S("abc".into())),
            ("count".to_string(), Attribute::N("3".into())),
            ("raw".to_string(), Attribute::B(vec![1, 2, 3])),
            (
                "meta".to_string(),
                Attribute::M(HashMap::from([(
                    "tags".to_string(),
                    Attribute::L(vec![Attribute::Null, Attribute::Bool(true)]),
                )])),
            ),
        ]);

        let sdk_item = to_attribute_map(item.clone());
        assert_eq!(sdk_item["count"], AttributeValue::N("3".into()));
        assert_eq!(sdk_item["raw"], AttributeValue::B(Blob::new(vec![1, 2, 3])));

        assert_eq!(from_attribute_map(sdk_item).unwrap(), item);
    }

    #[test]
    fn test_null_is_written_as_true() {
        assert_eq!(to_attribute_value(Attribute::Null), AttributeValue::Null(true));
    }

    #[test]
    fn test_table_description_from_sdk() {
        let table = SdkTableDescription::builder()
            .table_name("messages_staging")
            .item_count(7)
            .key_schema(sdk_key("message_id", SdkKeyType::Hash))
            .key_schema(sdk_key("timestamp", SdkKeyType::Range))
            .global_secondary_indexes(
                GlobalSecondaryIndexDescription::builder()
                    .index_name("school_id-index")
                    .key_schema(sdk_key("school_id", SdkKeyType::Hash))
                    .build(),
            )
            .build();

        let description = table_description_from_sdk("ignored", &table);

        assert_eq!(description.table_name, "messages_staging");
        assert_eq!(description.item_count, 7);
        assert_eq!(
            description.key_schema,
            vec![
                KeySchemaElement::hash("message_id"),
                KeySchemaElement::range("timestamp"),
            ]
        );
        assert_eq!(description.secondary_indexes.len(), 1);
        assert_eq!(description.secondary_indexes[0].name, "school_id-index");
    }

    #[test]
    fn test_table_description_defaults() {
        let table = SdkTableDescription::builder().build();

        let description = table_description_from_sdk("messages", &table);

        assert_eq!(description.table_name, "messages");
        assert_eq!(description.item_count, 0);
        assert!(description.key_schema.is_empty());
        assert!(description.secondary_indexes.is_empty());
    }
}
