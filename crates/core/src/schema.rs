//! Table description types (pure data).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Result, TableError};

/// Role of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    Hash,
    Range,
}

/// A key attribute of a table or index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySchemaElement {
    #[serde(rename = "AttributeName")]
    pub attribute_name: String,
    #[serde(rename = "KeyType")]
    pub key_type: KeyType,
}

impl KeySchemaElement {
    pub fn hash(name: impl Into<String>) -> Self {
        Self {
            attribute_name: name.into(),
            key_type: KeyType::Hash,
        }
    }

    pub fn range(name: impl Into<String>) -> Self {
        Self {
            attribute_name: name.into(),
            key_type: KeyType::Range,
        }
    }
}

/// A global secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryIndex {
    pub name: String,
    pub key_schema: Vec<KeySchemaElement>,
}

/// What the store reports about a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescription {
    pub table_name: String,
    /// Approximate item count, refreshed periodically by the store.
    pub item_count: i64,
    pub key_schema: Vec<KeySchemaElement>,
    pub secondary_indexes: Vec<SecondaryIndex>,
}

impl TableDescription {
    /// The partition (HASH) key attribute.
    pub fn partition_key(&self) -> Result<&str> {
        self.key_schema
            .iter()
            .find(|k| k.key_type == KeyType::Hash)
            .map(|k| k.attribute_name.as_str())
            .ok_or_else(|| {
                TableError::InvalidData(format!("{} has no partition key", self.table_name))
            })
    }

    /// Names of every key attribute, partition key first.
    pub fn key_attributes(&self) -> Vec<String> {
        let mut keys: Vec<&KeySchemaElement> = self.key_schema.iter().collect();
        keys.sort_by_key(|k| k.key_type != KeyType::Hash);
        keys.into_iter().map(|k| k.attribute_name.clone()).collect()
    }

    /// Secondary index name to its key schema.
    pub fn secondary_index_map(&self) -> BTreeMap<String, Vec<KeySchemaElement>> {
        self.secondary_indexes
            .iter()
            .map(|index| (index.name.clone(), index.key_schema.clone()))
            .collect()
    }

    /// Looks up a secondary index by name.
    pub fn secondary_index(&self, name: &str) -> Option<&SecondaryIndex> {
        self.secondary_indexes.iter().find(|index| index.name == name)
    }
}

/// Checks a table name locally before any request is made.
///
/// Names must be 3 to 255 characters from `[A-Za-z0-9_.-]`.
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.len() < 3 || name.len() > 255 {
        return Err(TableError::Validation(format!(
            "invalid table name '{name}': length must be between 3 and 255"
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(TableError::Validation(format!(
            "invalid table name '{name}': unexpected character '{c}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_description() -> TableDescription {
        TableDescription {
            table_name: "messages_staging".to_string(),
            item_count: 12,
            key_schema: vec![
                KeySchemaElement::range("timestamp"),
                KeySchemaElement::hash("message_id"),
            ],
            secondary_indexes: vec![
                SecondaryIndex {
                    name: "school_id-index".to_string(),
                    key_schema: vec![KeySchemaElement::hash("school_id")],
                },
                SecondaryIndex {
                    name: "parent_id-index".to_string(),
                    key_schema: vec![KeySchemaElement::hash("parent_id")],
                },
            ],
        }
    }

    #[test]
    fn test_partition_key_ignores_schema_order() {
        assert_eq!(sample_description().partition_key().unwrap(), "message_id");
    }

    #[test]
    fn test_partition_key_missing() {
        let mut description = sample_description();
        description.key_schema = vec![KeySchemaElement::range("timestamp")];
        assert!(matches!(
            description.partition_key(),
            Err(TableError::InvalidData(_))
        ));
    }

    #[test]
    fn test_key_attributes_partition_first() {
        assert_eq!(
            sample_description().key_attributes(),
            vec!["message_id".to_string(), "timestamp".to_string()]
        );
    }

    #[test]
    fn test_secondary_index_map() {
        let map = sample_description().secondary_index_map();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map["school_id-index"],
            vec![KeySchemaElement::hash("school_id")]
        );
        assert!(sample_description().secondary_index("parent_id-index").is_some());
        assert!(sample_description().secondary_index("country-index").is_none());
    }

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("messages_staging").is_ok());
        assert!(validate_table_name("my.table-1").is_ok());
        assert!(matches!(
            validate_table_name(""),
            Err(TableError::Validation(_))
        ));
        assert!(matches!(
            validate_table_name("ab"),
            Err(TableError::Validation(_))
        ));
        assert!(matches!(
            validate_table_name("bad name"),
            Err(TableError::Validation(_))
        ));
    }

    #[test]
    fn test_key_schema_serializes_like_the_service() {
        let json = serde_json::to_value(KeySchemaElement::hash("message_id")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"AttributeName": "message_id", "KeyType": "HASH"})
        );
    }
}
