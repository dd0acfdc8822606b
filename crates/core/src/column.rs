//! Checks on single-attribute column reads.

use crate::error::{Result, TableError};
use crate::record::Record;

/// How completely a column is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCheck {
    /// Every item carries the attribute.
    Complete,
    /// Some items are missing the attribute.
    Partial { missing: usize },
}

/// Checks the items returned for a column projection of `attr_name`.
///
/// Items are projected to the partition key plus `attr_name`, so an item with
/// a single attribute is missing the column.
pub fn check_column(table_name: &str, items: &[Record], attr_name: &str) -> Result<ColumnCheck> {
    if items.is_empty() {
        return Err(TableError::Validation(format!(
            "{table_name} contains no items that match these criteria"
        )));
    }

    let missing = items.iter().filter(|item| item.len() <= 1).count();

    if missing == items.len() {
        Err(TableError::Validation(format!(
            "{table_name} object has no attribute '{attr_name}'"
        )))
    } else if missing > 0 {
        Ok(ColumnCheck::Partial { missing })
    } else {
        Ok(ColumnCheck::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_no_items() {
        assert_eq!(
            check_column("schools", &[], "name"),
            Err(TableError::Validation(
                "schools contains no items that match these criteria".to_string()
            ))
        );
    }

    #[test]
    fn test_attribute_absent_everywhere() {
        let items = vec![record(json!({"id": "1"})), record(json!({"id": "2"}))];
        assert_eq!(
            check_column("schools", &items, "name"),
            Err(TableError::Validation(
                "schools object has no attribute 'name'".to_string()
            ))
        );
    }

    #[test]
    fn test_partial_column() {
        let items = vec![
            record(json!({"id": "1", "name": "a"})),
            record(json!({"id": "2"})),
        ];
        assert_eq!(
            check_column("schools", &items, "name"),
            Ok(ColumnCheck::Partial { missing: 1 })
        );
    }

    #[test]
    fn test_complete_column() {
        let items = vec![record(json!({"id": "1", "name": "a"}))];
        assert_eq!(
            check_column("schools", &items, "name"),
            Ok(ColumnCheck::Complete)
        );
    }
}
