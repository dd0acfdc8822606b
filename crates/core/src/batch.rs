//! Key extraction and delete batching for table truncation.

use crate::error::{Result, TableError};
use crate::record::RawItem;

/// Maximum number of requests in a single batch write.
pub const BATCH_WRITE_LIMIT: usize = 25;

/// Extracts the primary key attributes from an item.
pub fn extract_key(item: &RawItem, key_attributes: &[String]) -> Result<RawItem> {
    key_attributes
        .iter()
        .map(|name| {
            item.get(name)
                .map(|value| (name.clone(), value.clone()))
                .ok_or_else(|| TableError::InvalidData(format!("item is missing key '{name}'")))
        })
        .collect()
}

/// Splits keys into batches the store accepts in one write.
pub fn delete_batches(keys: Vec<RawItem>) -> Vec<Vec<RawItem>> {
    let mut batches = Vec::with_capacity(keys.len().div_ceil(BATCH_WRITE_LIMIT));
    let mut iter = keys.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(BATCH_WRITE_LIMIT).collect());
    }
    batches
}
