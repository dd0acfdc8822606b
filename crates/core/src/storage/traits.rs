use async_trait::async_trait;

use super::{Page, QueryRequest, ScanRequest};
use crate::error::Result;
use crate::record::RawItem;
use crate::schema::TableDescription;

/// The store operations the table helpers are built on.
///
/// Each method is a single request; pagination is driven by the caller.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Writes an item, replacing any item with the same primary key.
    async fn put_item(&self, table_name: &str, item: RawItem) -> Result<()>;

    /// Reads an item by its full primary key.
    async fn get_item(&self, table_name: &str, key: RawItem) -> Result<Option<RawItem>>;

    /// Reads one page of a table scan.
    async fn scan_page(&self, request: ScanRequest) -> Result<Page>;

    /// Reads one page of a key-condition query.
    async fn query_page(&self, request: QueryRequest) -> Result<Page>;

    /// Describes a table's keys, indexes, and item count.
    async fn describe_table(&self, table_name: &str) -> Result<TableDescription>;

    /// Deletes up to one batch of items by key.
    ///
    /// Returns the keys the store did not process.
    async fn batch_delete(&self, table_name: &str, keys: Vec<RawItem>) -> Result<Vec<RawItem>>;
}
