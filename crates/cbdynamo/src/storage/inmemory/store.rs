//! In-memory store implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cbdynamo_core::batch::{extract_key, BATCH_WRITE_LIMIT};
use cbdynamo_core::schema::{KeySchemaElement, SecondaryIndex, TableDescription};
use cbdynamo_core::storage::{Page, QueryRequest, ScanRequest, TableStore};
use cbdynamo_core::{Attribute, RawItem, Result, TableError};

/// Items returned per page when no page size is configured.
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
struct MemoryTable {
    key_schema: Vec<KeySchemaElement>,
    secondary_indexes: Vec<SecondaryIndex>,
    items: Vec<RawItem>,
}

impl MemoryTable {
    fn description(&self, table_name: &str) -> TableDescription {
        TableDescription {
            table_name: table_name.to_string(),
            item_count: self.items.len() as i64,
            key_schema: self.key_schema.clone(),
            secondary_indexes: self.secondary_indexes.clone(),
        }
    }

    fn key_attributes(&self, table_name: &str) -> Vec<String> {
        self.description(table_name).key_attributes()
    }

    fn position_of(&self, key: &RawItem, key_attributes: &[String]) -> Option<usize> {
        self.items
            .iter()
            .position(|item| extract_key(item, key_attributes).ok().as_ref() == Some(key))
    }
}

/// In-memory storage backend for testing.
///
/// Tables are registered up front with their key schema and indexes. Items
/// keep insertion order, and reads are split into pages of `page_size`
/// items so pagination paths get exercised.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, MemoryTable>>>,
    page_size: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a new store with no tables.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets how many items a single scan or query page reads.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Registers an empty table, replacing any table with the same name.
    pub async fn create_table(
        &self,
        table_name: impl Into<String>,
        key_schema: Vec<KeySchemaElement>,
        secondary_indexes: Vec<SecondaryIndex>,
    ) {
        let mut tables = self.tables.write().await;
        tables.insert(
            table_name.into(),
            MemoryTable {
                key_schema,
                secondary_indexes,
                items: Vec::new(),
            },
        );
    }

    /// Number of items currently stored in a table.
    pub async fn len(&self, table_name: &str) -> Option<usize> {
        let tables = self.tables.read().await;
        tables.get(table_name).map(|table| table.items.len())
    }

    fn not_found(table_name: &str) -> TableError {
        TableError::NotFound(format!(
            "{table_name}: Requested resource not found: Table: {table_name} not found"
        ))
    }

    /// Reads one page starting after `start_key`, returning the page items and
    /// the key to resume from.
    fn read_page<'a>(
        &self,
        candidates: &[&'a RawItem],
        start_key: Option<&RawItem>,
        key_attributes: &[String],
    ) -> Result<(Vec<&'a RawItem>, Option<RawItem>)> {
        let start = match start_key {
            Some(key) => {
                candidates
                    .iter()
                    .position(|item| extract_key(item, key_attributes).ok().as_ref() == Some(key))
                    .ok_or_else(|| {
                        TableError::Validation("The provided starting key is invalid".to_string())
                    })?
                    + 1
            }
            None => 0,
        };

        let end = (start + self.page_size).min(candidates.len());
        let page: Vec<&RawItem> = candidates[start..end].to_vec();

        let last_evaluated_key = if end < candidates.len() {
            match page.last() {
                Some(last) => Some(extract_key(last, key_attributes)?),
                None => None,
            }
        } else {
            None
        };

        Ok((page, last_evaluated_key))
    }
}

fn matches_filters(item: &RawItem, filters: &[(String, Attribute)]) -> bool {
    filters
        .iter()
        .all(|(name, value)| item.get(name) == Some(value))
}

fn project(item: &RawItem, projection: &[String]) -> RawItem {
    if projection.is_empty() {
        return item.clone();
    }
    item.iter()
        .filter(|(name, _)| projection.contains(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn put_item(&self, table_name: &str, item: RawItem) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| Self::not_found(table_name))?;

        let key_attributes = table.key_attributes(table_name);
        let key = extract_key(&item, &key_attributes).map_err(|_| {
            TableError::Validation(format!(
                "{table_name}: One or more parameter values were invalid: Missing the key {} in the item",
                key_attributes.join(", ")
            ))
        })?;

        match table.position_of(&key, &key_attributes) {
            Some(position) => table.items[position] = item,
            None => table.items.push(item),
        }
        Ok(())
    }

    async fn get_item(&self, table_name: &str, key: RawItem) -> Result<Option<RawItem>> {
        let tables = self.tables.read().await;
        let table = tables
            .get(table_name)
            .ok_or_else(|| Self::not_found(table_name))?;

        let key_attributes = table.key_attributes(table_name);
        if key.len() != key_attributes.len() || extract_key(&key, &key_attributes).is_err() {
            return Err(TableError::Validation(format!(
                "{table_name}: The provided key element does not match the schema"
            )));
        }

        Ok(table
            .position_of(&key, &key_attributes)
            .map(|position| table.items[position].clone()))
    }

    async fn scan_page(&self, request: ScanRequest) -> Result<Page> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| Self::not_found(&request.table_name))?;

        let key_attributes = table.key_attributes(&request.table_name);
        let candidates: Vec<&RawItem> = table.items.iter().collect();
        let (page, last_evaluated_key) = self.read_page(
            &candidates,
            request.exclusive_start_key.as_ref(),
            &key_attributes,
        )?;

        let items: Vec<RawItem> = page
            .into_iter()
            .filter(|item| matches_filters(item, &request.filters))
            .map(|item| project(item, &request.projection))
            .collect();

        Ok(Page {
            count: items.len() as i64,
            items,
            last_evaluated_key,
        })
    }

    async fn query_page(&self, request: QueryRequest) -> Result<Page> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| Self::not_found(&request.table_name))?;

        let description = table.description(&request.table_name);
        let expected_key = match &request.index_name {
            Some(index_name) => description
                .secondary_index(index_name)
                .ok_or_else(|| {
                    TableError::Validation(format!(
                        "{}: The table does not have the specified index: {index_name}",
                        request.table_name
                    ))
                })?
                .key_schema
                .iter()
                .find(|k| k.key_type == cbdynamo_core::schema::KeyType::Hash)
                .map(|k| k.attribute_name.clone()),
            None => description.partition_key().ok().map(str::to_string),
        };

        if expected_key.as_deref() != Some(request.key_attribute.as_str()) {
            return Err(TableError::Validation(format!(
                "{}: Query condition missed key schema element: {}",
                request.table_name,
                expected_key.unwrap_or_default()
            )));
        }
        if request.key_value == Attribute::S(String::new()) {
            return Err(TableError::Validation(format!(
                "{}: One or more parameter values are not valid. A value specified for a secondary index key is not supported",
                request.table_name
            )));
        }

        let key_attributes = description.key_attributes();
        let candidates: Vec<&RawItem> = table
            .items
            .iter()
            .filter(|item| item.get(&request.key_attribute) == Some(&request.key_value))
            .collect();
        let (page, last_evaluated_key) = self.read_page(
            &candidates,
            request.exclusive_start_key.as_ref(),
            &key_attributes,
        )?;

        let matched: Vec<RawItem> = page
            .into_iter()
            .filter(|item| matches_filters(item, &request.filters))
            .cloned()
            .collect();

        Ok(Page {
            count: matched.len() as i64,
            items: if request.count_only { Vec::new() } else { matched },
            last_evaluated_key,
        })
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableDescription> {
        let tables = self.tables.read().await;
        tables
            .get(table_name)
            .map(|table| table.description(table_name))
            .ok_or_else(|| Self::not_found(table_name))
    }

    async fn batch_delete(&self, table_name: &str, keys: Vec<RawItem>) -> Result<Vec<RawItem>> {
        if keys.len() > BATCH_WRITE_LIMIT {
            return Err(TableError::Validation(format!(
                "{table_name}: Too many items requested for the BatchWriteItem call"
            )));
        }

        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| Self::not_found(table_name))?;

        let key_attributes = table.key_attributes(table_name);
        for key in &keys {
            if let Some(position) = table.position_of(key, &key_attributes) {
                table.items.remove(position);
            }
        }
        Ok(Vec::new())
    }
}
