//! The table handle: helpers scoped to one table.
//!
//! [`Table`] is generic over a [`TableStore`], so every helper runs the same
//! way against DynamoDB or the in-memory store. The pure parts (formatting,
//! index planning, key extraction, payload parsing) live in `cbdynamo_core`;
//! this module sequences them with store calls and logs at operation
//! boundaries.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use cbdynamo_core::batch::{delete_batches, extract_key};
use cbdynamo_core::column::{check_column, ColumnCheck};
use cbdynamo_core::index::{
    index_name_for, normalize_country, normalize_index, normalize_search_value, plan_index_query,
};
use cbdynamo_core::record::{
    self, record_to_item, unformat_item, unformat_items, value_to_attribute, Action,
    FormattedMessage,
};
use cbdynamo_core::schema::{validate_table_name, KeySchemaElement};
use cbdynamo_core::storage::{QueryRequest, ScanRequest, TableStore};
use cbdynamo_core::upload::{parse_upload_payload, UploadSummary};
use cbdynamo_core::{Attribute, RawItem, Record, Result, TableError};

/// How many times unprocessed delete keys are resent before giving up.
pub const MAX_UNPROCESSED_RETRIES: u32 = 5;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// Options for [`Table::post_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostOptions {
    /// Timestamp to stamp the message with (default: now).
    pub timestamp: Option<String>,
    /// Whether to write the generated `message_id`.
    pub include_message_id: bool,
}

impl Default for PostOptions {
    fn default() -> Self {
        Self {
            timestamp: None,
            include_message_id: true,
        }
    }
}

impl PostOptions {
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn without_message_id(mut self) -> Self {
        self.include_message_id = false;
        self
    }

    fn action(&self) -> Action {
        if self.include_message_id {
            Action::Put
        } else {
            Action::Update
        }
    }
}

/// Identifies a single item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKey {
    /// Value of the partition key; the key name is read from the key schema.
    Partition(String),
    /// Every key attribute, given explicitly.
    Attributes(Record),
}

impl From<&str> for ItemKey {
    fn from(value: &str) -> Self {
        ItemKey::Partition(value.to_string())
    }
}

impl From<Record> for ItemKey {
    fn from(record: Record) -> Self {
        ItemKey::Attributes(record)
    }
}

/// Helpers scoped to one table of a store.
pub struct Table<S> {
    store: S,
    table_name: String,
    country: Option<String>,
}

impl<S> fmt::Debug for Table<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("table_name", &self.table_name)
            .field("country", &self.country)
            .finish_non_exhaustive()
    }
}

impl<S> fmt::Display for Table<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{} ({})", self.table_name, country),
            None => write!(f, "{}", self.table_name),
        }
    }
}

impl<S: TableStore> Table<S> {
    /// Creates a handle for `table_name`.
    pub fn new(store: S, table_name: impl Into<String>) -> Self {
        Self {
            store,
            table_name: table_name.into(),
            country: None,
        }
    }

    /// Scopes index searches to a country.
    pub fn with_country(mut self, country: impl AsRef<str>) -> Self {
        self.country = Some(normalize_country(country.as_ref()));
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves and validates the table an operation targets.
    fn target<'a>(&'a self, table: Option<&'a str>) -> Result<&'a str> {
        let name = table.unwrap_or(&self.table_name);
        validate_table_name(name).inspect_err(|e| self.log_error(name, e))?;
        Ok(name)
    }

    fn log_error(&self, table_name: &str, error: &TableError) {
        tracing::error!(
            table_name,
            country = self.country.as_deref(),
            error = %error,
            "Table operation failed"
        );
    }

    // ------------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------------

    /// Formats a record for writing. See [`record::format_message`].
    pub fn format_message(
        &self,
        record: &Record,
        action: Action,
        timestamp: Option<&str>,
    ) -> FormattedMessage {
        record::format_message(record, action, timestamp)
    }

    /// Deserializes a raw item into a record.
    pub fn unformat_message(&self, item: &RawItem) -> Result<Record> {
        unformat_item(item)
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Formats and writes a record, returning the generated message id.
    ///
    /// When `include_message_id` is off the id is still generated and
    /// returned but not written.
    pub async fn post_message(&self, record: &Record, options: PostOptions) -> Result<Uuid> {
        let table_name = self.target(None)?;
        let message = self.format_message(record, options.action(), options.timestamp.as_deref());
        let message_id = message.message_id;

        self.store
            .put_item(table_name, message.into_item())
            .await
            .inspect_err(|e| self.log_error(table_name, e))?;

        tracing::info!(
            table_name,
            country = self.country.as_deref(),
            %message_id,
            "Message saved"
        );
        Ok(message_id)
    }

    /// Writes a record as a typed item, without coercion or generated
    /// attributes.
    pub async fn post_item(&self, record: &Record) -> Result<()> {
        let table_name = self.target(None)?;
        self.store
            .put_item(table_name, record_to_item(record))
            .await
            .inspect_err(|e| self.log_error(table_name, e))?;

        tracing::debug!(table_name, "Item saved");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Reads one item. A missing item is `Ok(None)`.
    pub async fn get_item(&self, table: Option<&str>, key: ItemKey) -> Result<Option<Record>> {
        let table_name = self.target(table)?;

        let key = match key {
            ItemKey::Partition(value) => {
                let description = self
                    .store
                    .describe_table(table_name)
                    .await
                    .inspect_err(|e| self.log_error(table_name, e))?;
                let partition_key = description
                    .partition_key()
                    .inspect_err(|e| self.log_error(table_name, e))?;
                RawItem::from([(partition_key.to_string(), Attribute::S(value))])
            }
            ItemKey::Attributes(record) => record_to_item(&record),
        };

        let item = self
            .store
            .get_item(table_name, key)
            .await
            .inspect_err(|e| self.log_error(table_name, e))?;

        match item {
            Some(item) => unformat_item(&item)
                .map(Some)
                .inspect_err(|e| self.log_error(table_name, e)),
            None => {
                tracing::info!(table_name, "Item not found");
                Ok(None)
            }
        }
    }

    /// Reads every item of a table.
    pub async fn get_all_messages(&self, table: Option<&str>) -> Result<Vec<Record>> {
        let table_name = self.target(table)?;
        let items = self.scan_all(ScanRequest::new(table_name)).await?;
        unformat_items(&items).inspect_err(|e| self.log_error(table_name, e))
    }

    /// Counts the items whose `index` attribute equals `value`.
    pub async fn get_column_count(&self, index: &str, value: &str) -> Result<i64> {
        let table_name = self.target(None)?;
        let attribute = normalize_index(index);

        let request = QueryRequest::new(table_name, attribute, Attribute::from(value))
            .on_index(index_name_for(attribute))
            .count_only();
        let (_, count) = self.query_all(request).await?;

        tracing::debug!(table_name, index = attribute, value, count, "Counted index");
        Ok(count)
    }

    /// The item count the store reports for a table.
    ///
    /// The store refreshes this periodically, so it may lag recent writes.
    pub async fn get_index_count(&self, table: Option<&str>) -> Result<i64> {
        let table_name = self.target(table)?;
        let description = self
            .store
            .describe_table(table_name)
            .await
            .inspect_err(|e| self.log_error(table_name, e))?;
        Ok(description.item_count)
    }

    pub async fn get_index_key_schema(&self, table: Option<&str>) -> Result<Vec<KeySchemaElement>> {
        let table_name = self.target(table)?;
        let description = self
            .store
            .describe_table(table_name)
            .await
            .inspect_err(|e| self.log_error(table_name, e))?;
        Ok(description.key_schema)
    }

    /// Secondary index name to key schema.
    pub async fn get_index_secondary_indexes(
        &self,
        table: Option<&str>,
    ) -> Result<BTreeMap<String, Vec<KeySchemaElement>>> {
        let table_name = self.target(table)?;
        let description = self
            .store
            .describe_table(table_name)
            .await
            .inspect_err(|e| self.log_error(table_name, e))?;
        Ok(description.secondary_index_map())
    }

    /// Finds the items whose `index` attribute equals `value`.
    ///
    /// `index` may be the attribute name or the full index name. When the
    /// handle has a country, results are filtered to it unless the country
    /// index itself is searched. No matches is a `NotFound` error.
    pub async fn search_on_index(&self, index: &str, value: &str) -> Result<Vec<Record>> {
        let table_name = self.target(None)?;

        if index.is_empty() || value.is_empty() {
            let error =
                TableError::Validation("index and value must both be non-empty".to_string());
            self.log_error(table_name, &error);
            return Err(error);
        }

        let plan = plan_index_query(index, value, self.country.as_deref());
        tracing::debug!(
            table_name,
            index = %plan.index_name,
            value = %normalize_search_value(value),
            "Searching index"
        );

        let request = QueryRequest::new(table_name, plan.key_attribute.clone(), plan.value)
            .on_index(plan.index_name)
            .with_filters(plan.filters);
        let (items, _) = self.query_all(request).await?;

        if items.is_empty() {
            let error = TableError::NotFound(format!(
                "{table_name}: no items where {} = '{}'",
                plan.key_attribute,
                normalize_search_value(value)
            ));
            tracing::info!(table_name, index = %plan.key_attribute, value, "No items found");
            return Err(error);
        }

        unformat_items(&items).inspect_err(|e| self.log_error(table_name, e))
    }

    /// Reads one attribute of every item, alongside the partition key.
    ///
    /// `filters` are equality conditions on other attributes. Items lacking
    /// the attribute are kept but logged.
    pub async fn get_column(
        &self,
        table: Option<&str>,
        attr_name: &str,
        filters: &Record,
    ) -> Result<Vec<Record>> {
        let table_name = self.target(table)?;
        let description = self
            .store
            .describe_table(table_name)
            .await
            .inspect_err(|e| self.log_error(table_name, e))?;
        let partition_key = description
            .partition_key()
            .inspect_err(|e| self.log_error(table_name, e))?
            .to_string();

        let filters = filters
            .iter()
            .map(|(name, value)| (name.clone(), value_to_attribute(value)))
            .collect();
        let request = ScanRequest::new(table_name)
            .with_projection(vec![partition_key, attr_name.to_string()])
            .with_filters(filters);

        let items = unformat_items(&self.scan_all(request).await?)
            .inspect_err(|e| self.log_error(table_name, e))?;

        match check_column(table_name, &items, attr_name)
            .inspect_err(|e| self.log_error(table_name, e))?
        {
            ColumnCheck::Partial { missing } => {
                tracing::warn!(
                    table_name,
                    attribute = attr_name,
                    missing,
                    "Some items are missing the attribute"
                );
            }
            ColumnCheck::Complete => {}
        }

        Ok(items)
    }

    // ------------------------------------------------------------------------
    // Bulk operations
    // ------------------------------------------------------------------------

    /// Posts every record of an upload payload.
    ///
    /// Stops at the first failed write; records before it stay written.
    pub async fn upload_table(
        &self,
        payload: &Value,
        timestamp: Option<&str>,
    ) -> Result<UploadSummary> {
        let table_name = self.target(None)?;
        let records =
            parse_upload_payload(payload).inspect_err(|e| self.log_error(table_name, e))?;

        let options = PostOptions {
            timestamp: timestamp.map(str::to_string),
            ..PostOptions::default()
        };
        for record in &records {
            self.post_message(record, options.clone()).await?;
        }

        let summary = UploadSummary {
            uploaded: records.len(),
        };
        tracing::info!(table_name, uploaded = summary.uploaded, "Upload finished");
        Ok(summary)
    }

    /// Deletes every item of the table, returning how many were deleted.
    pub async fn truncate_table(&self) -> Result<usize> {
        let table_name = self.target(None)?;
        let description = self
            .store
            .describe_table(table_name)
            .await
            .inspect_err(|e| self.log_error(table_name, e))?;
        let key_attributes = description.key_attributes();

        let items = self
            .scan_all(ScanRequest::new(table_name).with_projection(key_attributes.clone()))
            .await?;
        let keys = items
            .iter()
            .map(|item| extract_key(item, &key_attributes))
            .collect::<Result<Vec<_>>>()
            .inspect_err(|e| self.log_error(table_name, e))?;
        let total = keys.len();

        for batch in delete_batches(keys) {
            self.delete_batch(table_name, batch).await?;
        }

        tracing::info!(table_name, deleted = total, "Table truncated");
        Ok(total)
    }

    // ------------------------------------------------------------------------
    // Pagination helpers
    // ------------------------------------------------------------------------

    async fn scan_all(&self, request: ScanRequest) -> Result<Vec<RawItem>> {
        let table_name = request.table_name.clone();
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let page = self
                .store
                .scan_page(request.clone().with_start_key(start_key))
                .await
                .inspect_err(|e| self.log_error(&table_name, e))?;
            items.extend(page.items);
            start_key = page.last_evaluated_key;
            if start_key.is_none() {
                break;
            }
        }

        Ok(items)
    }

    /// Runs a query over every page, returning the items and the summed count.
    async fn query_all(&self, request: QueryRequest) -> Result<(Vec<RawItem>, i64)> {
        let table_name = request.table_name.clone();
        let mut items = Vec::new();
        let mut count = 0;
        let mut start_key = None;

        loop {
            let page = self
                .store
                .query_page(request.clone().with_start_key(start_key))
                .await
                .inspect_err(|e| self.log_error(&table_name, e))?;
            items.extend(page.items);
            count += page.count;
            start_key = page.last_evaluated_key;
            if start_key.is_none() {
                break;
            }
        }

        Ok((items, count))
    }

    /// Deletes one batch, resending unprocessed keys with backoff.
    async fn delete_batch(&self, table_name: &str, mut keys: Vec<RawItem>) -> Result<()> {
        let mut attempt = 0;

        loop {
            keys = self
                .store
                .batch_delete(table_name, keys)
                .await
                .inspect_err(|e| self.log_error(table_name, e))?;
            if keys.is_empty() {
                return Ok(());
            }

            attempt += 1;
            if attempt > MAX_UNPROCESSED_RETRIES {
                let error = TableError::RequestFailed(format!(
                    "{table_name}: {} keys left unprocessed after {MAX_UNPROCESSED_RETRIES} retries",
                    keys.len()
                ));
                self.log_error(table_name, &error);
                return Err(error);
            }

            tracing::warn!(
                table_name,
                unprocessed = keys.len(),
                attempt,
                "Retrying unprocessed deletes"
            );
            tokio::time::sleep(RETRY_BASE_DELAY * 2u32.pow(attempt - 1)).await;
        }
    }
}
