//! DynamoDB store implementation.
//!
//! Implements the `TableStore` trait from `cbdynamo_core::storage` using DynamoDB.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, Select, WriteRequest};
use aws_sdk_dynamodb::Client;

use cbdynamo_core::expression::{equality_expression, projection_expression};
use cbdynamo_core::schema::TableDescription;
use cbdynamo_core::storage::{Page, QueryRequest, ScanRequest, TableStore};
use cbdynamo_core::{RawItem, Result, TableError};

use super::client::create_client;
use super::conversions::{
    from_attribute_map, table_description_from_sdk, to_attribute_map, to_attribute_value,
};
use super::error::{map_build_error, map_sdk_error};
use crate::config::Config;

/// DynamoDB-based store implementation.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    /// Creates a new store with the given DynamoDB client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a new store for the configured region and endpoint.
    pub async fn from_config(config: &Config) -> Self {
        Self::new(create_client(config).await)
    }

    /// Get the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Build a page from the parts scan and query outputs share.
fn page_from_parts(
    items: Option<Vec<HashMap<String, AttributeValue>>>,
    count: i32,
    last_evaluated_key: Option<HashMap<String, AttributeValue>>,
) -> Result<Page> {
    Ok(Page {
        items: items
            .unwrap_or_default()
            .into_iter()
            .map(from_attribute_map)
            .collect::<Result<_>>()?,
        count: i64::from(count),
        last_evaluated_key: last_evaluated_key.map(from_attribute_map).transpose()?,
    })
}

#[async_trait]
impl TableStore for DynamoDbStore {
    async fn put_item(&self, table_name: &str, item: RawItem) -> Result<()> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(to_attribute_map(item)))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, table_name))?;

        Ok(())
    }

    async fn get_item(&self, table_name: &str, key: RawItem) -> Result<Option<RawItem>> {
        let result = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(to_attribute_map(key)))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, table_name))?;

        result.item.map(from_attribute_map).transpose()
    }

    async fn scan_page(&self, request: ScanRequest) -> Result<Page> {
        let projection = projection_expression(&request.projection);
        let filter = equality_expression("f", &request.filters);

        let mut builder = self
            .client
            .scan()
            .table_name(&request.table_name)
            .set_exclusive_start_key(request.exclusive_start_key.map(to_attribute_map));

        if !projection.is_empty() {
            builder = builder.projection_expression(projection.text);
        }
        if !filter.is_empty() {
            builder = builder.filter_expression(filter.text);
        }
        for (placeholder, name) in projection.names.into_iter().chain(filter.names) {
            builder = builder.expression_attribute_names(placeholder, name);
        }
        for (placeholder, value) in filter.values {
            builder = builder.expression_attribute_values(placeholder, to_attribute_value(value));
        }

        let result = builder
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &request.table_name))?;

        page_from_parts(result.items, result.count, result.last_evaluated_key)
    }

    async fn query_page(&self, request: QueryRequest) -> Result<Page> {
        let resource = match &request.index_name {
            Some(index) => format!("{}/{}", request.table_name, index),
            None => request.table_name.clone(),
        };
        let key_condition = equality_expression(
            "k",
            &[(request.key_attribute.clone(), request.key_value.clone())],
        );
        let filter = equality_expression("f", &request.filters);

        let mut builder = self
            .client
            .query()
            .table_name(&request.table_name)
            .set_index_name(request.index_name.clone())
            .key_condition_expression(key_condition.text)
            .set_exclusive_start_key(request.exclusive_start_key.map(to_attribute_map));

        if request.count_only {
            builder = builder.select(Select::Count);
        }
        if !filter.is_empty() {
            builder = builder.filter_expression(filter.text);
        }
        for (placeholder, name) in key_condition.names.into_iter().chain(filter.names) {
            builder = builder.expression_attribute_names(placeholder, name);
        }
        for (placeholder, value) in key_condition.values.into_iter().chain(filter.values) {
            builder = builder.expression_attribute_values(placeholder, to_attribute_value(value));
        }

        let result = builder
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &resource))?;

        page_from_parts(result.items, result.count, result.last_evaluated_key)
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableDescription> {
        let result = self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, table_name))?;

        let table = result
            .table
            .ok_or_else(|| TableError::NotFound(format!("{table_name}: no table description")))?;

        Ok(table_description_from_sdk(table_name, &table))
    }

    async fn batch_delete(&self, table_name: &str, keys: Vec<RawItem>) -> Result<Vec<RawItem>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let write_requests = keys
            .into_iter()
            .map(|key| {
                DeleteRequest::builder()
                    .set_key(Some(to_attribute_map(key)))
                    .build()
                    .map(|delete| WriteRequest::builder().delete_request(delete).build())
                    .map_err(map_build_error)
            })
            .collect::<Result<Vec<_>>>()?;

        let result = self
            .client
            .batch_write_item()
            .request_items(table_name, write_requests)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, table_name))?;

        result
            .unprocessed_items
            .and_then(|mut unprocessed| unprocessed.remove(table_name))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|request| request.delete_request)
            .map(|delete| from_attribute_map(delete.key))
            .collect()
    }
}
