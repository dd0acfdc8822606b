use crate::record::{Attribute, RawItem};

/// A single scan request page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanRequest {
    pub table_name: String,
    /// Attributes to return; empty returns every attribute.
    pub projection: Vec<String>,
    /// Equality filters applied after the read.
    pub filters: Vec<(String, Attribute)>,
    pub exclusive_start_key: Option<RawItem>,
}

impl ScanRequest {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    pub fn with_projection(mut self, attributes: Vec<String>) -> Self {
        self.projection = attributes;
        self
    }

    pub fn with_filters(mut self, filters: Vec<(String, Attribute)>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_start_key(mut self, key: Option<RawItem>) -> Self {
        self.exclusive_start_key = key;
        self
    }
}

/// A single query request page: one equality key condition.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub table_name: String,
    pub index_name: Option<String>,
    pub key_attribute: String,
    pub key_value: Attribute,
    /// Equality filters applied after the key condition.
    pub filters: Vec<(String, Attribute)>,
    /// Only count matches, returning no items.
    pub count_only: bool,
    pub exclusive_start_key: Option<RawItem>,
}

impl QueryRequest {
    pub fn new(
        table_name: impl Into<String>,
        key_attribute: impl Into<String>,
        key_value: Attribute,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: None,
            key_attribute: key_attribute.into(),
            key_value,
            filters: Vec::new(),
            count_only: false,
            exclusive_start_key: None,
        }
    }

    pub fn on_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    pub fn with_filters(mut self, filters: Vec<(String, Attribute)>) -> Self {
        self.filters = filters;
        self
    }

    pub fn count_only(mut self) -> Self {
        self.count_only = true;
        self
    }

    pub fn with_start_key(mut self, key: Option<RawItem>) -> Self {
        self.exclusive_start_key = key;
        self
    }
}

/// One page of results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<RawItem>,
    /// Matches on this page (after filters).
    pub count: i64,
    /// Present when more pages follow.
    pub last_evaluated_key: Option<RawItem>,
}

impl Page {
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}
