//! cbdynamo - helpers scoped to a single DynamoDB table.
//!
//! The [`Table`] handle formats outbound records, deserializes inbound items,
//! and wraps put, scan, query-by-index, count, truncate, and bulk upload
//! calls. Storage backends live in [`storage`]; the pure logic lives in
//! `cbdynamo_core`.

pub mod cli;
pub mod config;
pub mod logging;
pub mod output;
pub mod storage;
pub mod table;

pub use cbdynamo_core::{Attribute, RawItem, Record, Result, TableError};
pub use config::{Config, ConfigError, Secrets};
pub use table::{ItemKey, PostOptions, Table};
