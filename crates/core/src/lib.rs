//! cbdynamo_core - pure building blocks for the cbdynamo table wrapper.
//!
//! Nothing in this crate performs I/O. The `storage` module defines the
//! [`storage::TableStore`] seam that backends in the `cbdynamo` crate implement.

pub mod batch;
pub mod column;
pub mod error;
pub mod expression;
pub mod index;
pub mod record;
pub mod schema;
pub mod storage;
pub mod upload;

pub use error::{Result, TableError};
pub use record::{Attribute, RawItem, Record};
