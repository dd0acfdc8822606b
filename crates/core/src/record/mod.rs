//! Record formatting and attribute conversion.
//!
//! A [`Record`] is what callers hand in and get back: a flat JSON object.
//! A [`RawItem`] is what the store reads and writes. The functions here move
//! between the two without touching the network.

mod convert;
mod format;
mod types;

pub use convert::{
    attribute_to_value, record_to_item, unformat_item, unformat_items, value_to_attribute,
};
pub use format::{
    coerce_value, current_timestamp, format_message, format_message_with_id, MESSAGE_ID_ATTR,
    TIMESTAMP_ATTR,
};
pub use types::{Action, Attribute, FormattedMessage, RawItem, Record};
