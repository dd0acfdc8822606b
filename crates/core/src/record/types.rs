use std::collections::HashMap;

use serde_json::{Map, Value};
use uuid::Uuid;

/// A caller-facing record: attribute name to JSON value.
pub type Record = Map<String, Value>;

/// A store-facing item: attribute name to typed attribute.
pub type RawItem = HashMap<String, Attribute>;

/// A typed attribute value as the store represents it.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    S(String),
    N(String),
    B(Vec<u8>),
    Ss(Vec<String>),
    Ns(Vec<String>),
    Bs(Vec<Vec<u8>>),
    M(HashMap<String, Attribute>),
    L(Vec<Attribute>),
    Null,
    Bool(bool),
}

impl Attribute {
    /// Returns the string value if this is an `S` attribute.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Attribute::S(s) => Some(s),
            _ => None,
        }
    }

    /// The store's type descriptor for this attribute.
    pub fn type_name(&self) -> &'static str {
        match self {
            Attribute::S(_) => "S",
            Attribute::N(_) => "N",
            Attribute::B(_) => "B",
            Attribute::Ss(_) => "SS",
            Attribute::Ns(_) => "NS",
            Attribute::Bs(_) => "BS",
            Attribute::M(_) => "M",
            Attribute::L(_) => "L",
            Attribute::Null => "NULL",
            Attribute::Bool(_) => "BOOL",
        }
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::S(value.to_string())
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::S(value)
    }
}

/// What a formatted message is for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Action {
    /// A new message: gets a generated `message_id` and a `timestamp`.
    #[default]
    Put,
    /// Only stamped with a `timestamp`.
    Update,
}

/// A message ready to be written, with the identifier generated for it.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedMessage {
    pub message_id: Uuid,
    pub item: RawItem,
}

impl FormattedMessage {
    /// Consumes the message, returning the raw item.
    pub fn into_item(self) -> RawItem {
        self.item
    }
}

