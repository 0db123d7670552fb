//! The flat attribute model of the `rke_cluster` resource.
//!
//! Attributes are owned by the declarative tool's runtime, which is only reachable through the
//! [`ResourceData`] trait. Nested sections are represented the way the tool's schema represents
//! them: as lists holding a single map, see [`Block`].
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use snafu::{Snafu, ensure};
use strum::Display;

mod block;
mod schema;

pub use block::{Block, BlockBuilder};
pub use schema::Schema;

/// The error type for reading and writing attributes.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum AttributeError {
    #[snafu(display("attribute {name:?} is not part of the schema"))]
    UnknownAttribute { name: String },

    #[snafu(display("attribute {name:?} holds a {found} value, expected {expected}"))]
    AttributeType {
        name: String,
        expected: AttributeKind,
        found: AttributeKind,
    },

    #[snafu(display("required attribute {name:?} is missing"))]
    MissingAttribute { name: String },
}

/// The kind of value an attribute holds.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum AttributeKind {
    Bool,
    Int,
    String,
    List,
    Map,
}

/// A single attribute value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<AttributeValue>),
    Map(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Bool(_) => AttributeKind::Bool,
            Self::Int(_) => AttributeKind::Int,
            Self::String(_) => AttributeKind::String,
            Self::List(_) => AttributeKind::List,
            Self::Map(_) => AttributeKind::Map,
        }
    }

    /// Whether the value is an empty string, list or map. Scalars are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(value) => value.is_empty(),
            Self::List(values) => values.is_empty(),
            Self::Map(values) => values.is_empty(),
            Self::Bool(_) | Self::Int(_) => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, AttributeValue>> {
        match self {
            Self::Map(values) => Some(values),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(values: Vec<AttributeValue>) -> Self {
        Self::List(values)
    }
}

impl From<BTreeMap<String, AttributeValue>> for AttributeValue {
    fn from(values: BTreeMap<String, AttributeValue>) -> Self {
        Self::Map(values)
    }
}

/// Access to the attributes of one resource, as provided by the declarative tool's runtime.
pub trait ResourceData {
    /// Returns the current value of the attribute `name`, if it has one.
    fn get(&self, name: &str) -> Option<&AttributeValue>;

    /// Replaces the value of the attribute `name`.
    fn set(&mut self, name: &str, value: AttributeValue) -> Result<(), AttributeError>;

    /// Returns the attribute `name` if it holds a boolean. Other kinds read as absent.
    fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(AttributeValue::as_bool)
    }

    /// Returns the attribute `name` if it holds an integer. Other kinds read as absent.
    fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttributeValue::as_int)
    }

    /// Returns the attribute `name` if it holds a non-empty string.
    fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(AttributeValue::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns the first block of the attribute `name` if it holds a non-empty list of maps.
    fn get_block(&self, name: &str) -> Option<Block<'_>> {
        self.get(name).and_then(Block::first)
    }

    /// Returns all blocks of the attribute `name`, skipping entries which are not maps.
    fn get_blocks(&self, name: &str) -> Vec<Block<'_>> {
        self.get(name).map(Block::all).unwrap_or_default()
    }

    /// Whether the attribute `name` currently holds a non-empty value.
    fn is_tracked(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_empty())
    }
}

/// An in-memory attribute store.
///
/// If a [`Schema`] is attached, every write is checked against it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    values: BTreeMap<String, AttributeValue>,
    schema: Option<Schema>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: Schema) -> Self {
        Self {
            values: BTreeMap::new(),
            schema: Some(schema),
        }
    }

    /// Inserts a value without consulting the schema, like state loaded by the runtime.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn values(&self) -> &BTreeMap<String, AttributeValue> {
        &self.values
    }

    pub fn into_values(self) -> BTreeMap<String, AttributeValue> {
        self.values
    }
}

impl From<BTreeMap<String, AttributeValue>> for Attributes {
    fn from(values: BTreeMap<String, AttributeValue>) -> Self {
        Self {
            values,
            schema: None,
        }
    }
}

impl ResourceData for Attributes {
    fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    fn set(&mut self, name: &str, value: AttributeValue) -> Result<(), AttributeError> {
        if let Some(schema) = &self.schema {
            let expected = schema
                .kind_of(name)
                .ok_or_else(|| UnknownAttributeSnafu { name }.build())?;
            ensure!(
                value.kind() == expected,
                AttributeTypeSnafu {
                    name,
                    expected,
                    found: value.kind(),
                }
            );
        }

        self.values.insert(name.to_owned(), value);
        Ok(())
    }
}
