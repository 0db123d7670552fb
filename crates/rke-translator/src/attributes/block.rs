use std::collections::BTreeMap;

use super::{AttributeError, AttributeKind, AttributeValue};

/// Read access to a nested block: one map inside a list attribute.
///
/// Every accessor treats values of an unexpected kind as absent.
#[derive(Clone, Copy, Debug)]
pub struct Block<'a> {
    fields: &'a BTreeMap<String, AttributeValue>,
}

impl<'a> Block<'a> {
    /// The first block of a list attribute, if the list is non-empty and starts with a map.
    pub fn first(value: &'a AttributeValue) -> Option<Self> {
        value
            .as_list()?
            .first()?
            .as_map()
            .map(|fields| Self { fields })
    }

    /// All maps of a list attribute.
    pub fn all(value: &'a AttributeValue) -> Vec<Self> {
        value
            .as_list()
            .unwrap_or_default()
            .iter()
            .filter_map(AttributeValue::as_map)
            .map(|fields| Self { fields })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&'a AttributeValue> {
        self.fields.get(key)
    }

    /// All fields of the block, ordered by key.
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a AttributeValue)> + use<'a> {
        let fields = self.fields;
        fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// A non-empty string field.
    pub fn string(&self, key: &str) -> Option<&'a str> {
        self.get(key)
            .and_then(AttributeValue::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AttributeValue::as_bool)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttributeValue::as_int)
    }

    /// The string entries of a list field.
    pub fn strings(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(AttributeValue::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(AttributeValue::as_str)
            .map(ToOwned::to_owned)
            .collect()
    }

    /// The string entries of a map field.
    pub fn string_map(&self, key: &str) -> BTreeMap<String, String> {
        self.get(key)
            .and_then(AttributeValue::as_map)
            .into_iter()
            .flatten()
            .filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_owned())))
            .collect()
    }

    pub fn block(&self, key: &str) -> Option<Block<'a>> {
        self.get(key).and_then(Block::first)
    }

    pub fn blocks(&self, key: &str) -> Vec<Block<'a>> {
        self.get(key).map(Block::all).unwrap_or_default()
    }

    /// A string field which has to be present.
    pub fn require_str(&self, key: &str) -> Result<&'a str, AttributeError> {
        match self.get(key) {
            None => Err(AttributeError::MissingAttribute {
                name: key.to_owned(),
            }),
            Some(AttributeValue::String(value)) => Ok(value),
            Some(other) => Err(AttributeError::AttributeType {
                name: key.to_owned(),
                expected: AttributeKind::String,
                found: other.kind(),
            }),
        }
    }

    /// A list field which has to be present. Entries which are not strings are skipped.
    pub fn require_strings(&self, key: &str) -> Result<Vec<String>, AttributeError> {
        match self.get(key) {
            None => Err(AttributeError::MissingAttribute {
                name: key.to_owned(),
            }),
            Some(AttributeValue::List(_)) => Ok(self.strings(key)),
            Some(other) => Err(AttributeError::AttributeType {
                name: key.to_owned(),
                expected: AttributeKind::List,
                found: other.kind(),
            }),
        }
    }
}

/// Builds the value of a nested block. Zero values are left out.
#[derive(Debug, Default)]
pub struct BlockBuilder {
    fields: BTreeMap<String, AttributeValue>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, key: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.fields.insert(key.to_owned(), value.into());
        }
        self
    }

    pub fn bool(mut self, key: &str, value: bool) -> Self {
        if value {
            self.fields.insert(key.to_owned(), value.into());
        }
        self
    }

    pub fn optional_bool(mut self, key: &str, value: Option<bool>) -> Self {
        if let Some(value) = value {
            self.fields.insert(key.to_owned(), value.into());
        }
        self
    }

    pub fn int(mut self, key: &str, value: i64) -> Self {
        if value != 0 {
            self.fields.insert(key.to_owned(), value.into());
        }
        self
    }

    pub fn strings(mut self, key: &str, values: &[String]) -> Self {
        if !values.is_empty() {
            let values = values.iter().map(|value| value.as_str().into()).collect();
            self.fields
                .insert(key.to_owned(), AttributeValue::List(values));
        }
        self
    }

    pub fn string_map(mut self, key: &str, values: &BTreeMap<String, String>) -> Self {
        if !values.is_empty() {
            let values = values
                .iter()
                .map(|(key, value)| (key.clone(), value.as_str().into()))
                .collect();
            self.fields.insert(key.to_owned(), AttributeValue::Map(values));
        }
        self
    }

    /// Inserts an already built value, usually a nested block.
    pub fn value(mut self, key: &str, value: Option<AttributeValue>) -> Self {
        if let Some(value) = value {
            self.fields.insert(key.to_owned(), value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The fields as a plain map, for list entries which are not singleton blocks.
    pub fn into_map(self) -> AttributeValue {
        AttributeValue::Map(self.fields)
    }

    /// The fields wrapped into a singleton list.
    pub fn build(self) -> AttributeValue {
        AttributeValue::List(vec![self.into_map()])
    }

    /// Like [`Self::build`], but returns [`None`] if no field was set.
    pub fn build_non_empty(self) -> Option<AttributeValue> {
        (!self.is_empty()).then(|| self.build())
    }
}
