//! Flattened record model for hierarchical key/value save data.
//!
//! A save document is a list of [`Record`]s. Each record carries the full
//! element path from the document root down to a single leaf value, plus an
//! optional key/value attribute pair on every element of that path. This is
//! the form readers hand to loaders: one record per leaf, consumed in order.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of the value held by a record leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    None,
    Boolean,
    Integer,
    Float,
    String,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::None => write!(f, "none"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Integer => write!(f, "integer"),
            DataType::Float => write!(f, "float"),
            DataType::String => write!(f, "string"),
        }
    }
}

/// A leaf value stored at the end of a record path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum DataValue {
    #[default]
    Unset,
    Boolean(bool),
    Integer(i64),
    Float(f32),
    String(String),
}

impl DataValue {
    pub fn data_type(&self) -> DataType {
        match self {
            DataValue::Unset => DataType::None,
            DataValue::Boolean(_) => DataType::Boolean,
            DataValue::Integer(_) => DataType::Integer,
            DataValue::Float(_) => DataType::Float,
            DataValue::String(_) => DataType::String,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, DataValue::Unset)
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Unset => Ok(()),
            DataValue::Boolean(b) => write!(f, "{b}"),
            DataValue::Integer(i) => write!(f, "{i}"),
            DataValue::Float(x) => write!(f, "{x}"),
            DataValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

macro_rules! integer_data_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DataValue {
                fn from(value: $ty) -> Self {
                    DataValue::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_data_value!(u8, u16, u32, i8, i16, i32, i64);

impl From<f32> for DataValue {
    fn from(value: f32) -> Self {
        DataValue::Float(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

/// Failures when reading a typed value out of a record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("expected {expected} data, found {found}")]
    TypeMismatch { expected: DataType, found: DataType },
    #[error("could not parse '{raw}' as {expected}")]
    Unparseable { expected: DataType, raw: String },
}

/// One element on a record path, with an optional attribute pair.
///
/// An empty `key` means the element carries no attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: String::new(),
            value: String::new(),
        }
    }

    pub fn keyed(name: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}[{}={}]", self.name, self.key, self.value)
        }
    }
}

/// A single leaf of save data together with the element branch that wraps it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    pub elements: Vec<Element>,
    #[serde(default)]
    pub data: DataValue,
}

impl Record {
    /// Build a record from an element path and a leaf value.
    pub fn new(elements: Vec<Element>, data: impl Into<DataValue>) -> Self {
        Self {
            elements,
            data: data.into(),
        }
    }

    /// Element name at `index`, or `""` if the path is not that deep.
    pub fn element(&self, index: usize) -> &str {
        self.elements.get(index).map_or("", |e| e.name.as_str())
    }

    /// Attribute key at `index`, or `""` if absent.
    pub fn key(&self, index: usize) -> &str {
        self.elements.get(index).map_or("", |e| e.key.as_str())
    }

    /// Attribute value at `index`, or `""` if absent.
    pub fn key_value(&self, index: usize) -> &str {
        self.elements.get(index).map_or("", |e| e.value.as_str())
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn last_element(&self) -> &str {
        self.elements.last().map_or("", |e| e.name.as_str())
    }

    pub fn push_element_back(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn push_element_front(&mut self, element: Element) {
        self.elements.insert(0, element);
    }

    /// Pops the innermost element. Data is cleared along with it since it belonged to that leaf.
    pub fn remove_last_element(&mut self) {
        if self.elements.pop().is_some() {
            self.data = DataValue::Unset;
        }
    }

    pub fn set_data(&mut self, data: impl Into<DataValue>) {
        self.data = data.into();
    }

    /// Parse `raw` as the declared `data_type` and store it.
    ///
    /// # Errors
    /// Returns [`DataError::Unparseable`] if `raw` does not parse as the declared type,
    /// or if the declared type is [`DataType::None`].
    pub fn set_data_from_str(&mut self, data_type: DataType, raw: &str) -> Result<(), DataError> {
        let unparseable = || DataError::Unparseable {
            expected: data_type,
            raw: raw.to_string(),
        };
        self.data = match data_type {
            DataType::Boolean => DataValue::Boolean(raw.trim() == "true"),
            DataType::Integer => DataValue::Integer(raw.trim().parse().map_err(|_| unparseable())?),
            DataType::Float => DataValue::Float(raw.trim().parse().map_err(|_| unparseable())?),
            DataType::String => DataValue::String(raw.to_string()),
            DataType::None => return Err(unparseable()),
        };
        Ok(())
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// # Errors
    /// Returns [`DataError::TypeMismatch`] if the leaf is not a boolean.
    pub fn data_bool(&self) -> Result<bool, DataError> {
        match self.data {
            DataValue::Boolean(b) => Ok(b),
            _ => Err(self.mismatch(DataType::Boolean)),
        }
    }

    /// # Errors
    /// Returns [`DataError::TypeMismatch`] if the leaf is not an integer.
    pub fn data_int(&self) -> Result<i64, DataError> {
        match self.data {
            DataValue::Integer(i) => Ok(i),
            _ => Err(self.mismatch(DataType::Integer)),
        }
    }

    /// # Errors
    /// Returns [`DataError::TypeMismatch`] if the leaf is not a float.
    pub fn data_float(&self) -> Result<f32, DataError> {
        match self.data {
            DataValue::Float(x) => Ok(x),
            _ => Err(self.mismatch(DataType::Float)),
        }
    }

    /// # Errors
    /// Returns [`DataError::TypeMismatch`] if the leaf is not a string.
    pub fn data_string(&self) -> Result<&str, DataError> {
        match &self.data {
            DataValue::String(s) => Ok(s.as_str()),
            _ => Err(self.mismatch(DataType::String)),
        }
    }

    /// Human-readable path, e.g. `entry[id=1.1]/text`.
    pub fn path_string(&self) -> String {
        self.elements
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }

    fn mismatch(&self, expected: DataType) -> DataError {
        DataError::TypeMismatch {
            expected,
            found: self.data_type(),
        }
    }
}
