//! Type-tag dispatch for polymorphic persisted values.
//!
//! A family of persisted values (events, locks) shares one slot type whose
//! concrete kind may change while a record stream is being loaded. Each family
//! registers its kinds once in a [`TypeRegistry`]: the type string written to
//! the save medium, and a factory that builds a fresh value of that kind.
//!
//! [`load`] resolves the type string found at the current record position,
//! swaps the slot for a fresh value when the stored kind disagrees, then lets the
//! value read its own fields. [`save`] wraps the value's fields in an element
//! named after its kind.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tessera_data::{DataError, Record, RecordWriter};
use thiserror::Error;

use crate::conversation::{ConversationError, IndexError};

/// Failures while moving persisted values to or from records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistError {
    /// A kind or type string has no registered mapping. The family's tables and
    /// its kind enum are out of sync.
    #[error("{family} type mapping for '{name}' is not defined")]
    UnmappedType { family: &'static str, name: String },
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("value {value} for '{field}' is out of range")]
    IntegerRange { field: String, value: i64 },
    #[error("'{value}' is not a known value for '{field}'")]
    UnknownValue { field: String, value: String },
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Address(#[from] ConversationError),
}

/// A value that reads and writes its own fields at a record position.
pub trait Persistable {
    type Kind: Copy + Eq + Hash + Debug + 'static;

    fn kind(&self) -> Self::Kind;

    /// Whether the value carries any content worth writing.
    fn is_saveable(&self) -> bool;

    /// Read the field found at `index` of `record`.
    ///
    /// # Errors
    /// Returns a [`PersistError`] if the leaf data is malformed.
    fn load(&mut self, record: &Record, index: usize) -> Result<(), PersistError>;

    /// Write every non-default field under the writer's current element.
    ///
    /// # Errors
    /// Returns a [`PersistError`] if a nested value cannot be written.
    fn save(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError>;
}

/// A persisted value whose concrete kind is chosen by a stored type string.
pub trait PersistFamily: Persistable + Sized + 'static {
    fn registry() -> &'static TypeRegistry<Self>;
}

/// Two-way type string tables plus a factory per kind, built once per family.
pub struct TypeRegistry<T: Persistable> {
    family: &'static str,
    from_name: HashMap<&'static str, T::Kind>,
    to_name: HashMap<T::Kind, &'static str>,
    factories: HashMap<T::Kind, fn() -> T>,
}

impl<T: Persistable> TypeRegistry<T> {
    pub fn new(family: &'static str) -> Self {
        Self {
            family,
            from_name: HashMap::new(),
            to_name: HashMap::new(),
            factories: HashMap::new(),
        }
    }

    /// Map `kind` to `name` in both directions and register its factory.
    #[must_use]
    pub fn with(mut self, kind: T::Kind, name: &'static str, factory: fn() -> T) -> Self {
        self.from_name.insert(name, kind);
        self.to_name.insert(kind, name);
        self.factories.insert(kind, factory);
        self
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    /// # Errors
    /// Returns [`PersistError::UnmappedType`] if `name` is not registered.
    pub fn kind_for(&self, name: &str) -> Result<T::Kind, PersistError> {
        self.from_name.get(name).copied().ok_or_else(|| PersistError::UnmappedType {
            family: self.family,
            name: name.to_string(),
        })
    }

    /// # Errors
    /// Returns [`PersistError::UnmappedType`] if `kind` is not registered.
    pub fn name_for(&self, kind: T::Kind) -> Result<&'static str, PersistError> {
        self.to_name.get(&kind).copied().ok_or_else(|| self.unmapped(kind))
    }

    /// Build a fresh, default value of `kind`.
    ///
    /// # Errors
    /// Returns [`PersistError::UnmappedType`] if `kind` has no factory.
    pub fn create(&self, kind: T::Kind) -> Result<T, PersistError> {
        self.factories.get(&kind).map(|factory| factory()).ok_or_else(|| self.unmapped(kind))
    }

    /// Registered type strings, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.from_name.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn unmapped(&self, kind: T::Kind) -> PersistError {
        PersistError::UnmappedType {
            family: self.family,
            name: format!("{kind:?}"),
        }
    }
}

/// Load the type string at `index` into `slot`, replacing the slot with a fresh value
/// when the stored kind differs, then hand the rest of the record to the value.
///
/// # Errors
/// Returns [`PersistError::UnmappedType`] for an unknown type string, or whatever the
/// value's own field loading reports.
pub fn load<T: PersistFamily>(slot: &mut T, record: &Record, index: usize) -> Result<(), PersistError> {
    let registry = T::registry();
    let kind = registry.kind_for(record.element(index))?;
    if slot.kind() != kind {
        *slot = registry.create(kind)?;
    }
    slot.load(record, index + 1)
}

/// Write `value` wrapped in an element named after its kind. Values without content are
/// skipped unless `save_if_empty` is set.
///
/// # Errors
/// Returns [`PersistError::UnmappedType`] if the kind has no type string, or whatever the
/// value's own field saving reports.
pub fn save<T: PersistFamily>(value: &T, writer: &mut dyn RecordWriter, save_if_empty: bool) -> Result<(), PersistError> {
    if !value.is_saveable() && !save_if_empty {
        return Ok(());
    }
    let name = T::registry().name_for(value.kind())?;
    writer.write_element(name);
    let result = value.save(writer);
    writer.jump_to_parent();
    result
}

/// Read the record's integer leaf into a narrower integer field.
///
/// # Errors
/// Returns [`PersistError::Data`] for a non-integer leaf, or
/// [`PersistError::IntegerRange`] if the value does not fit.
pub fn read_int<N: TryFrom<i64>>(record: &Record, field: &str) -> Result<N, PersistError> {
    let raw = record.data_int()?;
    N::try_from(raw).map_err(|_| PersistError::IntegerRange {
        field: field.to_string(),
        value: raw,
    })
}
