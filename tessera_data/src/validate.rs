use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Structural problem found in a record stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyPath { record: usize },
    EmptyElement { record: usize, position: usize },
    MissingData { record: usize, path: String },
    DuplicatePath { record: usize, path: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyPath { record } => {
                write!(f, "record #{record} has no elements")
            },
            ValidationError::EmptyElement { record, position } => {
                write!(f, "record #{record} has an unnamed element at depth {position}")
            },
            ValidationError::MissingData { record, path } => {
                write!(f, "record #{record} ({path}) has no leaf data")
            },
            ValidationError::DuplicatePath { record, path } => {
                write!(f, "record #{record} repeats leaf '{path}' and overrides the earlier value")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a record stream for structural problems a loader would silently tolerate.
///
/// ```
/// use tessera_data::{Element, Record, validate_records};
///
/// let records = vec![
///     Record::new(vec![Element::keyed("entry", "id", "1"), Element::new("text")], "Hi"),
///     Record::new(vec![Element::keyed("entry", "id", "1.1"), Element::new("text")], "Bye"),
/// ];
/// assert!(validate_records(&records).is_empty());
/// ```
pub fn validate_records(records: &[Record]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, record) in records.iter().enumerate() {
        if record.elements.is_empty() {
            errors.push(ValidationError::EmptyPath { record: i });
            continue;
        }
        for (position, element) in record.elements.iter().enumerate() {
            if element.name.trim().is_empty() {
                errors.push(ValidationError::EmptyElement { record: i, position });
            }
        }
        let path = record.path_string();
        if record.data.is_unset() {
            errors.push(ValidationError::MissingData {
                record: i,
                path: path.clone(),
            });
        }
        track_path(i, path, &mut seen, &mut errors);
    }

    errors
}

fn track_path(record: usize, path: String, seen: &mut HashSet<String>, errors: &mut Vec<ValidationError>) {
    if !seen.insert(path.clone()) {
        errors.push(ValidationError::DuplicatePath { record, path });
    }
}
