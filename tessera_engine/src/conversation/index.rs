//! Addresses of entries inside a conversation tree.
//!
//! An index is written `1.4.1`: the first group always names the conversation's
//! single entry point, and every following group picks a child (1-based) one
//! level deeper. Indices never change once built; walking a tree produces new
//! ones with [`EntryIndex::copy_and_add_tail`] and
//! [`EntryIndex::copy_and_increment_tail`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

const GROUP_DELIMITER: char = '.';

/// Largest value a single group may hold, so one address can never ask for more
/// than this many siblings at any level.
pub const MAX_GROUP_VALUE: u32 = 255;

static INDEX_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1(\.[1-9]\d*)*$").expect("entry index pattern is a valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("'{0}' is not a valid conversation entry index")]
    InvalidFormat(String),
    #[error("group {group} is out of range for index {index} ({count} groups)")]
    OutOfRange { index: String, group: usize, count: usize },
    #[error("an entry index needs at least one group, all of them non-zero")]
    EmptyGroups,
}

/// Immutable, dot-delimited address of one conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryIndex {
    groups: Vec<u32>,
}

impl EntryIndex {
    /// The conversation's entry point, `1`.
    pub fn root() -> Self {
        Self { groups: vec![1] }
    }

    /// Parse the strict `1(.n)*` form.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidFormat`] if the string does not match, including
    /// zero or zero-padded groups and groups above [`MAX_GROUP_VALUE`].
    pub fn parse(index: &str) -> Result<Self, IndexError> {
        let invalid = || IndexError::InvalidFormat(index.to_string());
        if !Self::is_valid_str(index) {
            return Err(invalid());
        }
        let groups = index
            .split(GROUP_DELIMITER)
            .map(str::parse::<u32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;
        if groups.iter().any(|&value| value > MAX_GROUP_VALUE) {
            return Err(invalid());
        }
        Ok(Self { groups })
    }

    /// Build an index from already-split 1-based group values.
    ///
    /// # Errors
    /// Returns [`IndexError::EmptyGroups`] if `groups` is empty or holds a zero, and
    /// [`IndexError::InvalidFormat`] if the first group is not the entry point `1` or a
    /// group is above [`MAX_GROUP_VALUE`].
    pub fn from_groups(groups: Vec<u32>) -> Result<Self, IndexError> {
        if groups.is_empty() || groups.contains(&0) {
            return Err(IndexError::EmptyGroups);
        }
        let index = Self { groups };
        if index.groups[0] != 1 || index.groups.iter().any(|&value| value > MAX_GROUP_VALUE) {
            return Err(IndexError::InvalidFormat(index.to_string()));
        }
        Ok(index)
    }

    pub fn is_valid_str(index: &str) -> bool {
        INDEX_FORMAT.is_match(index)
    }

    pub fn groups(&self) -> &[u32] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// The stored 1-based value of a group, as written in the string form.
    ///
    /// # Errors
    /// Returns [`IndexError::OutOfRange`] if `group >= group_count()`.
    pub fn group_value(&self, group: usize) -> Result<u32, IndexError> {
        self.groups.get(group).copied().ok_or_else(|| IndexError::OutOfRange {
            index: self.to_string(),
            group,
            count: self.groups.len(),
        })
    }

    /// The 0-based child position a group selects inside its parent entry.
    ///
    /// # Errors
    /// Returns [`IndexError::OutOfRange`] if `group >= group_count()`.
    pub fn child_position(&self, group: usize) -> Result<usize, IndexError> {
        self.group_value(group).map(|value| value as usize - 1)
    }

    pub fn is_root(&self) -> bool {
        self.groups.len() == 1
    }

    /// New index one level deeper, addressing the first child.
    #[must_use]
    pub fn copy_and_add_tail(&self) -> Self {
        let mut groups = self.groups.clone();
        groups.push(1);
        Self { groups }
    }

    /// New index addressing the next sibling.
    ///
    /// The tail may step one past [`MAX_GROUP_VALUE`]; such an index still walks a
    /// tree but does not survive a save and reload.
    #[must_use]
    pub fn copy_and_increment_tail(&self) -> Self {
        let mut groups = self.groups.clone();
        if let Some(last) = groups.last_mut() {
            *last = last.saturating_add(1);
        }
        Self { groups }
    }
}

impl Default for EntryIndex {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for EntryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .groups
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{joined}")
    }
}

impl FromStr for EntryIndex {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for EntryIndex {
    type Error = IndexError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
