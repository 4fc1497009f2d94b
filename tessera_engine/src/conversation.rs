//! Branching dialogue trees.
//!
//! A [`Conversation`] owns an internal root node whose first child is the
//! conversation's entry point, addressed by the index `1`. That first entry always
//! exists: a fresh conversation starts with an empty placeholder, and deleting the
//! entry point puts a new placeholder back.
//!
//! Entries are addressed with [`EntryIndex`] values. Writing to an address that is
//! deeper or wider than the current tree pads every missing node along the way
//! with empty placeholders.

pub mod entry;
pub mod index;

use tessera_data::{Record, RecordWriter};
use thiserror::Error;

use crate::persist::{PersistError, Persistable};

pub use entry::{ConversationEntry, EntryError, EntryKind, EntryType, INITIATING_THING_ID, TextEntry};
pub use index::{EntryIndex, IndexError};

const KEY_ENTRY: &str = "entry";
const KEY_ENTRY_ID: &str = "id";
const KEY_ENTRY_LEGACY: &str = "conversation";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("no conversation entry at {index} (missing at group {group})")]
    IndexOutOfRange { index: String, group: usize },
    #[error("walk to depth {depth} exceeds the {count} groups of index {index}")]
    InvalidAddress { index: String, depth: usize, count: usize },
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// A dialogue tree with a guaranteed entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    root: ConversationEntry,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        let mut conversation = Self {
            root: ConversationEntry::none(),
        };
        conversation.ensure_first_entry();
        conversation
    }

    /// The entry point of the conversation, index `1`.
    pub fn first_entry(&self) -> &ConversationEntry {
        // the root always holds a first entry
        &self.root.children[0]
    }

    pub fn first_entry_mut(&mut self) -> &mut ConversationEntry {
        &mut self.root.children[0]
    }

    pub fn has_entry(&self, index: &EntryIndex) -> bool {
        self.entry(index).is_ok()
    }

    /// # Errors
    /// Returns [`ConversationError::IndexOutOfRange`] if any step of the address is missing.
    pub fn entry(&self, index: &EntryIndex) -> Result<&ConversationEntry, ConversationError> {
        self.walk(index, index.group_count())
    }

    /// # Errors
    /// Returns [`ConversationError::IndexOutOfRange`] if any step of the address is missing.
    pub fn entry_mut(&mut self, index: &EntryIndex) -> Result<&mut ConversationEntry, ConversationError> {
        self.walk_mut(index, index.group_count())
    }

    /// Insert `entry` at `index`, creating any missing parents. See
    /// [`ConversationEntry::insert_child`] for how siblings move.
    ///
    /// # Errors
    /// Only fails if the index cannot be walked, which a parsed index always can.
    pub fn insert_entry(&mut self, index: &EntryIndex, entry: ConversationEntry) -> Result<(), ConversationError> {
        let (parent, position) = self.parent_or_add(index)?;
        parent.insert_child(position, entry, &ConversationEntry::none());
        Ok(())
    }

    /// Replace the entry at `index` with `entry`, which takes over the old entry's children.
    /// Missing parents are created.
    ///
    /// # Errors
    /// Only fails if the index cannot be walked, which a parsed index always can.
    pub fn set_entry(&mut self, index: &EntryIndex, entry: ConversationEntry) -> Result<(), ConversationError> {
        let (parent, position) = self.parent_or_add(index)?;
        parent.set_child(position, entry, &ConversationEntry::none());
        Ok(())
    }

    /// Delete the entry at `index` together with everything below it.
    ///
    /// Returns the removed subtree, or `None` if nothing lives at `index`.
    pub fn delete_entry(&mut self, index: &EntryIndex) -> Option<ConversationEntry> {
        if !self.has_entry(index) {
            return None;
        }
        let last = index.group_count() - 1;
        let position = index.child_position(last).ok()?;
        let removed = self.walk_mut(index, last).ok()?.delete_child(position);
        if index.is_root() {
            self.ensure_first_entry();
        }
        removed
    }

    /// Every entry in save order (pre-order) with its address, placeholders included.
    pub fn entries(&self) -> Vec<(EntryIndex, &ConversationEntry)> {
        let mut out = Vec::new();
        collect_entries(EntryIndex::root(), self.first_entry(), &mut out);
        out
    }

    /// Load one record addressed to this conversation.
    ///
    /// The entry address comes from an `entry[id=...]` element at `index`, or from a
    /// legacy `conversation[id=...]` element one level up. Records with neither are
    /// ignored. The addressed entry is turned into a text entry if it is not one
    /// already; its children are kept. A record whose field fails to load leaves the
    /// tree untouched.
    ///
    /// # Errors
    /// Returns [`PersistError::Index`] for a malformed address, or whatever the entry's
    /// field loading reports.
    pub fn load(&mut self, record: &Record, index: usize) -> Result<(), PersistError> {
        let legacy = index.checked_sub(1);
        let data_index = if record.element(index) == KEY_ENTRY && record.key(index) == KEY_ENTRY_ID {
            index
        } else if let Some(legacy) = legacy
            && record.element(legacy) == KEY_ENTRY_LEGACY
            && record.key(legacy) == KEY_ENTRY_ID
        {
            legacy
        } else {
            return Ok(());
        };

        let entry_id = EntryIndex::parse(record.key_value(data_index))?;
        if let Ok(existing) = self.entry_mut(&entry_id)
            && existing.entry_type().is_text()
        {
            return existing.load(record, data_index + 1);
        }
        // the tree is only touched once the field has loaded
        let mut staged = ConversationEntry::from(TextEntry::default());
        staged.load(record, data_index + 1)?;
        self.set_entry(&entry_id, staged)?;
        Ok(())
    }

    /// Write every text entry as an `entry[id=...]` element, parents before children.
    ///
    /// # Errors
    /// Returns a [`PersistError`] if an entry's nested event cannot be written.
    pub fn save(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        save_entry(writer, &EntryIndex::root(), self.first_entry())
    }

    fn ensure_first_entry(&mut self) {
        if self.root.child_count() == 0 {
            self.root.set_child(0, ConversationEntry::none(), &ConversationEntry::none());
        }
    }

    fn check_depth(index: &EntryIndex, depth: usize) -> Result<(), ConversationError> {
        if depth > index.group_count() {
            return Err(ConversationError::InvalidAddress {
                index: index.to_string(),
                depth,
                count: index.group_count(),
            });
        }
        Ok(())
    }

    fn walk(&self, index: &EntryIndex, depth: usize) -> Result<&ConversationEntry, ConversationError> {
        Self::check_depth(index, depth)?;
        let mut current = &self.root;
        for group in 0..depth {
            let position = index.child_position(group)?;
            current = current.child(position).map_err(|_| ConversationError::IndexOutOfRange {
                index: index.to_string(),
                group,
            })?;
        }
        Ok(current)
    }

    fn walk_mut(&mut self, index: &EntryIndex, depth: usize) -> Result<&mut ConversationEntry, ConversationError> {
        Self::check_depth(index, depth)?;
        let mut current = &mut self.root;
        for group in 0..depth {
            let position = index.child_position(group)?;
            current = current.child_mut(position).map_err(|_| ConversationError::IndexOutOfRange {
                index: index.to_string(),
                group,
            })?;
        }
        Ok(current)
    }

    /// Walk to the parent of `index`, creating placeholders for missing nodes, and
    /// return it with the child position `index` names inside it.
    fn parent_or_add(&mut self, index: &EntryIndex) -> Result<(&mut ConversationEntry, usize), ConversationError> {
        let last = index.group_count() - 1;
        Self::check_depth(index, last)?;
        let filler = ConversationEntry::none();
        let mut current = &mut self.root;
        for group in 0..last {
            let position = index.child_position(group)?;
            if position >= current.child_count() {
                current.set_child(position, ConversationEntry::none(), &filler);
            }
            current = &mut current.children[position];
        }
        Ok((current, index.child_position(last)?))
    }
}

fn collect_entries<'a>(index: EntryIndex, entry: &'a ConversationEntry, out: &mut Vec<(EntryIndex, &'a ConversationEntry)>) {
    let mut child_index = index.copy_and_add_tail();
    out.push((index, entry));
    for child in entry.children() {
        let next = child_index.copy_and_increment_tail();
        collect_entries(child_index, child, out);
        child_index = next;
    }
}

fn save_entry(writer: &mut dyn RecordWriter, index: &EntryIndex, entry: &ConversationEntry) -> Result<(), PersistError> {
    if entry.is_saveable() {
        writer.write_keyed_element(KEY_ENTRY, KEY_ENTRY_ID, &index.to_string());
        let result = entry.save(writer);
        writer.jump_to_parent();
        result?;
    }
    let mut child_index = index.copy_and_add_tail();
    for child in entry.children() {
        save_entry(writer, &child_index, child)?;
        child_index = child_index.copy_and_increment_tail();
    }
    Ok(())
}
