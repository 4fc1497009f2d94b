//! Nodes of a conversation tree.
//!
//! Every node owns its children outright; dropping a node drops its subtree and
//! cloning it copies the subtree. The first child of a node is its default
//! continuation, any further children are branching options.

use std::mem;

use tessera_data::{Record, RecordWriter};
use thiserror::Error;
use variantly::Variantly;

use crate::event::{Event, save_nested};
use crate::persist::{self, PersistError, Persistable, read_int};

const KEY_DELAY: &str = "delay";
const KEY_EVENT: &str = "event";
const KEY_MESSAGE: &str = "text";
const KEY_THING_ID: &str = "id";

/// Speaker id meaning "whoever started the conversation".
pub const INITIATING_THING_ID: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("conversation entry child {position} is out of range ({count} children)")]
    OutOfRange { position: usize, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Variantly)]
pub enum EntryType {
    None,
    Text,
}

/// A line of dialogue, optionally firing an event when shown.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    pub message: String,
    /// Minimum time the text stays up before the player can skip it.
    pub delay_ms: u32,
    /// Thing presenting the text, or [`INITIATING_THING_ID`].
    pub speaker_id: i32,
    pub event: Event,
}

impl Default for TextEntry {
    fn default() -> Self {
        Self {
            message: String::new(),
            delay_ms: 0,
            speaker_id: INITIATING_THING_ID,
            event: Event::default(),
        }
    }
}

impl TextEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    fn load_field(&mut self, record: &Record, index: usize) -> Result<(), PersistError> {
        match record.element(index) {
            KEY_DELAY => self.delay_ms = read_int(record, KEY_DELAY)?,
            KEY_EVENT => persist::load(&mut self.event, record, index + 1)?,
            KEY_MESSAGE => self.message = record.data_string()?.to_string(),
            KEY_THING_ID => self.speaker_id = read_int(record, KEY_THING_ID)?,
            _ => {},
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_MESSAGE, self.message.as_str().into());
        if self.speaker_id != INITIATING_THING_ID {
            writer.write_data(KEY_THING_ID, self.speaker_id.into());
        }
        if self.delay_ms > 0 {
            writer.write_data(KEY_DELAY, self.delay_ms.into());
        }
        save_nested(KEY_EVENT, &self.event, writer)
    }
}

/// Content carried by a conversation node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EntryKind {
    /// Structural placeholder: fills gaps and ends branches. Never saved.
    #[default]
    None,
    Text(TextEntry),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationEntry {
    pub kind: EntryKind,
    pub(super) children: Vec<ConversationEntry>,
}

impl From<TextEntry> for ConversationEntry {
    fn from(text: TextEntry) -> Self {
        Self::new(EntryKind::Text(text))
    }
}

impl ConversationEntry {
    pub fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn text(message: impl Into<String>) -> Self {
        TextEntry::new(message).into()
    }

    pub fn entry_type(&self) -> EntryType {
        match self.kind {
            EntryKind::None => EntryType::None,
            EntryKind::Text(_) => EntryType::Text,
        }
    }

    pub fn as_text(&self) -> Option<&TextEntry> {
        match &self.kind {
            EntryKind::Text(text) => Some(text),
            EntryKind::None => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextEntry> {
        match &mut self.kind {
            EntryKind::Text(text) => Some(text),
            EntryKind::None => None,
        }
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> &[ConversationEntry] {
        &self.children
    }

    /// # Errors
    /// Returns [`EntryError::OutOfRange`] if `position >= child_count()`.
    pub fn child(&self, position: usize) -> Result<&ConversationEntry, EntryError> {
        let count = self.children.len();
        self.children.get(position).ok_or(EntryError::OutOfRange { position, count })
    }

    /// # Errors
    /// Returns [`EntryError::OutOfRange`] if `position >= child_count()`.
    pub fn child_mut(&mut self, position: usize) -> Result<&mut ConversationEntry, EntryError> {
        let count = self.children.len();
        self.children.get_mut(position).ok_or(EntryError::OutOfRange { position, count })
    }

    /// Put `entry` at `position`, padding any gap with copies of `filler`.
    ///
    /// Replacing an existing child hands that child's subtree to `entry`; the
    /// replaced node itself is dropped.
    pub fn set_child(&mut self, position: usize, mut entry: ConversationEntry, filler: &ConversationEntry) {
        self.pad_children(position, filler);
        if let Some(slot) = self.children.get_mut(position) {
            entry.children = mem::take(&mut slot.children);
            *slot = entry;
        } else {
            self.children.push(entry);
        }
    }

    /// Insert `entry` at `position`, shifting later children right and padding any gap
    /// with copies of `filler`.
    ///
    /// Inserting in front of a lone child nests instead of branching: `entry` becomes
    /// the only child and the previous one becomes `entry`'s first child, so a linear
    /// run of text stays linear.
    pub fn insert_child(&mut self, position: usize, mut entry: ConversationEntry, filler: &ConversationEntry) {
        if position == 0 && self.children.len() == 1 {
            let previous = self.children.remove(0);
            entry.children.insert(0, previous);
            self.children.push(entry);
            return;
        }
        self.pad_children(position, filler);
        self.children.insert(position, entry);
    }

    /// Remove the child at `position` along with its subtree. Out of range is a no-op.
    pub fn delete_child(&mut self, position: usize) -> Option<ConversationEntry> {
        (position < self.children.len()).then(|| self.children.remove(position))
    }

    fn pad_children(&mut self, len: usize, filler: &ConversationEntry) {
        while self.children.len() < len {
            self.children.push(filler.clone());
        }
    }
}

impl Persistable for ConversationEntry {
    type Kind = EntryType;

    fn kind(&self) -> EntryType {
        self.entry_type()
    }

    fn is_saveable(&self) -> bool {
        self.entry_type().is_text()
    }

    fn load(&mut self, record: &Record, index: usize) -> Result<(), PersistError> {
        match &mut self.kind {
            EntryKind::None => Ok(()),
            EntryKind::Text(text) => text.load_field(record, index),
        }
    }

    fn save(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        match &self.kind {
            EntryKind::None => Ok(()),
            EntryKind::Text(text) => text.save_fields(writer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, EventType, MapSwitch};
    use tessera_data::{DataValue, Element, MemoryWriter};

    fn messages(entry: &ConversationEntry) -> Vec<String> {
        entry
            .children()
            .iter()
            .map(|child| child.as_text().map_or_else(|| "-".to_string(), |text| text.message.clone()))
            .collect()
    }

    #[test]
    fn set_child_pads_and_appends() {
        let mut entry = ConversationEntry::none();
        entry.set_child(2, ConversationEntry::text("c"), &ConversationEntry::none());
        assert_eq!(messages(&entry), vec!["-", "-", "c"]);
        entry.set_child(3, ConversationEntry::text("d"), &ConversationEntry::none());
        assert_eq!(messages(&entry), vec!["-", "-", "c", "d"]);
    }

    #[test]
    fn set_child_hands_over_the_subtree() {
        let mut entry = ConversationEntry::none();
        let mut old = ConversationEntry::text("old");
        old.set_child(0, ConversationEntry::text("x"), &ConversationEntry::none());
        old.set_child(1, ConversationEntry::text("y"), &ConversationEntry::none());
        entry.set_child(0, old, &ConversationEntry::none());

        entry.set_child(0, ConversationEntry::text("new"), &ConversationEntry::none());
        let replaced = entry.child(0).unwrap();
        assert_eq!(replaced.as_text().unwrap().message, "new");
        assert_eq!(messages(replaced), vec!["x", "y"]);
    }

    #[test]
    fn insert_in_front_of_lone_child_nests_it() {
        let mut entry = ConversationEntry::none();
        entry.insert_child(0, ConversationEntry::text("a"), &ConversationEntry::none());
        entry.insert_child(0, ConversationEntry::text("b"), &ConversationEntry::none());
        assert_eq!(messages(&entry), vec!["b"]);
        assert_eq!(messages(entry.child(0).unwrap()), vec!["a"]);
    }

    #[test]
    fn insert_among_several_children_shifts_right() {
        let mut entry = ConversationEntry::none();
        entry.set_child(0, ConversationEntry::text("a"), &ConversationEntry::none());
        entry.set_child(1, ConversationEntry::text("b"), &ConversationEntry::none());
        entry.insert_child(0, ConversationEntry::text("z"), &ConversationEntry::none());
        assert_eq!(messages(&entry), vec!["z", "a", "b"]);
        entry.insert_child(5, ConversationEntry::text("q"), &ConversationEntry::text("pad"));
        assert_eq!(messages(&entry), vec!["z", "a", "b", "pad", "pad", "q"]);
    }

    #[test]
    fn delete_child_out_of_range_is_a_no_op() {
        let mut entry = ConversationEntry::none();
        entry.set_child(0, ConversationEntry::text("a"), &ConversationEntry::none());
        assert!(entry.delete_child(1).is_none());
        assert_eq!(entry.child_count(), 1);
        assert!(entry.delete_child(0).is_some());
        assert_eq!(entry.child_count(), 0);
        assert_eq!(entry.child(0), Err(EntryError::OutOfRange { position: 0, count: 0 }));
    }

    #[test]
    fn clone_is_deep() {
        let mut entry = ConversationEntry::text("root");
        entry.set_child(0, ConversationEntry::text("leaf"), &ConversationEntry::none());
        let mut copy = entry.clone();
        copy.child_mut(0).unwrap().as_text_mut().unwrap().message = "changed".into();
        assert_eq!(messages(&entry), vec!["leaf"]);
        assert_eq!(messages(&copy), vec!["changed"]);
    }

    #[test]
    fn text_saves_only_non_default_fields() {
        let mut text = TextEntry::new("Hello");
        let mut writer = MemoryWriter::new();
        text.save_fields(&mut writer).unwrap();
        assert_eq!(writer.records().len(), 1);

        text.speaker_id = 6;
        text.delay_ms = 250;
        text.event = Event::new(EventKind::MapSwitch(MapSwitch { map_id: 2 }));
        let mut writer = MemoryWriter::new();
        text.save_fields(&mut writer).unwrap();
        let paths: Vec<_> = writer.records().iter().map(Record::path_string).collect();
        assert_eq!(paths, vec!["text", "id", "delay", "event/startmap/id"]);
    }

    #[test]
    fn text_loads_nested_event() {
        let mut entry = ConversationEntry::from(TextEntry::default());
        let rec = Record::new(
            vec![Element::new("event"), Element::new("giveitem"), Element::new("id")],
            DataValue::Integer(40),
        );
        entry.load(&rec, 0).unwrap();
        assert_eq!(entry.as_text().unwrap().event.event_type(), EventType::ItemGive);
        assert!(entry.is_saveable());
        assert!(!ConversationEntry::none().is_saveable());
    }
}
