//! Cursor-based writing of record streams.

use crate::record::{DataValue, Element, Record};

/// Write access to a hierarchical save medium.
///
/// Writing an element descends into it; leaf data is written under the current
/// element; `jump_to_parent` climbs back out.
pub trait RecordWriter {
    /// Open a child element and move the cursor inside it.
    fn write_element(&mut self, name: &str);

    /// Open a child element carrying one attribute pair and move the cursor inside it.
    fn write_keyed_element(&mut self, name: &str, key: &str, value: &str);

    /// Write a leaf value under the current element.
    fn write_data(&mut self, name: &str, value: DataValue);

    /// Move the cursor up one level. Does nothing at the root.
    fn jump_to_parent(&mut self);

    /// Move the cursor back to the document root.
    fn jump_to_root(&mut self);
}

/// In-memory writer that flattens every leaf into a [`Record`].
#[derive(Debug, Default)]
pub struct MemoryWriter {
    cursor: Vec<Element>,
    records: Vec<Record>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records written so far, in write order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Current nesting depth of the write cursor.
    pub fn depth(&self) -> usize {
        self.cursor.len()
    }
}

impl RecordWriter for MemoryWriter {
    fn write_element(&mut self, name: &str) {
        self.cursor.push(Element::new(name));
    }

    fn write_keyed_element(&mut self, name: &str, key: &str, value: &str) {
        self.cursor.push(Element::keyed(name, key, value));
    }

    fn write_data(&mut self, name: &str, value: DataValue) {
        let mut elements = self.cursor.clone();
        elements.push(Element::new(name));
        self.records.push(Record { elements, data: value });
    }

    fn jump_to_parent(&mut self) {
        self.cursor.pop();
    }

    fn jump_to_root(&mut self) {
        self.cursor.clear();
    }
}
