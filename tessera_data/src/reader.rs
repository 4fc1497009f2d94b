//! Sequential reading of record streams.

use std::collections::VecDeque;

use crate::record::Record;

/// Hands out records one at a time, in document order.
#[derive(Debug, Default)]
pub struct RecordReader {
    pending: VecDeque<Record>,
    total: usize,
}

impl RecordReader {
    pub fn new(records: Vec<Record>) -> Self {
        let total = records.len();
        Self {
            pending: records.into(),
            total,
        }
    }

    /// Next record, or `None` once the stream is exhausted.
    pub fn next_record(&mut self) -> Option<Record> {
        self.pending.pop_front()
    }

    /// Number of records the reader started with.
    pub fn total_count(&self) -> usize {
        self.total
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Iterator for RecordReader {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.next_record()
    }
}
