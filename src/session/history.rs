//! In-memory transaction log, newest first.

use std::collections::VecDeque;

use crate::session::types::TransactionRecord;

/// Unbounded, clearable log of completed attempts.
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    records: VecDeque<TransactionRecord>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt; it becomes the first entry.
    pub fn push(&mut self, record: TransactionRecord) {
        self.records.push_front(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records in display order, newest first.
    pub fn to_vec(&self) -> Vec<TransactionRecord> {
        self.records.iter().cloned().collect()
    }
}
