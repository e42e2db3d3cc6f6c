//! Bounded ring buffer of recent inference attempts.

use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct InferenceRecord {
    pub model_id: String,
    pub success: bool,
    pub processing_time_ms: u64,
    pub started_at_ms: u64,
}

/// Keeps at most `capacity` records, dropping the oldest on overflow.
pub struct History {
    records: Mutex<VecDeque<InferenceRecord>>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn push(&self, record: InferenceRecord) {
        let mut records = self.records.lock();
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<InferenceRecord> {
        self.records.lock().iter().cloned().collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(10_000)
    }
}
