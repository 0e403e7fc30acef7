//! Newest-first feed storage with a hard size bound.

use std::collections::{HashSet, VecDeque};

use smol_str::SmolStr;
use tracing::trace;

use crate::record::Record;

/// Capacity-bounded, insertion-ordered records, front is most recent.
///
/// Keys are unique. Records only leave by being pushed off the tail when a newer one is
/// prepended past capacity; nothing expires by age.
#[derive(Debug, Clone)]
pub struct FeedBuffer {
    records: VecDeque<Record>,
    keys: HashSet<SmolStr>,
    capacity: usize,
}

impl FeedBuffer {
    /// Feed size used by the picosky client.
    pub const DEFAULT_CAPACITY: usize = 50;

    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            keys: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        if !self.contains_key(key) {
            return None;
        }
        self.records.iter().find(|record| record.key() == key)
    }

    /// Replace the contents with the first `capacity` records of a bulk fetch, in the order
    /// given. A key repeated within the fetch keeps its first occurrence.
    pub fn seed(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.clear();
        self.keys.clear();
        for record in records {
            if self.records.len() == self.capacity {
                break;
            }
            if !self.keys.insert(SmolStr::new(record.key())) {
                trace!(key = record.key(), "skipping repeated key in seed");
                continue;
            }
            self.records.push_back(record);
        }
    }

    /// Insert `record` at the front unless its key is already present.
    ///
    /// Returns `false` and leaves the buffer untouched on a duplicate key. Otherwise evicts from
    /// the tail down to capacity and returns `true`.
    pub fn prepend(&mut self, record: Record) -> bool {
        if !self.keys.insert(SmolStr::new(record.key())) {
            trace!(key = record.key(), "ignoring duplicate record");
            return false;
        }
        self.records.push_front(record);
        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_back() {
                trace!(key = evicted.key(), "evicting oldest record");
                self.keys.remove(evicted.key());
            }
        }
        true
    }

    /// Front-to-back iteration, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Owned copy of the contents, most recent first.
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.iter().cloned().collect()
    }
}

impl Default for FeedBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
