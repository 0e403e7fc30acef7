//! Merging the one-shot `/posts` fetch with the live subscription.
//!
//! The fetch and the stream race. Live records that arrive before the fetch completes are held
//! back and prepended, in arrival order, right after the snapshot seeds the buffer, so the
//! outcome does not depend on which side finishes first. Duplicates between the two are
//! dropped by key.
//!
//! The early queue holds at most `capacity` records; once full, the oldest queued record is
//! dropped to make room.

use std::collections::{HashSet, VecDeque};

use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use crate::buffer::FeedBuffer;
use crate::config::FeedConfig;
use crate::record::Record;

/// Something delivered by one of the two feed sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// Result of the bulk fetch, in server order.
    Snapshot(Vec<Record>),
    /// One record from the subscription stream.
    Live(Record),
}

#[derive(Debug, Clone)]
pub struct FeedSync {
    buffer: FeedBuffer,
    pending: VecDeque<Record>,
    pending_keys: HashSet<SmolStr>,
    seeded: bool,
}

impl FeedSync {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: FeedBuffer::new(capacity),
            pending: VecDeque::new(),
            pending_keys: HashSet::new(),
            seeded: false,
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.capacity)
    }

    /// Apply one event. Returns true if the visible feed changed.
    pub fn apply(&mut self, event: FeedEvent) -> bool {
        match event {
            FeedEvent::Snapshot(records) => {
                self.on_snapshot(records);
                true
            }
            FeedEvent::Live(record) => self.on_live(record),
        }
    }

    /// Seed from the bulk fetch, then replay any live records that beat it.
    pub fn on_snapshot(&mut self, records: Vec<Record>) {
        if self.seeded {
            warn!("feed snapshot received twice, reseeding");
        }
        let fetched = records.len();
        self.buffer.seed(records);
        self.seeded = true;

        let mut replayed = 0;
        self.pending_keys.clear();
        for record in std::mem::take(&mut self.pending) {
            if self.buffer.prepend(record) {
                replayed += 1;
            }
        }
        debug!(
            fetched,
            kept = self.buffer.len(),
            replayed,
            "seeded feed from snapshot"
        );
    }

    /// Handle one live record. Returns true if it was inserted into the visible feed.
    pub fn on_live(&mut self, record: Record) -> bool {
        if !self.seeded {
            if !self.pending_keys.insert(SmolStr::new(record.key())) {
                debug!(key = record.key(), "ignoring duplicate early live record");
                return false;
            }
            debug!(key = record.key(), "queueing live record until snapshot arrives");
            self.pending.push_back(record);
            while self.pending.len() > self.buffer.capacity() {
                if let Some(dropped) = self.pending.pop_front() {
                    trace!(key = dropped.key(), "dropping oldest early live record");
                    self.pending_keys.remove(dropped.key());
                }
            }
            return false;
        }
        self.buffer.prepend(record)
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Live records waiting for the snapshot.
    pub fn pending(&self) -> &VecDeque<Record> {
        &self.pending
    }

    pub fn buffer(&self) -> &FeedBuffer {
        &self.buffer
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.buffer.snapshot()
    }
}

impl Default for FeedSync {
    fn default() -> Self {
        Self::new(FeedBuffer::DEFAULT_CAPACITY)
    }
}
