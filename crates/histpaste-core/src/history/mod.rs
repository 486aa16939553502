//! Session history rings.
//!
//! Input and output history are two rings addressed by the same absolute
//! index: entry `n` of the output ring is the result of entry `n` of the input
//! ring. Readers go through [`HistoryRing`] so composition never depends on
//! where a ring came from.

mod session_log;

use std::collections::VecDeque;

pub use session_log::{SCHEMA_VERSION, SessionEvent, SessionHistory, SessionLog};

/// Read access to an ordered, append-only history.
pub trait HistoryRing {
    type Entry;

    /// Number of entries ever recorded; the next entry gets this index.
    fn len(&self) -> usize;

    /// The entry at an absolute index, if it is still held.
    fn entry_at(&self, index: usize) -> Option<&Self::Entry>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> HistoryRing for Vec<T> {
    type Entry = T;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn entry_at(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

/// Textual representation of a recorded result.
pub trait Inspect {
    fn inspect(&self) -> String;
}

impl Inspect for String {
    fn inspect(&self) -> String {
        self.clone()
    }
}

impl Inspect for serde_json::Value {
    /// Strings render bare, everything else as compact JSON.
    fn inspect(&self) -> String {
        match self {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// A bounded history ring.
///
/// Once `capacity` is reached the oldest entries are evicted, but numbering
/// keeps counting from the first entry ever pushed: evicted indices read as
/// absent while [`HistoryRing::len`] keeps growing.
#[derive(Debug, Clone)]
pub struct Ring<T> {
    entries: VecDeque<Option<T>>,
    capacity: Option<usize>,
    count: usize,
}

impl<T> Ring<T> {
    /// An unbounded ring.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: None,
            count: 0,
        }
    }

    /// A ring holding at most `capacity` entries; zero means unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: (capacity > 0).then_some(capacity),
            count: 0,
        }
    }

    pub fn push(&mut self, entry: T) {
        self.push_slot(Some(entry));
    }

    /// Records a slot with no entry, keeping indices aligned with a sibling ring.
    pub fn push_absent(&mut self) {
        self.push_slot(None);
    }

    fn push_slot(&mut self, slot: Option<T>) {
        if let Some(capacity) = self.capacity
            && self.entries.len() == capacity
        {
            self.entries.pop_front();
        }
        self.entries.push_back(slot);
        self.count += 1;
    }

    /// Absolute index of the oldest slot still held.
    pub fn oldest_index(&self) -> usize {
        self.count - self.entries.len()
    }
}

impl<T> Default for Ring<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HistoryRing for Ring<T> {
    type Entry = T;

    fn len(&self) -> usize {
        self.count
    }

    fn entry_at(&self, index: usize) -> Option<&T> {
        let offset = index.checked_sub(self.oldest_index())?;
        self.entries.get(offset)?.as_ref()
    }
}
