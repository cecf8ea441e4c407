//! Bounded History Buffer: fixed-capacity ring, newest write overwrites the oldest slot.

use parking_lot::Mutex;

use crate::capture::entry::CapturedEntry;

/// Per-tenant history of captured requests.
pub type RequestHistory = HistoryBuffer<CapturedEntry>;

// ========================================
// RING (not thread-safe, guarded by HistoryBuffer)
// ========================================

struct Ring<T> {
    /// `None` until the slot is written for the first time
    slots: Box<[Option<T>]>,
    /// Next slot to write
    cursor: usize,
    pushed: u64,
}

impl<T> Ring<T> {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            cursor: 0,
            pushed: 0,
        }
    }

    fn push(&mut self, value: T) {
        self.slots[self.cursor] = Some(value);
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.pushed += 1;
    }

    /// Walks backwards from the last written slot: newest first.
    fn iter_newest_first(&self) -> impl Iterator<Item = &T> {
        let cap = self.slots.len();
        (1..=cap).filter_map(move |step| {
            let idx = (self.cursor + cap - step) % cap;
            self.slots[idx].as_ref()
        })
    }

    fn len(&self) -> usize {
        (self.pushed.min(self.slots.len() as u64)) as usize
    }
}

// ========================================
// HISTORY BUFFER
// ========================================

pub struct HistoryBuffer<T> {
    ring: Mutex<Ring<T>>,
    capacity: usize,
}

impl<T: Clone> HistoryBuffer<T> {
    /// A zero capacity is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Mutex::new(Ring::new(capacity)),
            capacity,
        }
    }

    /// Never rejects: once full, the oldest entry is overwritten.
    pub fn push(&self, value: T) {
        self.ring.lock().push(value);
    }

    /// Every written slot, newest write first. Callers that display entries
    /// still sort by timestamp; this order only settles ties.
    pub fn snapshot(&self) -> Vec<T> {
        let ring = self.ring.lock();
        ring.iter_newest_first().cloned().collect()
    }

    /// [`snapshot`](Self::snapshot) and [`total_pushed`](Self::total_pushed)
    /// read under one lock, so no push can land between them.
    pub fn snapshot_with_total(&self) -> (Vec<T>, u64) {
        let ring = self.ring.lock();
        (ring.iter_newest_first().cloned().collect(), ring.pushed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifetime push count, including entries already overwritten.
    pub fn total_pushed(&self) -> u64 {
        self.ring.lock().pushed
    }
}

impl<T> std::fmt::Debug for HistoryBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = self.ring.lock();
        f.debug_struct("HistoryBuffer")
            .field("capacity", &self.capacity)
            .field("cursor", &ring.cursor)
            .field("pushed", &ring.pushed)
            .finish()
    }
}
