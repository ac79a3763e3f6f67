//! # Memtable
//!
//! An in-memory, sorted, mutable write buffer for the StrataKV storage engine.
//!
//! The memtable is the first point of contact for every write operation. It
//! buffers recent writes in a sorted structure (`BTreeMap`) before they are
//! flushed to immutable on-disk segments.
//!
//! ## Key properties
//! - **Sorted order**: entries are always in ascending key order (required for
//!   segment flush, which must emit records strictly ascending).
//! - **Last write wins**: inserting an existing key overwrites its value.
//! - **Record-count sizing**: the flush threshold is measured in number of
//!   records, so `len()` is the size the engine checks against.
//!
//! There is no delete operation and no tombstone marker: an update is simply a
//! newer record for the same key, and staleness is resolved by recency
//! ordering (buffer first, then newest-to-oldest segments).
//!
//! ## Example
//! ```rust
//! use memtable::Memtable;
//!
//! let mut m = Memtable::new();
//! m.insert("hello".to_string(), "world".to_string());
//! assert_eq!(m.get(&"hello".to_string()), Some("world"));
//! ```

use std::collections::BTreeMap;

/// An ordered, in-memory write buffer backed by a `BTreeMap`.
///
/// Generic over any totally-ordered key type. The `BTreeMap` backing gives
/// O(log n) insert and ascending iteration, both of which segment flush
/// correctness depends on.
#[derive(Debug)]
pub struct Memtable<K: Ord> {
    map: BTreeMap<K, String>,
}

impl<K: Ord> Memtable<K> {
    /// Creates a new, empty memtable.
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Inserts a key-value pair, overwriting any existing value for the key.
    ///
    /// Within the buffer the last write for a key always wins.
    pub fn insert(&mut self, key: K, value: String) {
        self.map.insert(key, value);
    }

    /// Looks up a key. Returns `None` for a missing key, never an error.
    pub fn get(&self, key: &K) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// Returns an iterator over all entries in **ascending key order**.
    ///
    /// The ordering guarantee is provided by the underlying `BTreeMap` and is
    /// required for correct segment flush. The iterator is finite and can be
    /// restarted by calling `iter()` again.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &str)> {
        self.map.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Returns the number of records in the buffer.
    ///
    /// This is the size the engine compares against `memtable_max_size` when
    /// deciding whether to flush.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the memtable contains zero records.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if the memtable contains the given key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Removes all entries.
    ///
    /// Semantically equivalent to replacing the memtable with
    /// `Memtable::new()`, but reuses the existing allocation.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K: Ord> Default for Memtable<K> {
    fn default() -> Self {
        Self::new()
    }
}
