//! Sparse offset index: every Nth record's key mapped to its byte offset.

use std::collections::BTreeMap;
use std::ops::Bound;

/// Byte-offset window `[floor, ceil)` guaranteed to contain a key if the
/// segment holds it. `ceil == None` means the scan runs to end of file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub floor: u64,
    pub ceil: Option<u64>,
}

/// Ordered map from sampled keys to the byte offset of the record's start.
///
/// Built once while a segment is written (or rebuilt by scanning when an
/// existing file is reopened) and held in memory for the lifetime of the
/// process and is never persisted. Sampled keys and offsets both strictly
/// increase; the trailing partial chunk of a segment is covered by "scan to
/// end of file" rather than an index entry.
#[derive(Debug, Default)]
pub struct SparseIndex<K> {
    entries: BTreeMap<K, u64>,
}

impl<K: Ord> SparseIndex<K> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Records a sampled (key, offset) pair.
    pub fn insert(&mut self, key: K, offset: u64) {
        self.entries.insert(key, offset);
    }

    /// Brackets `key` between sampled offsets.
    ///
    /// - A sampled key equal to `key` pins the window to that exact record:
    ///   `(offset, Some(offset))`.
    /// - Otherwise the floor is the offset of the greatest sampled key below
    ///   `key` (0 when there is none) and the ceil is the offset of the
    ///   smallest sampled key above it (`None` when the key sorts past every
    ///   sample, leaving the scan unbounded).
    pub fn locate(&self, key: &K) -> ScanWindow {
        if let Some(&offset) = self.entries.get(key) {
            return ScanWindow {
                floor: offset,
                ceil: Some(offset),
            };
        }

        let floor = self
            .entries
            .range(..key)
            .next_back()
            .map(|(_, &offset)| offset)
            .unwrap_or(0);
        let ceil = self
            .entries
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .map(|(_, &offset)| offset);

        ScanWindow { floor, ceil }
    }

    /// Number of sampled entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sampled keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }
}
