use std::fs::{rename, OpenOptions};
use std::io::{Seek, Write};
use std::path::Path;

use memtable::Memtable;

use crate::format::encode_record;
use crate::key::StoreKey;
use crate::sparse::SparseIndex;
use crate::{Error, Result};

/// Writes a [`Memtable`] to disk as an immutable segment file.
///
/// The writer is stateless — all work happens inside the single static method
/// [`write_from_memtable`](SegmentWriter::write_from_memtable). The write is
/// crash-safe: records are first written to a temporary file, fsynced, and
/// then atomically renamed to the final path, so a failed flush leaves the
/// store exactly as it was.
pub struct SegmentWriter {}

impl SegmentWriter {
    /// Flushes `mem` to a new segment file at `path`, returning the sparse
    /// index built along the way.
    ///
    /// Records are emitted in ascending key order, one `"<key>: <value>\n"`
    /// line each. Sampling counts down from `index_every`: once it reaches
    /// zero the next record's (key, byte offset) is recorded and the counter
    /// resets, so the very first record is never sampled and the trailing
    /// partial chunk stays covered by scan-to-end-of-file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyFlush`] for an empty memtable (an empty segment
    /// is never useful and indicates a logic bug in the caller) or any I/O
    /// failure.
    pub fn write_from_memtable<K: StoreKey>(
        path: &Path,
        mem: &Memtable<K>,
        index_every: usize,
    ) -> Result<SparseIndex<K>> {
        if mem.is_empty() {
            return Err(Error::EmptyFlush);
        }

        // Write to a temporary file next to the target for atomic rename later
        let tmp_path = path.with_extension("seg.tmp");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        let mut index = SparseIndex::new();
        let mut countdown = index_every;

        for (key, value) in mem.iter() {
            if countdown == 0 {
                let offset = file.stream_position()?;
                index.insert(key.clone(), offset);
                countdown = index_every;
            }

            file.write_all(encode_record(&key.encode(), value).as_bytes())?;
            countdown = countdown.saturating_sub(1);
        }

        file.flush()?;
        file.sync_all()?;

        // Atomically move into place
        rename(&tmp_path, path)?;

        tracing::debug!(
            path = %path.display(),
            records = mem.len(),
            sampled = index.len(),
            "flushed memtable to segment"
        );

        Ok(index)
    }
}
