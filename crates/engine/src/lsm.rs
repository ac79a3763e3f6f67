use std::path::{Path, PathBuf};

use memtable::Memtable;
use segment::{merge_segments, SegmentReader, SegmentWriter, StoreKey};

use crate::store::Store;
use crate::Result;

/// File name of a segment with the given generation id. Zero-padded so a
/// lexical directory listing orders segments by generation.
fn segment_file_name(id: u64) -> String {
    format!("segment-{:06}.seg", id)
}

/// Parses a generation id back out of a segment file name.
fn parse_segment_id(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    let id = name.strip_prefix("segment-")?.strip_suffix(".seg")?;
    id.parse().ok()
}

/// The log-structured-merge storage engine.
///
/// # Write path
///
/// 1. If the memtable already holds `memtable_max_size` records, flush it to
///    a new segment first, so the flushed buffer is exactly full and the
///    triggering record lands in the fresh buffer.
/// 2. Insert into the memtable (last write wins within the buffer).
///
/// # Read path
///
/// 1. Check the memtable: the freshest possible answer, no disk I/O.
/// 2. Walk segments newest → oldest, each lookup bounded by that segment's
///    sparse index. The first match is authoritative; older segments can
///    only hold stale values for the key.
///
/// # Compaction
///
/// [`compact`](LsmTree::compact) is an offline operation, independent of the
/// read/write path: it k-way merges every registered segment into one and
/// swaps the result in as the sole segment. Input files stay on disk;
/// deleting superseded files is the caller's responsibility.
///
/// # Durability
///
/// Memtable contents are volatile: there is no write-ahead log, so unflushed
/// writes are lost on restart. [`open`](LsmTree::open) recovers what was
/// flushed by re-scanning segment files to rebuild their sparse indexes.
pub struct LsmTree<K: StoreKey> {
    memtable: Memtable<K>,
    memtable_max_size: usize,
    index_every: usize,
    /// Newest first: index 0 is the most recently flushed segment.
    segments: Vec<SegmentReader<K>>,
    next_segment_id: u64,
    segment_dir: PathBuf,
}

impl<K: StoreKey> LsmTree<K> {
    /// Creates an empty store rooted at `segment_dir` (created if missing).
    ///
    /// `memtable_max_size` is the record count that triggers a flush (must
    /// be at least 1); `index_every` is the sparse-index sampling interval.
    /// Both are instance configuration, so independent stores with different
    /// directories can coexist in one process.
    pub fn new<P: AsRef<Path>>(
        segment_dir: P,
        memtable_max_size: usize,
        index_every: usize,
    ) -> Result<Self> {
        let segment_dir = segment_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&segment_dir)?;

        Ok(Self {
            memtable: Memtable::new(),
            memtable_max_size,
            index_every,
            segments: Vec::new(),
            next_segment_id: 0,
            segment_dir,
        })
    }

    /// Opens a store over a directory that may already contain segments.
    ///
    /// Existing segment files are registered newest-first with their sparse
    /// indexes rebuilt by a single scan each, and the generation counter
    /// resumes after the highest id found. Anything that was still in the
    /// memtable when the previous process exited is gone.
    pub fn open<P: AsRef<Path>>(
        segment_dir: P,
        memtable_max_size: usize,
        index_every: usize,
    ) -> Result<Self> {
        let mut tree = Self::new(segment_dir, memtable_max_size, index_every)?;

        let mut found: Vec<(u64, PathBuf)> = std::fs::read_dir(&tree.segment_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter_map(|path| parse_segment_id(&path).map(|id| (id, path)))
            .collect();

        // Highest generation first = newest first.
        found.sort_by(|a, b| b.0.cmp(&a.0));

        if let Some(&(max_id, _)) = found.first() {
            tree.next_segment_id = max_id + 1;
        }
        for (id, path) in found {
            tree.segments.push(SegmentReader::open(&path, id, index_every)?);
        }

        tracing::debug!(
            dir = %tree.segment_dir.display(),
            segments = tree.segments.len(),
            "opened store"
        );

        Ok(tree)
    }

    /// Inserts or updates `key`, flushing the memtable first if it is full.
    pub fn write(&mut self, key: K, value: String) -> Result<()> {
        if self.memtable.len() >= self.memtable_max_size {
            self.flush()?;
        }
        self.memtable.insert(key, value);
        Ok(())
    }

    /// Returns the most recent value for `key`, or `None` if no generation
    /// of the store holds it.
    pub fn read(&self, key: &K) -> Result<Option<String>> {
        if let Some(value) = self.memtable.get(key) {
            return Ok(Some(value.to_string()));
        }

        tracing::debug!(key = %key.encode(), "key not in memtable, searching segments");
        for seg in &self.segments {
            if let Some(value) = seg.get(key)? {
                return Ok(Some(value));
            }
        }

        Ok(None)
    }

    /// Flushes the memtable to a new segment and registers it as newest.
    fn flush(&mut self) -> Result<()> {
        let id = self.next_segment_id;
        let path = self.segment_dir.join(segment_file_name(id));

        let index = SegmentWriter::write_from_memtable(&path, &self.memtable, self.index_every)?;

        self.memtable = Memtable::new();
        self.segments.insert(0, SegmentReader::new(path, id, index));
        self.next_segment_id += 1;
        Ok(())
    }

    /// Merges every registered segment into one, newest-first precedence,
    /// and swaps the result in as the sole segment. A no-op with fewer than
    /// two segments.
    ///
    /// The merged file is published atomically; the superseded input files
    /// are left on disk for the caller to garbage-collect.
    pub fn compact(&mut self) -> Result<()> {
        if self.segments.len() < 2 {
            return Ok(());
        }

        let inputs: Vec<PathBuf> = self
            .segments
            .iter()
            .map(|seg| seg.path().to_path_buf())
            .collect();
        let input_count = inputs.len();

        let id = self.next_segment_id;
        let out = self.segment_dir.join(segment_file_name(id));
        let index = merge_segments::<K>(&inputs, &out, self.index_every)?;

        self.segments = vec![SegmentReader::new(out, id, index)];
        self.next_segment_id += 1;

        tracing::info!(inputs = input_count, generation = id, "compacted segments");
        Ok(())
    }

    /// Number of registered on-disk segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of records currently buffered in the memtable.
    pub fn memtable_len(&self) -> usize {
        self.memtable.len()
    }

    /// Paths of the registered segments, newest first. Useful for callers
    /// that garbage-collect files superseded by compaction.
    pub fn segment_paths(&self) -> impl Iterator<Item = &Path> {
        self.segments.iter().map(|seg| seg.path())
    }
}

impl<K: StoreKey> Store<K> for LsmTree<K> {
    fn write(&mut self, key: K, value: String) -> Result<()> {
        LsmTree::write(self, key, value)
    }

    fn read(&self, key: &K) -> Result<Option<String>> {
        LsmTree::read(self, key)
    }
}
