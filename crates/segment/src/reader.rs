use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::format::parse_record;
use crate::key::StoreKey;
use crate::sparse::SparseIndex;
use crate::Result;

/// Reads an immutable segment file for point lookups.
///
/// Holds the file path, the segment's generation id, and the in-memory
/// sparse index. The data file is **not** kept open between lookups; each
/// [`get`](SegmentReader::get) opens the file, seeks into the bracketed
/// window, scans, and drops the handle. Readers therefore never contend with
/// the single writer that created the file, which has long since finished.
pub struct SegmentReader<K: StoreKey> {
    path: PathBuf,
    id: u64,
    index: SparseIndex<K>,
}

impl<K: StoreKey> SegmentReader<K> {
    /// Wraps a freshly flushed segment with the index its writer built.
    pub fn new(path: PathBuf, id: u64, index: SparseIndex<K>) -> Self {
        Self { path, id, index }
    }

    /// Reopens an existing segment file, rebuilding its sparse index with a
    /// single sequential scan.
    ///
    /// The index is never persisted, so this is the restart path: the same
    /// countdown sampling the writer uses is replayed against the file's
    /// line offsets, producing an identical index.
    pub fn open(path: &Path, id: u64, index_every: usize) -> Result<Self> {
        let mut file = BufReader::new(File::open(path)?);
        let mut index = SparseIndex::new();
        let mut countdown = index_every;
        let mut offset = 0u64;
        let mut line = String::new();

        loop {
            line.clear();
            let n = file.read_line(&mut line)?;
            if n == 0 {
                break;
            }
            if countdown == 0 {
                let (key_text, _) = parse_record(&line)?;
                index.insert(K::decode(key_text)?, offset);
                countdown = index_every;
            }
            offset += n as u64;
            countdown = countdown.saturating_sub(1);
        }

        tracing::debug!(
            path = %path.display(),
            sampled = index.len(),
            "rebuilt sparse index for segment"
        );

        Ok(Self {
            path: path.to_path_buf(),
            id,
            index,
        })
    }

    /// Point lookup for a single key.
    ///
    /// Brackets the key between sampled offsets, seeks to the floor, and
    /// scans records sequentially. A record whose key equals the query
    /// short-circuits with its value; once the running offset reaches a
    /// bounded ceil the key is absent from this segment. The match check
    /// runs before the bound check so an exact-hit window `(off, off)` still
    /// reads the record it pins.
    ///
    /// # Errors
    ///
    /// Any malformed line inside the scanned window is fatal
    /// ([`Corrupt`](crate::Error::Corrupt)), as is a key that does not
    /// decode as `K` ([`KeyMismatch`](crate::Error::KeyMismatch)).
    pub fn get(&self, key: &K) -> Result<Option<String>> {
        let window = self.index.locate(key);

        let mut file = BufReader::new(File::open(&self.path)?);
        file.seek(SeekFrom::Start(window.floor))?;

        let mut offset = window.floor;
        let mut line = String::new();
        loop {
            line.clear();
            let n = file.read_line(&mut line)?;
            if n == 0 {
                return Ok(None); // ran off the end of the segment
            }
            offset += n as u64;

            let (key_text, value) = parse_record(&line)?;
            if &K::decode(key_text)? == key {
                return Ok(Some(value.to_string()));
            }
            if let Some(ceil) = window.ceil {
                if offset >= ceil {
                    return Ok(None);
                }
            }
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Generation id assigned at flush time.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The in-memory sparse index.
    pub fn index(&self) -> &SparseIndex<K> {
        &self.index
    }
}
