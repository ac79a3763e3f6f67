use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::hash::Hash;
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use segment::{encode_record, parse_record, StoreKey};

use crate::store::Store;
use crate::Result;

/// Append-only key-value file with an in-memory hash map from key to byte
/// offset.
///
/// Every write appends one record line and remembers where it starts; a
/// read seeks straight to the newest recorded offset and parses a single
/// line. There is no ordering and no compaction: the data file only grows,
/// and the offset map lives in memory only: reopening the file later starts
/// from an empty map.
pub struct HashIndex<K> {
    /// Append handle held for the store's lifetime.
    file: File,
    path: PathBuf,
    offsets: HashMap<K, u64>,
}

impl<K: StoreKey + Hash> HashIndex<K> {
    /// Creates (or appends to) the data file at `path` with an empty offset
    /// map.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file,
            path,
            offsets: HashMap::new(),
        })
    }

    /// Appends a record and points the key's offset at it.
    ///
    /// Rewriting a key leaves the old record in the file; only the offset
    /// map moves, so the newest append wins.
    pub fn write(&mut self, key: K, value: String) -> Result<()> {
        let offset = self.file.seek(SeekFrom::End(0))?;
        self.file
            .write_all(encode_record(&key.encode(), &value).as_bytes())?;
        self.offsets.insert(key, offset);
        Ok(())
    }

    /// Reads the value for `key` in a single seek, or `None` if the offset
    /// map has never seen the key.
    pub fn read(&self, key: &K) -> Result<Option<String>> {
        let Some(&offset) = self.offsets.get(key) else {
            return Ok(None);
        };

        let mut file = BufReader::new(File::open(&self.path)?);
        file.seek(SeekFrom::Start(offset))?;

        let mut line = String::new();
        file.read_line(&mut line)?;
        let (_, value) = parse_record(&line)?;
        Ok(Some(value.to_string()))
    }

    /// Number of distinct keys in the offset map.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl<K: StoreKey + Hash> Store<K> for HashIndex<K> {
    fn write(&mut self, key: K, value: String) -> Result<()> {
        HashIndex::write(self, key, value)
    }

    fn read(&self, key: &K) -> Result<Option<String>> {
        HashIndex::read(self, key)
    }
}
