use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use segment::{encode_record, parse_record, StoreKey};

use crate::store::Store;
use crate::Result;

/// The naive baseline: an append-only log with no index at all.
///
/// Writes append one record line; reads scan every record in the file and
/// keep the last match, so an update is just a newer line and last write
/// wins. O(n) per read: this exists as the simplest correct implementation
/// of the [`Store`] contract, not as something to deploy.
pub struct ScanLog<K> {
    /// Append handle held for the store's lifetime.
    file: File,
    path: PathBuf,
    _key: PhantomData<K>,
}

impl<K: StoreKey> ScanLog<K> {
    /// Creates (or appends to) the log file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file,
            path,
            _key: PhantomData,
        })
    }

    /// Appends a record line.
    pub fn write(&mut self, key: K, value: String) -> Result<()> {
        self.file
            .write_all(encode_record(&key.encode(), &value).as_bytes())?;
        Ok(())
    }

    /// Scans the whole file and returns the value of the last record whose
    /// key matches, or `None`.
    pub fn read(&self, key: &K) -> Result<Option<String>> {
        let file = BufReader::new(File::open(&self.path)?);

        let mut last = None;
        for line in file.lines() {
            let line = line?;
            let (key_text, value) = parse_record(&line)?;
            if &K::decode(key_text)? == key {
                last = Some(value.to_string());
            }
        }
        Ok(last)
    }
}

impl<K: StoreKey> Store<K> for ScanLog<K> {
    fn write(&mut self, key: K, value: String) -> Result<()> {
        ScanLog::write(self, key, value)
    }

    fn read(&self, key: &K) -> Result<Option<String>> {
        ScanLog::read(self, key)
    }
}
