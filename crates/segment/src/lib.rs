//! # Segment: immutable sorted storage files
//!
//! On-disk storage for the StrataKV storage engine.
//!
//! When the in-memory [`memtable::Memtable`] reaches its record-count
//! threshold the engine flushes it to disk as a segment. Segments are
//! **write-once, read-many**: once created they are never modified, only
//! superseded by newer segments or replaced during compaction.
//!
//! ## File layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ one record per line, ascending key order     │
//! │                                              │
//! │ <key>: <value>\n                             │
//! │ <key>: <value>\n                             │
//! │ ...                                          │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! UTF-8 text, no footer, no trailing index. The sparse index (every Nth
//! record's key mapped to its byte offset) is built while writing and lives
//! only in memory; reopening a segment rebuilds it with a single scan.
//!
//! Because `':'` delimits key from value, neither encoded keys nor values may
//! contain `':'` or newlines; a line that does not split into exactly one
//! key/value pair is reported as corruption, never skipped.

mod format;
mod key;
mod merge;
mod reader;
mod sparse;
mod writer;

use std::io;

use thiserror::Error;

pub use format::{encode_record, parse_record};
pub use key::StoreKey;
pub use merge::merge_segments;
pub use reader::SegmentReader;
pub use sparse::{ScanWindow, SparseIndex};
pub use writer::SegmentWriter;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// A line failed to parse into exactly one key/value pair. Fatal to the
    /// scan or merge that encountered it.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    /// A stored key did not decode as the segment's key type.
    #[error("key type mismatch: {0}")]
    KeyMismatch(String),
    /// Flushing an empty memtable would produce an empty segment.
    #[error("refusing to flush an empty memtable")]
    EmptyFlush,
}

pub type Result<T> = std::result::Result<T, Error>;
