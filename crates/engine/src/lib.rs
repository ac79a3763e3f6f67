//! # Engine
//!
//! Storage backends for StrataKV, all speaking the same [`Store`] capability
//! contract: `write(key, value)` and `read(key) -> value | absent`.
//!
//! - [`LsmTree`]: the log-structured-merge engine, an in-memory sorted
//!   buffer flushed to immutable sorted segments with sparse indexes, plus
//!   offline k-way compaction. The interesting backend.
//! - [`HashIndex`]: append-only file with an in-memory key-to-offset map.
//!   Point reads in one seek, but no ordering and no compaction.
//! - [`ScanLog`]: the simplest thing that works. Append lines, read by
//!   scanning the whole file, last write wins.
//!
//! Callers pick a backend through the trait and can swap storage strategy
//! without changing their own code.

pub mod hash_index;
pub mod lsm;
pub mod scan_log;
pub mod store;

use std::io;

use thiserror::Error;

pub use hash_index::HashIndex;
pub use lsm::LsmTree;
pub use scan_log::ScanLog;
pub use store::Store;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Segment(#[from] segment::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
