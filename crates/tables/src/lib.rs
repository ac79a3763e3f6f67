//! # Tables
//!
//! A thin tabular layer over plain files: each table is a directory holding
//! a JSON metadata sidecar (`metadata.json`) describing the column schema
//! and a `data.csv` with one row per line. Rows are validated against the
//! declared column types before they are appended.
//!
//! ```text
//! <location>/<table name>/
//!   metadata.json    column names, types, location
//!   data.csv         validated rows, one per line
//! ```

mod metadata;
mod table;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use metadata::{Column, DType, TableMetadata};
pub use table::{create, load, Table};

#[derive(Debug, Error)]
pub enum Error {
    /// Creating a table whose directory already exists.
    #[error("table already exists at location: {0}")]
    TableExists(PathBuf),
    /// A row does not match the declared column schema.
    #[error("row does not match schema: {0}")]
    Schema(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("metadata error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
