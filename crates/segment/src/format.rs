//! Record line format: `"<key>: <value>\n"`.
//!
//! Shared by the flush writer, the lookup scan, and the compactor so that
//! every path agrees on what a well-formed record looks like.

use crate::{Error, Result};

/// Formats one record line, trailing newline included.
pub fn encode_record(key_text: &str, value: &str) -> String {
    format!("{}: {}\n", key_text, value)
}

/// Splits a record line into its key text and value.
///
/// The line must contain exactly one `':'`-separated key/value pair;
/// anything else is a fatal [`Error::Corrupt`], never a silent skip. Both
/// sides are trimmed, so the trailing newline and the space after the
/// delimiter are absorbed here.
pub fn parse_record(line: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() != 2 {
        return Err(Error::Corrupt(format!(
            "expected a key value pair separated by a colon, received: {:?}",
            line
        )));
    }
    Ok((parts[0].trim(), parts[1].trim()))
}
