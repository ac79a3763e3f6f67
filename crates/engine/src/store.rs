use crate::Result;

/// The capability contract shared by every storage backend.
///
/// `write` fails only on an underlying I/O error. `read` never fails for a
/// missing key: absence is the first-class `Ok(None)` result, not an error.
///
/// Requiring `&mut self` for writes puts the single-writer discipline in the
/// type system: concurrent writers have to serialize on ownership of the
/// store before the compiler lets them mutate it.
pub trait Store<K> {
    /// Inserts or updates the value for `key`.
    fn write(&mut self, key: K, value: String) -> Result<()>;

    /// Returns the most recent value written for `key`, or `None`.
    fn read(&self, key: &K) -> Result<Option<String>>;
}
