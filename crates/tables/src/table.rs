//! Table creation, loading, and row-level access.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::metadata::{DType, TableMetadata};
use crate::{Error, Result};

/// Creates a table folder with its metadata sidecar and an empty data file.
///
/// The folder layout is `<location>/<name>/` containing `metadata.json`
/// (the serialized [`TableMetadata`], which tells later readers how to
/// interpret the data file) and an empty `data.csv`.
///
/// # Errors
///
/// Returns [`Error::TableExists`] if the table folder already exists.
pub fn create(metadata: &TableMetadata) -> Result<()> {
    let table_path = metadata.table_path();
    if table_path.exists() {
        return Err(Error::TableExists(table_path));
    }

    std::fs::create_dir_all(&table_path)?;
    File::create(metadata.data_path())?;

    let sidecar = File::create(metadata.metadata_path())?;
    serde_json::to_writer_pretty(sidecar, metadata)?;
    Ok(())
}

/// Reads a table's metadata sidecar back from disk.
pub fn load<P: AsRef<Path>>(location: P, name: &str) -> Result<TableMetadata> {
    let sidecar = File::open(location.as_ref().join(name).join("metadata.json"))?;
    Ok(serde_json::from_reader(sidecar)?)
}

/// Row-level access to a created table.
///
/// Every insert is validated against the declared schema before it touches
/// the data file, so a scan only ever sees rows with the right shape.
pub struct Table {
    metadata: TableMetadata,
}

impl Table {
    pub fn new(metadata: TableMetadata) -> Self {
        Self { metadata }
    }

    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    /// Checks a row against the declared column schema.
    ///
    /// The row must have one value per column, and every value in an
    /// integer column must parse as an integer.
    fn validate(&self, row: &[String]) -> Result<()> {
        let columns = &self.metadata.columns;
        if row.len() != columns.len() {
            return Err(Error::Schema(format!(
                "expected {} values, received {}",
                columns.len(),
                row.len()
            )));
        }

        for (value, column) in row.iter().zip(columns) {
            if column.dtype == DType::Integer && value.parse::<i64>().is_err() {
                return Err(Error::Schema(format!(
                    "column {:?} expects an integer, received {:?}",
                    column.name, value
                )));
            }
        }
        Ok(())
    }

    /// Validates `row` and appends it to the data file as one CSV line.
    pub fn insert(&self, row: &[String]) -> Result<()> {
        self.validate(row)?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(self.metadata.data_path())?;
        writeln!(file, "{}", row.join(","))?;
        Ok(())
    }

    /// Reads every row back, re-checking each line's shape against the
    /// schema.
    pub fn scan(&self) -> Result<Vec<Vec<String>>> {
        let file = BufReader::new(File::open(self.metadata.data_path())?);

        let mut rows = Vec::new();
        for line in file.lines() {
            let line = line?;
            let row: Vec<String> = line.split(',').map(str::to_string).collect();
            self.validate(&row)?;
            rows.push(row);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Column;
    use anyhow::Result;
    use tempfile::tempdir;

    fn sample_metadata(location: &Path) -> TableMetadata {
        TableMetadata::new(
            "test_table",
            vec![
                Column {
                    name: "col_1".to_string(),
                    dtype: DType::Text,
                },
                Column {
                    name: "col_2".to_string(),
                    dtype: DType::Integer,
                },
            ],
            location,
        )
    }

    #[test]
    fn create_writes_sidecar_and_empty_data_file() -> Result<()> {
        let dir = tempdir()?;
        let metadata = sample_metadata(dir.path());

        create(&metadata)?;

        assert!(metadata.metadata_path().exists());
        assert_eq!(std::fs::metadata(metadata.data_path())?.len(), 0);

        let loaded = load(dir.path(), "test_table")?;
        assert_eq!(loaded, metadata);
        Ok(())
    }

    #[test]
    fn create_twice_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let metadata = sample_metadata(dir.path());

        create(&metadata)?;
        let err = create(&metadata).unwrap_err();
        assert!(matches!(err, Error::TableExists(_)));
        Ok(())
    }

    #[test]
    fn insert_and_scan_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let metadata = sample_metadata(dir.path());
        create(&metadata)?;

        let table = Table::new(metadata);
        table.insert(&["alice".to_string(), "30".to_string()])?;
        table.insert(&["bob".to_string(), "-7".to_string()])?;

        let rows = table.scan()?;
        assert_eq!(
            rows,
            vec![
                vec!["alice".to_string(), "30".to_string()],
                vec!["bob".to_string(), "-7".to_string()],
            ]
        );
        Ok(())
    }

    #[test]
    fn insert_rejects_wrong_arity() -> Result<()> {
        let dir = tempdir()?;
        let metadata = sample_metadata(dir.path());
        create(&metadata)?;

        let table = Table::new(metadata);
        let err = table.insert(&["only-one".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));

        assert!(table.scan()?.is_empty()); // nothing was appended
        Ok(())
    }

    #[test]
    fn insert_rejects_non_integer_in_integer_column() -> Result<()> {
        let dir = tempdir()?;
        let metadata = sample_metadata(dir.path());
        create(&metadata)?;

        let table = Table::new(metadata);
        let err = table
            .insert(&["alice".to_string(), "not-a-number".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        Ok(())
    }

    #[test]
    fn text_column_accepts_numeric_text() -> Result<()> {
        let dir = tempdir()?;
        let metadata = sample_metadata(dir.path());
        create(&metadata)?;

        let table = Table::new(metadata);
        table.insert(&["123".to_string(), "456".to_string()])?;
        assert_eq!(table.scan()?.len(), 1);
        Ok(())
    }
}
