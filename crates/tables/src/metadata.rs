//! Table metadata: column schema plus where the table lives on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Column data type.
///
/// Serialized as a compact integer alias in the metadata sidecar:
/// text = 0, integer = 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DType {
    Text,
    Integer,
}

impl From<DType> for u8 {
    fn from(dtype: DType) -> u8 {
        match dtype {
            DType::Text => 0,
            DType::Integer => 1,
        }
    }
}

impl TryFrom<u8> for DType {
    type Error = String;

    fn try_from(alias: u8) -> Result<Self, Self::Error> {
        match alias {
            0 => Ok(DType::Text),
            1 => Ok(DType::Integer),
            other => Err(format!("unknown dtype alias: {}", other)),
        }
    }
}

/// Metadata about a single column: just a name and a data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
}

/// Metadata about a table: name, column schema, and the directory the
/// table's folder is created under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<Column>,
    pub location: PathBuf,
}

impl TableMetadata {
    pub fn new<P: AsRef<Path>>(name: &str, columns: Vec<Column>, location: P) -> Self {
        Self {
            name: name.to_string(),
            columns,
            location: location.as_ref().to_path_buf(),
        }
    }

    /// Declared column types, in column order.
    pub fn dtypes(&self) -> Vec<DType> {
        self.columns.iter().map(|c| c.dtype).collect()
    }

    /// Declared column names, in column order.
    pub fn col_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Path of the table's directory.
    pub fn table_path(&self) -> PathBuf {
        self.location.join(&self.name)
    }

    /// Path of the JSON metadata sidecar.
    pub fn metadata_path(&self) -> PathBuf {
        self.table_path().join("metadata.json")
    }

    /// Path of the row data file.
    pub fn data_path(&self) -> PathBuf {
        self.table_path().join("data.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableMetadata {
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
            "/tmp/tables",
        )
    }

    #[test]
    fn dtype_serializes_as_integer_alias() {
        assert_eq!(serde_json::to_string(&DType::Text).unwrap(), "0");
        assert_eq!(serde_json::to_string(&DType::Integer).unwrap(), "1");
    }

    #[test]
    fn dtype_rejects_unknown_alias() {
        assert!(serde_json::from_str::<DType>("7").is_err());
    }

    #[test]
    fn metadata_json_round_trip() {
        let metadata = sample();
        let json = serde_json::to_string(&metadata).unwrap();
        let back: TableMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metadata);
    }

    #[test]
    fn paths_are_rooted_under_location_and_name() {
        let metadata = sample();
        assert_eq!(
            metadata.metadata_path(),
            PathBuf::from("/tmp/tables/test_table/metadata.json")
        );
        assert_eq!(
            metadata.data_path(),
            PathBuf::from("/tmp/tables/test_table/data.csv")
        );
    }

    #[test]
    fn schema_accessors() {
        let metadata = sample();
        assert_eq!(metadata.col_names(), vec!["col_1", "col_2"]);
        assert_eq!(metadata.dtypes(), vec![DType::Text, DType::Integer]);
    }
}
