//! Local dataset handles.
//!
//! A dataset is a comma-separated file with a header row, produced by the
//! retrieval collaborator (a `COPY ... TO stdout` export of the hosted
//! table). One column, named [`GEOMETRY_COLUMN`], holds the raw encoded
//! geometry; every other column is scalar and passes through unchanged.

use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::error::DatasetError;

/// Reserved name of the raw geometry column in the input file.
pub const GEOMETRY_COLUMN: &str = "the_geom";

/// Number of rows read when sampling a dataset for schema resolution.
pub const SAMPLE_ROWS: usize = 10;

/// Handle to a local columnar dataset file.
///
/// Opening a handle reads only the header row; the full dataset is not
/// materialized. The handle is consumed by schema resolution (which reads a
/// bounded sample) and by the bulk loader (which streams the whole file).
#[derive(Debug, Clone)]
pub struct DatasetHandle {
    /// Path to the CSV file
    path: PathBuf,
    /// Column names in file order
    columns: Vec<String>,
}

impl DatasetHandle {
    /// Open a dataset file and capture its column order from the header row.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError::Open`] if the file cannot be opened or its
    /// header row cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let path = path.into();

        let mut reader = csv::Reader::from_path(&path).map_err(|source| DatasetError::Open {
            path: path.clone(),
            source,
        })?;

        let columns = reader
            .headers()
            .map_err(|source| DatasetError::Open {
                path: path.clone(),
                source,
            })?
            .iter()
            .map(ToString::to_string)
            .collect();

        Ok(Self { path, columns })
    }

    /// Path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column names in file order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of the raw geometry column, if present.
    #[must_use]
    pub fn geometry_position(&self) -> Option<usize> {
        self.columns.iter().position(|c| c == GEOMETRY_COLUMN)
    }

    /// Read up to `rows` data rows from the start of the file.
    ///
    /// Used by schema resolution to determine column types without
    /// materializing the full dataset.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError::Read`] if a row cannot be parsed.
    pub fn sample(&self, rows: usize) -> Result<Vec<StringRecord>, DatasetError> {
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|source| DatasetError::Open {
                path: self.path.clone(),
                source,
            })?;

        let mut records = Vec::with_capacity(rows);
        for record in reader.records().take(rows) {
            let record = record.map_err(|source| DatasetError::Read {
                path: self.path.clone(),
                source,
            })?;
            records.push(record);
        }

        Ok(records)
    }
}
