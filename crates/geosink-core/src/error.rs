//! Custom error types for `geosink` operations.
//!
//! This module provides structured error handling using `thiserror`, with
//! domain-specific error kinds that map onto the stages of the loading
//! pipeline. Provisioning and load errors are recovered locally by the
//! orchestrator and surfaced as outcome values; configuration and dataset
//! errors propagate as hard failures for the current dataset.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for `geosink` operations.
///
/// This is the root error type that encompasses all domain-specific errors.
/// It uses `#[error(transparent)]` to delegate display formatting to the
/// underlying error variants.
#[derive(Debug, Error)]
pub enum GeosinkError {
    /// Configuration errors (invalid collision policy, missing geometry column)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Dataset access errors (opening or sampling the local CSV file)
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Table provisioning errors
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// Bulk load errors
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Configuration errors.
///
/// These are fatal to the current dataset's load: nothing is written to the
/// database, and no provisioning is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The collision policy value is not one of the recognized options
    #[error("collision policy '{value}' is not recognized; expected 'fail' or 'replace'")]
    InvalidCollisionPolicy {
        /// The rejected policy value
        value: String,
    },

    /// The dataset has no raw geometry column, so no geometry table can be produced
    #[error("dataset '{path}' has no '{column}' geometry column")]
    MissingGeometryColumn {
        /// Path to the dataset file
        path: PathBuf,
        /// The reserved raw geometry column name that was expected
        column: String,
    },
}

/// Dataset access errors.
///
/// These occur while opening a local dataset file or reading its sample prefix.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Failed to open the dataset file or read its header row
    #[error("failed to open dataset '{path}': {source}")]
    Open {
        /// Path to the dataset file
        path: PathBuf,
        /// The underlying CSV error
        #[source]
        source: csv::Error,
    },

    /// Failed to read rows from the dataset
    #[error("failed to read rows from dataset '{path}': {source}")]
    Read {
        /// Path to the dataset file
        path: PathBuf,
        /// The underlying CSV error
        #[source]
        source: csv::Error,
    },
}

/// Table provisioning errors.
///
/// Provisioning runs its DDL inside one transaction, so any failure here
/// rolls back and leaves no partially-built table behind. The orchestrator
/// converts these into a not-ready outcome rather than propagating them.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The database rejected the provisioning DDL (permissions, existing
    /// table under the `fail` policy, invalid schema, ...)
    #[error("failed to provision table {table}: {source}")]
    Database {
        /// Qualified name of the target table
        table: String,
        /// The underlying database error
        #[source]
        source: postgres::Error,
    },
}

/// Bulk load errors.
///
/// Any failure mid-stream rolls back the load transaction, leaving the table
/// in its prior (empty) state. The dataset handle and session remain usable.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The database reported an error during the streaming copy
    #[error("bulk copy into {table} failed: {source}")]
    Database {
        /// Qualified name of the target table
        table: String,
        /// The underlying database error
        #[source]
        source: postgres::Error,
    },

    /// Reading the dataset file failed while streaming it to the server
    #[error("failed to stream dataset '{path}' during bulk copy: {source}")]
    Io {
        /// Path to the dataset file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Results using [`GeosinkError`].
pub type Result<T> = std::result::Result<T, GeosinkError>;
