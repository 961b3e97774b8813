//! Transactional bulk loading via `COPY FROM STDIN`.
//!
//! The whole dataset file streams to the server through a single copy-in
//! command inside one transaction. On success the transaction commits; on any
//! error it rolls back, leaving the table exactly as provisioning left it
//! (empty). The file handle and copy sink are released in both cases.

use std::fs::File;
use std::io;

use postgres::Client;
use tracing::info;

use crate::dataset::DatasetHandle;
use crate::error::LoadError;
use crate::provision::TableIdentity;

/// Stream the full dataset into a provisioned table.
///
/// Issues `COPY <table> FROM STDIN WITH (FORMAT csv, HEADER true)` and pipes
/// the file content through it; the header row is skipped server-side. The
/// target table must already be provisioned with matching columns.
///
/// Returns the number of rows copied.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file cannot be read or the server rejects
/// the copy; in either case the transaction is rolled back and the session is
/// left usable for subsequent operations.
pub fn bulk_load(
    client: &mut Client,
    dataset: &DatasetHandle,
    identity: &TableIdentity,
) -> Result<u64, LoadError> {
    let database_error = |source: postgres::Error| LoadError::Database {
        table: identity.to_string(),
        source,
    };

    let mut file = File::open(dataset.path()).map_err(|source| LoadError::Io {
        path: dataset.path().to_path_buf(),
        source,
    })?;

    // Dropping the transaction without committing rolls the copy back.
    let mut transaction = client.transaction().map_err(database_error)?;

    let copy_sql = format!(
        "COPY {} FROM STDIN WITH (FORMAT csv, HEADER true, DELIMITER ',')",
        identity.qualified()
    );

    info!("Copying dataset {} into {identity}", dataset.path().display());

    let mut sink = transaction
        .copy_in(copy_sql.as_str())
        .map_err(database_error)?;

    io::copy(&mut file, &mut sink).map_err(|source| LoadError::Io {
        path: dataset.path().to_path_buf(),
        source,
    })?;

    let rows = sink.finish().map_err(database_error)?;
    transaction.commit().map_err(database_error)?;

    info!("Copied {rows} rows into {identity}");
    Ok(rows)
}
