//! `geosink-core` is the core library for the `geosink` project, providing the
//! dataset-to-table loading pipeline for PostgreSQL/PostGIS.
//!
//! This crate includes:
//! - **Dataset Handles**: Access to local CSV datasets with a reserved raw geometry column.
//! - **Schema Resolution**: Sample-based column typing and geometry decoding.
//! - **Table Provisioning**: Transactional creation or replacement of the destination table.
//! - **Bulk Loading**: Single-transaction `COPY FROM STDIN` ingestion of the full dataset.
//!
//! The [`pipeline`] module exposes the per-dataset orchestrator consumed by the CLI
//! and other batch drivers.

pub mod dataset;
pub mod error;
pub mod geometry;
pub mod identifier;
pub mod load;
pub mod pipeline;
pub mod provision;
pub mod schema;

pub use dataset::DatasetHandle;
pub use error::{ConfigError, DatasetError, GeosinkError, LoadError, ProvisionError, Result};
pub use pipeline::{LoadConfig, LoadOutcome, load_dataset};
pub use provision::{CollisionPolicy, TableIdentity};
pub use schema::{ColumnType, ResolvedSchema};
