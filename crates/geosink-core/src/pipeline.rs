//! Per-dataset load orchestration.
//!
//! For one dataset the orchestrator runs schema resolution, table
//! provisioning, and the bulk load in sequence against a shared dataset
//! handle, table identity, collision policy, and database session. Each run
//! moves through resolving, provisioning, and loading; it terminates in one
//! of three states: committed, rolled back, or provisioning failed.
//!
//! Provisioning and load failures are recovered locally into a
//! [`LoadOutcome`] value so one dataset's failure cannot block the rest of a
//! batch; configuration and dataset-access errors propagate as hard errors.
//! The orchestrator never retries; a batch driver above it may re-invoke it
//! per dataset.

use postgres::Client;
use tracing::{error, info};

use crate::dataset::DatasetHandle;
use crate::error::{LoadError, ProvisionError, Result};
use crate::load::bulk_load;
use crate::provision::{CollisionPolicy, TableIdentity, provision_table};
use crate::schema::resolve_schema;

/// Destination settings for one load, constructed once by the driver and
/// passed by parameter; there is no process-wide configuration state.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Target schema name
    pub schema: String,
    /// Desired table name (normalized during provisioning)
    pub table: String,
    /// Behavior when the table already exists
    pub policy: CollisionPolicy,
}

/// Terminal state of one dataset's load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The bulk load committed
    Committed {
        /// Rows written to the destination table
        rows: u64,
    },
    /// Provisioning failed; the bulk load was never attempted
    ProvisioningFailed(ProvisionError),
    /// The bulk load failed and was rolled back; the table is empty
    RolledBack(LoadError),
}

impl LoadOutcome {
    /// Whether the dataset was fully loaded.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, LoadOutcome::Committed { .. })
    }
}

/// Load one dataset into its destination table.
///
/// Runs schema resolution, provisioning, and (only if provisioning signaled
/// ready) the bulk load. Provisioning and load failures are reported and
/// returned inside the [`LoadOutcome`]; the session remains usable either
/// way.
///
/// # Errors
///
/// Returns an error only for configuration problems (missing geometry
/// column) or dataset-access failures during the sample read. Database-side
/// failures are carried in the outcome instead.
pub fn load_dataset(
    client: &mut Client,
    dataset: &DatasetHandle,
    config: &LoadConfig,
) -> Result<LoadOutcome> {
    let resolved = resolve_schema(dataset)?;
    let identity = TableIdentity::new(&config.schema, &config.table);

    info!(
        "Loading dataset {} into {identity} ({} columns)",
        dataset.path().display(),
        resolved.columns.len()
    );

    if let Err(cause) = provision_table(client, &resolved, &identity, config.policy) {
        error!("Provisioning failed for {identity}: {cause}");
        return Ok(LoadOutcome::ProvisioningFailed(cause));
    }

    match bulk_load(client, dataset, &identity) {
        Ok(rows) => Ok(LoadOutcome::Committed { rows }),
        Err(cause) => {
            error!("Bulk load failed for {identity}, rolled back: {cause}");
            Ok(LoadOutcome::RolledBack(cause))
        },
    }
}
