//! Destination table provisioning.
//!
//! Provisioning turns a resolved schema into `CREATE TABLE` DDL and executes
//! it under a collision policy. All DDL for one provisioning run executes
//! inside a single transaction, so a failure at any step rolls back and never
//! leaves a partially-built table behind.
//!
//! The decoded geometry column is emitted directly under its reserved output
//! name `the_geom`, typed `geometry(Geometry, 4326)`, so downstream consumers
//! see the original column identity without a separate rename step.

use std::fmt;
use std::str::FromStr;

use postgres::Client;
use tracing::info;

use crate::dataset::GEOMETRY_COLUMN;
use crate::error::{ConfigError, ProvisionError};
use crate::identifier::normalize_identifier;
use crate::schema::ResolvedSchema;

/// Behavior when the destination table already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Raise an error and write nothing
    Fail,
    /// Drop the existing table and create a fresh one
    Replace,
}

impl CollisionPolicy {
    /// The configuration-surface spelling of this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionPolicy::Fail => "fail",
            CollisionPolicy::Replace => "replace",
        }
    }
}

impl FromStr for CollisionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(CollisionPolicy::Fail),
            "replace" => Ok(CollisionPolicy::Replace),
            other => Err(ConfigError::InvalidCollisionPolicy {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualified (schema, table) destination identity.
///
/// The bare table name is normalized to the database identifier limit on
/// construction, so an identity always renders to valid DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdentity {
    schema: String,
    table: String,
}

impl TableIdentity {
    /// Build an identity, normalizing the table name to the identifier limit.
    #[must_use]
    pub fn new(schema: &str, table: &str) -> Self {
        Self {
            schema: schema.to_string(),
            table: normalize_identifier(table),
        }
    }

    /// The schema name.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// The normalized bare table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The quoted, qualified name as it appears in SQL statements.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_identifier(&self.schema), quote_identifier(&self.table))
    }
}

impl fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Double-quote an identifier, escaping embedded quotes.
fn quote_identifier(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

/// Render the `CREATE TABLE` statement for a resolved schema.
///
/// Column order is preserved; the decoded geometry column is emitted under
/// the reserved name [`GEOMETRY_COLUMN`] with its geometry type and CRS.
#[must_use]
pub fn create_table_sql(resolved: &ResolvedSchema, identity: &TableIdentity) -> String {
    let column_defs: Vec<String> = resolved
        .columns
        .iter()
        .enumerate()
        .map(|(position, column)| {
            let name = if position == resolved.geometry_position {
                GEOMETRY_COLUMN
            } else {
                column.name.as_str()
            };
            format!("{} {}", quote_identifier(name), column.column_type.sql_type())
        })
        .collect();

    format!(
        "CREATE TABLE {} ({})",
        identity.qualified(),
        column_defs.join(", ")
    )
}

/// Provision the destination table for a resolved schema.
///
/// Under [`CollisionPolicy::Replace`], any existing table of the same name is
/// dropped first; under [`CollisionPolicy::Fail`], a bare `CREATE TABLE` is
/// issued so a pre-existing table raises with nothing written. The whole run
/// is one transaction: on any error the transaction rolls back and the
/// database is left exactly as it was.
///
/// The created table is empty; the actual data transfer happens separately
/// through the streaming bulk loader.
///
/// # Errors
///
/// Returns a [`ProvisionError::Database`] if any DDL statement is rejected.
pub fn provision_table(
    client: &mut Client,
    resolved: &ResolvedSchema,
    identity: &TableIdentity,
    policy: CollisionPolicy,
) -> Result<(), ProvisionError> {
    let database_error = |source: postgres::Error| ProvisionError::Database {
        table: identity.to_string(),
        source,
    };

    let mut transaction = client.transaction().map_err(database_error)?;

    if policy == CollisionPolicy::Replace {
        transaction
            .batch_execute(&format!("DROP TABLE IF EXISTS {}", identity.qualified()))
            .map_err(database_error)?;
    }

    transaction
        .batch_execute(&create_table_sql(resolved, identity))
        .map_err(database_error)?;

    transaction.commit().map_err(database_error)?;

    info!("Provisioned table {identity} ({policy} policy)");
    Ok(())
}
