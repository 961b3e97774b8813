//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions for
//! presenting batch results and resolved schemas in a human-readable format.

use tabled::{Table, Tabled};

use geosink_core::pipeline::LoadOutcome;
use geosink_core::schema::ResolvedSchema;

/// Result of one dataset within a batch run.
pub struct BatchEntry {
    /// Dataset name
    pub dataset: String,
    /// Terminal outcome, or `None` if the dataset never reached the pipeline
    /// (e.g., the file could not be opened)
    pub outcome: Option<LoadOutcome>,
    /// Human-readable failure detail, empty on success
    pub detail: String,
}

impl BatchEntry {
    /// Whether this dataset was fully loaded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.outcome.as_ref().is_some_and(LoadOutcome::is_committed)
    }
}

/// Table row representation for displaying a batch result.
#[derive(Tabled)]
struct OutcomeRow {
    /// Dataset name.
    #[tabled(rename = "Dataset")]
    dataset: String,
    /// Terminal state of the load.
    #[tabled(rename = "Status")]
    status: String,
    /// Rows committed, if any.
    #[tabled(rename = "Rows")]
    rows: String,
    /// Failure detail, if any.
    #[tabled(rename = "Detail")]
    detail: String,
}

/// Display a per-dataset summary of a batch run.
pub fn display_batch_summary(entries: &[BatchEntry]) {
    let rows: Vec<OutcomeRow> = entries
        .iter()
        .map(|entry| {
            let (status, rows) = match &entry.outcome {
                Some(LoadOutcome::Committed { rows }) => ("committed", rows.to_string()),
                Some(LoadOutcome::ProvisioningFailed(_)) => ("provisioning failed", String::new()),
                Some(LoadOutcome::RolledBack(_)) => ("rolled back", String::new()),
                None => ("not attempted", String::new()),
            };
            OutcomeRow {
                dataset: entry.dataset.clone(),
                status: status.to_string(),
                rows,
                detail: entry.detail.clone(),
            }
        })
        .collect();

    let loaded = entries.iter().filter(|e| e.succeeded()).count();
    println!("\nLoaded {loaded} of {} dataset(s):\n", entries.len());

    let table = Table::new(rows).to_string();
    println!("{table}");
}

/// Table row representation for displaying a resolved column.
#[derive(Tabled)]
struct ColumnRow {
    /// Column name.
    #[tabled(rename = "Column")]
    name: String,
    /// PostgreSQL type the column materializes as.
    #[tabled(rename = "Type")]
    sql_type: String,
}

/// Display the resolved schema of a dataset.
pub fn display_resolved_schema(dataset: &str, resolved: &ResolvedSchema) {
    println!("\nDataset: {dataset}");
    println!("Sampled geometries: {}\n", resolved.sample_geometries.len());

    let rows: Vec<ColumnRow> = resolved
        .columns
        .iter()
        .map(|column| ColumnRow {
            name: column.name.clone(),
            sql_type: column.column_type.sql_type(),
        })
        .collect();

    let table = Table::new(rows).to_string();
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_entry_succeeded() {
        let entry = BatchEntry {
            dataset: "roads".to_string(),
            outcome: Some(LoadOutcome::Committed { rows: 10 }),
            detail: String::new(),
        };
        assert!(entry.succeeded());
    }

    #[test]
    fn test_batch_entry_not_attempted() {
        let entry = BatchEntry {
            dataset: "rivers".to_string(),
            outcome: None,
            detail: "file not found".to_string(),
        };
        assert!(!entry.succeeded());
    }
}
