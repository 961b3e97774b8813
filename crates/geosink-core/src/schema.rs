//! Schema resolution from a sampled dataset read.
//!
//! Resolution reads a small fixed-size prefix of the dataset to determine the
//! column layout, substitutes the raw geometry column in place with a decoded
//! geometry column, and infers a semantic type for every other column from
//! the sampled values. The resolved schema is what table provisioning turns
//! into `CREATE TABLE` DDL.

use csv::StringRecord;
use geo_types::Geometry;
use tracing::debug;

use crate::dataset::{DatasetHandle, GEOMETRY_COLUMN, SAMPLE_ROWS};
use crate::error::{ConfigError, GeosinkError};
use crate::geometry::{SRID, decode_or_empty};

/// Name of the decoded geometry column within a resolved schema.
pub const DECODED_GEOMETRY_COLUMN: &str = "geometry";

/// Semantic type of a resolved column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit integer
    BigInt,
    /// Double-precision float
    DoublePrecision,
    /// Boolean
    Boolean,
    /// Unconstrained text; the fallback when nothing narrower fits
    Text,
    /// PostGIS geometry tagged EPSG:4326
    Geometry,
}

impl ColumnType {
    /// The PostgreSQL type name this column materializes as.
    #[must_use]
    pub fn sql_type(&self) -> String {
        match self {
            ColumnType::BigInt => "bigint".to_string(),
            ColumnType::DoublePrecision => "double precision".to_string(),
            ColumnType::Boolean => "boolean".to_string(),
            ColumnType::Text => "text".to_string(),
            ColumnType::Geometry => format!("geometry(Geometry, {SRID})"),
        }
    }
}

/// A resolved column: name plus semantic type.
#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    /// Column name
    pub name: String,
    /// Inferred semantic type
    pub column_type: ColumnType,
}

/// Ordered column layout derived from a sampled read of one dataset.
///
/// Column ordering matches the input file except for one substitution: the
/// raw geometry column is replaced, at the same position, by a decoded
/// geometry column named [`DECODED_GEOMETRY_COLUMN`]. The decoded sample
/// values are retained; none of them is ever null, since undecodable or
/// missing values are coerced to the empty-geometry sentinel.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    /// Columns in output order
    pub columns: Vec<ResolvedColumn>,
    /// Position of the geometry column within `columns`
    pub geometry_position: usize,
    /// Decoded geometry values from the sample rows
    pub sample_geometries: Vec<Geometry<f64>>,
}

/// Resolve the schema of a dataset from a bounded sample read.
///
/// Reads up to [`SAMPLE_ROWS`] rows, locates the raw geometry column,
/// substitutes it in place with the decoded geometry column, and infers a
/// type for every remaining column from the sampled values.
///
/// # Errors
///
/// Returns [`ConfigError::MissingGeometryColumn`] if the dataset has no
/// raw geometry column, or a [`crate::error::DatasetError`] if the sample
/// cannot be read.
pub fn resolve_schema(dataset: &DatasetHandle) -> Result<ResolvedSchema, GeosinkError> {
    let geometry_position =
        dataset
            .geometry_position()
            .ok_or_else(|| ConfigError::MissingGeometryColumn {
                path: dataset.path().to_path_buf(),
                column: GEOMETRY_COLUMN.to_string(),
            })?;

    let records = dataset.sample(SAMPLE_ROWS)?;

    let sample_geometries = decode_geometry_column(&records, geometry_position);

    let columns = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(position, name)| {
            if position == geometry_position {
                ResolvedColumn {
                    name: DECODED_GEOMETRY_COLUMN.to_string(),
                    column_type: ColumnType::Geometry,
                }
            } else {
                let column_type = infer_column_type(&records, position);
                debug!("Column '{name}' resolved as {column_type:?}");
                ResolvedColumn {
                    name: name.clone(),
                    column_type,
                }
            }
        })
        .collect();

    Ok(ResolvedSchema {
        columns,
        geometry_position,
        sample_geometries,
    })
}

/// Decode every sampled value of the raw geometry column.
///
/// Missing or undecodable values become the empty-geometry sentinel, never
/// null, so downstream typing of the geometry column is deterministic.
#[must_use]
pub fn decode_geometry_column(records: &[StringRecord], position: usize) -> Vec<Geometry<f64>> {
    records
        .iter()
        .map(|record| decode_or_empty(record.get(position)))
        .collect()
}

/// Infer a column's semantic type from its sampled values.
///
/// The narrowest type every non-empty sampled value fits is chosen, in the
/// order bigint, double precision, boolean, text. A column with no non-empty
/// samples falls back to text.
fn infer_column_type(records: &[StringRecord], position: usize) -> ColumnType {
    let values: Vec<&str> = records
        .iter()
        .filter_map(|record| record.get(position))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();

    if values.is_empty() {
        return ColumnType::Text;
    }

    if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        ColumnType::BigInt
    } else if values.iter().all(|v| v.parse::<f64>().is_ok()) {
        ColumnType::DoublePrecision
    } else if values.iter().copied().all(is_boolean_literal) {
        ColumnType::Boolean
    } else {
        ColumnType::Text
    }
}

/// Boolean literals as they appear in CSV exports (`t`/`f` from COPY output,
/// `true`/`false` elsewhere).
fn is_boolean_literal(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "t" | "f" | "true" | "false"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, GeosinkError};
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn open_dataset(dir: &TempDir, content: &str) -> DatasetHandle {
        let path = dir.path().join("dataset.csv");
        let mut file = File::create(&path).unwrap();
        write!(file, "{content}").unwrap();
        DatasetHandle::open(path).unwrap()
    }

    #[test]
    fn test_geometry_column_substituted_in_place() {
        let dir = TempDir::new().unwrap();
        let dataset = open_dataset(
            &dir,
            "cartodb_id,the_geom,name\n1,POINT(0 0),Madrid\n2,POINT(1 1),Sevilla\n",
        );

        let resolved = resolve_schema(&dataset).unwrap();

        assert_eq!(resolved.geometry_position, 1);
        let names: Vec<&str> = resolved.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["cartodb_id", "geometry", "name"]);
        assert_eq!(resolved.columns[1].column_type, ColumnType::Geometry);
    }

    #[test]
    fn test_missing_geometry_column_is_config_error() {
        let dir = TempDir::new().unwrap();
        let dataset = open_dataset(&dir, "id,name\n1,Madrid\n");

        let result = resolve_schema(&dataset);
        assert!(matches!(
            result,
            Err(GeosinkError::Config(
                ConfigError::MissingGeometryColumn { .. }
            ))
        ));
    }

    #[test]
    fn test_sample_geometries_never_null() {
        let dir = TempDir::new().unwrap();
        let dataset = open_dataset(
            &dir,
            "id,the_geom\n1,POINT(0 0)\n2,\n3,not wkt at all\n4,POINT(2 2)\n",
        );

        let resolved = resolve_schema(&dataset).unwrap();

        assert_eq!(resolved.sample_geometries.len(), 4);
        // Undecodable and missing values become the empty sentinel, never null
        assert!(matches!(
            resolved.sample_geometries[1],
            Geometry::GeometryCollection(_)
        ));
        assert!(matches!(
            resolved.sample_geometries[2],
            Geometry::GeometryCollection(_)
        ));
        assert!(matches!(resolved.sample_geometries[0], Geometry::Point(_)));
    }

    #[test]
    fn test_type_inference() {
        let dir = TempDir::new().unwrap();
        let dataset = open_dataset(
            &dir,
            "id,score,active,label,empty,the_geom\n\
             1,1.5,t,abc,,POINT(0 0)\n\
             2,2,false,42,,POINT(1 1)\n",
        );

        let resolved = resolve_schema(&dataset).unwrap();
        let types: Vec<ColumnType> = resolved.columns.iter().map(|c| c.column_type).collect();

        assert_eq!(
            types,
            vec![
                ColumnType::BigInt,
                ColumnType::DoublePrecision,
                ColumnType::Boolean,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Geometry,
            ]
        );
    }

    #[test]
    fn test_sql_type_names() {
        assert_eq!(ColumnType::BigInt.sql_type(), "bigint");
        assert_eq!(ColumnType::Geometry.sql_type(), "geometry(Geometry, 4326)");
    }
}
