//! Geometry decoding for raw dataset values.
//!
//! The raw geometry column carries either Well-Known Text or hex-encoded
//! (E)WKB, depending on how the hosted store serialized it. Values are
//! decoded into [`geo_types::Geometry`] tagged with CRS EPSG:4326; anything
//! that fails to decode is coerced to an explicit empty-geometry sentinel so
//! the column never contains nulls.

use geo_types::{Geometry, GeometryCollection};
use geozero::ToGeo;
use geozero::wkb::Ewkb;
use geozero::wkt::WktStr;
use tracing::warn;

/// Coordinate reference system of all geometry values (WGS 84).
pub const SRID: i32 = 4326;

/// The empty-geometry sentinel substituted for missing or undecodable values.
///
/// Renders as `GEOMETRYCOLLECTION EMPTY`, which PostGIS accepts for any
/// geometry-typed column.
#[must_use]
pub fn empty_geometry() -> Geometry<f64> {
    Geometry::GeometryCollection(GeometryCollection::default())
}

/// Decode a raw geometry value from WKT or hex-encoded (E)WKB.
///
/// Hex WKB is tried first since a hex string is never valid WKT; anything
/// else falls through to the WKT parser. Returns `None` for empty or
/// undecodable input.
#[must_use]
pub fn decode_geometry(raw: &str) -> Option<Geometry<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(bytes) = hex::decode(trimmed)
        && let Ok(geometry) = Ewkb(bytes).to_geo()
    {
        return Some(geometry);
    }

    WktStr(trimmed).to_geo().ok()
}

/// Decode a raw geometry value, substituting the empty-geometry sentinel for
/// missing or undecodable input.
///
/// Fallbacks are logged at warning level so malformed source rows are visible
/// without failing the load.
#[must_use]
pub fn decode_or_empty(raw: Option<&str>) -> Geometry<f64> {
    match raw {
        Some(value) => decode_geometry(value).unwrap_or_else(|| {
            warn!("Undecodable geometry value, substituting empty geometry");
            empty_geometry()
        }),
        None => empty_geometry(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // POINT(1 2) as little-endian WKB
    const POINT_1_2_WKB: &str = "0101000000000000000000F03F0000000000000040";

    #[test]
    fn test_decode_wkt_point() {
        let geometry = decode_geometry("POINT(1 2)").unwrap();
        match geometry {
            Geometry::Point(p) => {
                assert_eq!(p.x(), 1.0);
                assert_eq!(p.y(), 2.0);
            },
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_hex_wkb_point() {
        let geometry = decode_geometry(POINT_1_2_WKB).unwrap();
        match geometry {
            Geometry::Point(p) => {
                assert_eq!(p.x(), 1.0);
                assert_eq!(p.y(), 2.0);
            },
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_wkt_polygon() {
        let geometry = decode_geometry("POLYGON((0 0,4 0,4 4,0 4,0 0))").unwrap();
        assert!(matches!(geometry, Geometry::Polygon(_)));
    }

    #[test]
    fn test_decode_invalid_returns_none() {
        assert!(decode_geometry("not a geometry").is_none());
        assert!(decode_geometry("").is_none());
        assert!(decode_geometry("   ").is_none());
    }

    #[test]
    fn test_decode_or_empty_substitutes_sentinel() {
        let missing = decode_or_empty(None);
        let invalid = decode_or_empty(Some("garbage"));

        for geometry in [missing, invalid] {
            match geometry {
                Geometry::GeometryCollection(gc) => assert!(gc.is_empty()),
                other => panic!("expected empty collection, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_or_empty_passes_valid_through() {
        let geometry = decode_or_empty(Some("POINT(3 4)"));
        assert!(matches!(geometry, Geometry::Point(_)));
    }
}
