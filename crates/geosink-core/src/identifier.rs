//! Database identifier normalization.
//!
//! PostgreSQL truncates identifiers longer than 63 bytes; relying on the
//! server-side truncation makes the final table name surprising, so names are
//! normalized up front to a 62-byte prefix.

use tracing::warn;

/// Maximum byte length of a normalized identifier, one under the PostgreSQL
/// 63-byte identifier limit.
pub const MAX_IDENTIFIER_BYTES: usize = 62;

/// Normalize a raw identifier to fit within the database identifier limit.
///
/// Identifiers of 63 bytes or more are truncated to a prefix of at most
/// [`MAX_IDENTIFIER_BYTES`] bytes, backing off to the nearest UTF-8 character
/// boundary. Shorter identifiers are returned unchanged. Truncation emits an
/// advisory warning; the function is idempotent.
#[must_use]
pub fn normalize_identifier(name: &str) -> String {
    if name.len() <= MAX_IDENTIFIER_BYTES {
        return name.to_string();
    }

    let mut end = MAX_IDENTIFIER_BYTES;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    let truncated = &name[..end];

    warn!("Identifier too long, truncating to '{truncated}'");

    truncated.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_identifier_unchanged() {
        assert_eq!(normalize_identifier("roads"), "roads");
    }

    #[test]
    fn test_exactly_62_bytes_unchanged() {
        let name = "a".repeat(62);
        assert_eq!(normalize_identifier(&name), name);
    }

    #[test]
    fn test_63_bytes_truncated_to_62() {
        let name = "a".repeat(63);
        let normalized = normalize_identifier(&name);
        assert_eq!(normalized.len(), 62);
        assert_eq!(normalized, "a".repeat(62));
    }

    #[test]
    fn test_long_identifier_is_prefix() {
        let name = "dataset_".repeat(20);
        let normalized = normalize_identifier(&name);
        assert!(normalized.len() <= MAX_IDENTIFIER_BYTES);
        assert!(name.starts_with(&normalized));
    }

    #[test]
    fn test_idempotent() {
        let name = "x".repeat(100);
        let once = normalize_identifier(&name);
        let twice = normalize_identifier(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_multibyte_truncates_on_boundary() {
        // 'é' is two bytes, so byte 62 lands exactly on a character
        // boundary: a clean 31-character prefix.
        let name = "é".repeat(40);
        let normalized = normalize_identifier(&name);
        assert_eq!(normalized, "é".repeat(31));
        assert_eq!(normalized.len(), MAX_IDENTIFIER_BYTES);
    }

    #[test]
    fn test_multibyte_backs_off_to_char_boundary() {
        // '€' is three bytes, so 21 of them is 63 bytes and byte 62 falls
        // inside the 21st character; truncation must back off to 60 bytes.
        let name = "€".repeat(21);
        let normalized = normalize_identifier(&name);
        assert_eq!(normalized, "€".repeat(20));
        assert_eq!(normalized.len(), 60);
    }
}
