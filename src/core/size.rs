//! Byte magnitude parsing
//!
//! Converts human-readable size strings ("10G", "512MiB", "500") into byte
//! counts. The multiplier table mirrors the external imaging tool's
//! historical interpretation of these suffixes; the result is only ever used
//! to compare a requested target size against a measured input size when
//! deciding whether a resize needs explicit shrink consent.

use crate::error::SizeError;

/// Suffixes ordered most-specific first so "mib" is never matched as "m".
/// Decimal suffixes multiply by powers of 1000, binary by powers of 1024.
const UNITS: &[(&str, u64)] = &[
    ("kib", 1),
    ("ki", 1),
    ("mib", 1024),
    ("mi", 1024),
    ("mb", 1000),
    ("m", 1000),
    ("gib", 1024 * 1024),
    ("gi", 1024 * 1024),
    ("gb", 1_000_000),
    ("g", 1_000_000),
    ("tib", 1024 * 1024 * 1024),
    ("ti", 1024 * 1024 * 1024),
    ("tb", 1_000_000_000),
    ("t", 1_000_000_000),
];

/// Parse a size string into a byte count.
///
/// Suffix matching is case-insensitive; a bare number is taken as bytes.
pub fn parse_size(value: &str) -> Result<u64, SizeError> {
    let lowered = value.trim().to_ascii_lowercase();

    let invalid = || SizeError {
        value: value.to_string(),
    };

    for (suffix, multiplier) in UNITS {
        if let Some(stripped) = lowered.strip_suffix(suffix) {
            let magnitude: u64 = stripped.trim().parse().map_err(|_| invalid())?;
            return magnitude.checked_mul(*multiplier).ok_or_else(invalid);
        }
    }

    lowered.parse().map_err(|_| invalid())
}
