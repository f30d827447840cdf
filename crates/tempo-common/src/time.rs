//! Tempo Time - Timestamp Parsing
//!
//! Canonical instant handling for the platform. All external date text is
//! funneled through `parse_timestamp`, which either yields a UTC instant or
//! an explicit validation error. There is no fallback to "now" or any other
//! default.
//!
//! @version 0.1.0
//! @author Tempo Development Team

use crate::error::{Result, TempoError};
use chrono::{DateTime, SecondsFormat, Utc};

// =============================================================================
// Parsing
// =============================================================================

/// Parse ISO 8601 / RFC 3339 date-time text into a UTC instant.
///
/// Accepts both the `Z` suffix form and numeric-offset forms; the result is
/// always normalized to UTC. Malformed text is a validation error.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            TempoError::Validation(format!("invalid ISO 8601 timestamp format: {}", text))
        })
}

// =============================================================================
// Formatting
// =============================================================================

/// Serialize an instant back to ISO 8601 text in the `Z` suffix form.
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_utc_z_suffix() {
        let instant = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(instant.timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_parse_numeric_offset() {
        let with_offset = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        let utc = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(with_offset, utc);
        assert_eq!(with_offset.hour(), 0);
    }

    #[test]
    fn test_parse_subsecond_precision() {
        let instant = parse_timestamp("2024-06-15T12:30:45.123Z").unwrap();
        assert_eq!(instant.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("not-a-date"),
            Err(TempoError::Validation(_))
        ));
        assert!(matches!(
            parse_timestamp("2024-13-45T99:00:00Z"),
            Err(TempoError::Validation(_))
        ));
        assert!(matches!(parse_timestamp(""), Err(TempoError::Validation(_))));
    }

    #[test]
    fn test_round_trip_denotes_same_instant() {
        let original = "2024-01-01T05:30:00+05:30";
        let instant = parse_timestamp(original).unwrap();
        let reparsed = parse_timestamp(&format_timestamp(&instant)).unwrap();
        assert_eq!(instant, reparsed);
        assert_eq!(format_timestamp(&instant), "2024-01-01T00:00:00Z");
    }
}
