//! Timestamp utilities
//!
//! Timestamps are stored as RFC 3339 text in SQLite and written to Pods as
//! `xsd:dateTime` literals. Both use second precision and a `Z` suffix.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::{Error, Result};

/// Current UTC time truncated to whole seconds
///
/// Matches the stored precision, so a value survives a round trip through
/// the database unchanged.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Format a timestamp as RFC 3339 UTC with second precision
pub fn to_rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC 3339 column value back into UTC
pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid timestamp '{}': {}", value, e)))
}

/// Parse an optional column, treating empty text as absent
pub fn parse_optional(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_rfc3339(&v).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rfc3339_uses_z_suffix_and_seconds() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(to_rfc3339(&ts), "2026-03-14T09:26:53Z");
    }

    #[test]
    fn test_parse_accepts_offsets() {
        let ts = parse_rfc3339("2026-03-14T10:26:53+01:00").unwrap();
        assert_eq!(to_rfc3339(&ts), "2026-03-14T09:26:53Z");
    }

    #[test]
    fn test_now_survives_storage_round_trip() {
        let ts = now();
        assert_eq!(parse_rfc3339(&to_rfc3339(&ts)).unwrap(), ts);
    }

    #[test]
    fn test_parse_optional_treats_blank_as_none() {
        assert!(parse_optional(None).unwrap().is_none());
        assert!(parse_optional(Some("  ".to_string())).unwrap().is_none());
        assert!(parse_optional(Some("2026-01-01T00:00:00Z".to_string())).unwrap().is_some());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_rfc3339("yesterday").is_err());
    }
}
