//! Lenient timestamp and date parsing for snapshot fields.
//!
//! Snapshots written by the dashboard backend store naive UTC timestamps
//! (`2024-06-01T09:30:00.123456`), while hand-written ones tend to use RFC 3339 or
//! bare dates. Every form is accepted; naive values are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse RFC 3339, a naive date-time (as UTC), or a bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// Parse a calendar date, dropping the time part of any timestamp form.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|ts| ts.date_naive())
}

/// `deserialize_with` helper for optional timestamps.
pub fn opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_timestamp(&raw)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
        })
        .transpose()
}

/// `deserialize_with` helper for optional calendar dates.
pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date '{raw}'")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_forms() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-06-01T00:00:00Z"), Some(midnight));
        assert_eq!(parse_timestamp("2024-06-01T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-06-01T00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-06-01 00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-06-01"), Some(midnight));
        assert!(parse_timestamp("2024-06-01T09:30:00.123456").is_some());
        assert_eq!(parse_timestamp("soon"), None);
    }

    #[test]
    fn test_date_drops_time() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(parse_date("2024-06-01T18:45:00"), d);
        assert_eq!(parse_date("2024-06-01"), d);
    }

    #[derive(Deserialize)]
    struct Doc {
        #[serde(default, deserialize_with = "opt_timestamp")]
        at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "opt_date")]
        on: Option<NaiveDate>,
    }

    #[test]
    fn test_helpers_accept_null_and_missing() {
        let doc: Doc = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert_eq!((doc.at, doc.on), (None, None));
        assert!(serde_json::from_str::<Doc>(r#"{"on": "june"}"#).is_err());
    }
}
