//! Snapshot timestamp parsing
//!
//! Snapshots written by this crate carry RFC 3339 UTC timestamps. Older
//! snapshots carry offset-less ISO 8601 local times such as
//! `2026-10-15T09:30:00.123456`; those are read in the local zone.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// RFC 3339, else naive ISO 8601 interpreted as local time
pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let naive: NaiveDateTime = raw.parse()?;
    Ok(Local
        .from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| naive.and_utc(), |ts| ts.with_timezone(&Utc)))
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|err| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rfc3339_offsets_are_normalized_to_utc() {
        let ts = parse("2026-10-15T11:30:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn naive_timestamps_are_local_time() {
        let ts = parse("2026-10-15T09:30:00.123456").unwrap();
        let naive = NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_micro_opt(9, 30, 0, 123_456)
            .unwrap();
        assert_eq!(ts.with_timezone(&Local).naive_local(), naive);
    }

    #[test]
    fn whole_second_naive_timestamps_parse() {
        assert!(parse("2026-10-15T09:30:00").is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse("yesterday").is_err());
        assert!(parse("").is_err());
    }
}
