use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

pub fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} contains out-of-range value {value}"))
}

/// All timestamps are stored at fixed millisecond precision with a `Z`
/// suffix. Uniform width keeps lexicographic `ts` comparisons in SQL
/// equivalent to chronological order.
pub fn fmt_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn stored_timestamps_have_uniform_width() {
        let whole = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let fractional = whole + chrono::Duration::milliseconds(250);
        assert_eq!(fmt_datetime(&whole), "2024-03-01T12:00:00.000Z");
        assert_eq!(fmt_datetime(&fractional), "2024-03-01T12:00:00.250Z");
        assert_eq!(
            fmt_datetime(&whole).len(),
            fmt_datetime(&fractional).len()
        );
    }

    #[test]
    fn stored_timestamps_round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let parsed = parse_datetime(&fmt_datetime(&ts), "ts").unwrap();
        assert_eq!(parsed, ts);
    }
}
