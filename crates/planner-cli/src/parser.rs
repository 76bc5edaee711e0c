use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parses a user-supplied date in `timezone`.
///
/// ISO dates (`2025-12-19`, `2025-12-19 09:00`) are read exactly; anything else
/// goes through `chrono-english` ("tomorrow 9am", "next friday").
pub fn parse_due_date(date_str: &str, timezone: Tz) -> Result<DateTime<Utc>> {
    let input = date_str.trim();

    let naive = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });
    if let Some(naive) = naive {
        return timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| anyhow::anyhow!("'{}' does not exist in {}", date_str, timezone));
    }

    parse_date_string(input, Utc::now().with_timezone(&timezone), Dialect::Us)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", date_str, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2025-12-19", "UTC", (2025, 12, 19, 0))]
    #[case("2025-12-19 09:00", "UTC", (2025, 12, 19, 9))]
    #[case("2025-12-19T09:00", "UTC", (2025, 12, 19, 9))]
    #[case("2025-01-15 09:00", "America/New_York", (2025, 1, 15, 14))]
    fn test_iso_dates(#[case] input: &str, #[case] tz: &str, #[case] expected: (i32, u32, u32, u32)) {
        let tz: Tz = tz.parse().unwrap();
        let (y, m, d, h) = expected;
        assert_eq!(
            parse_due_date(input, tz).unwrap(),
            Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_relative_date_is_in_the_future() {
        let parsed = parse_due_date("tomorrow", Tz::UTC).unwrap();
        assert!(parsed > Utc::now());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_due_date("not a date at all", Tz::UTC).is_err());
    }
}
