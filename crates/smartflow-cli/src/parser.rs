use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;

/// Parses a due date such as `tomorrow 9am`, `next friday 17:00`,
/// `2030-12-25 18:30` or an RFC 3339 timestamp. Everything but RFC 3339 is
/// read as wall-clock time in `tz`; slash dates are day first.
pub fn parse_due_date(input: &str, tz: Tz) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input.trim()) {
        return Ok(dt.with_timezone(&Utc));
    }

    let now = Utc::now().with_timezone(&tz);
    parse_date_string(input, now, Dialect::Uk)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Failed to parse due date '{}': {}", input, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rfc3339_passes_through() {
        let parsed = parse_due_date("2030-05-01T08:00:00+02:00", Tz::UTC).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2030, 5, 1, 6, 0, 0).unwrap());
    }

    #[test]
    fn relative_dates_are_in_the_future() {
        let parsed = parse_due_date("tomorrow", chrono_tz::Europe::Paris).unwrap();
        assert!(parsed > Utc::now());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_due_date("not-a-date", Tz::UTC).is_err());
    }
}
