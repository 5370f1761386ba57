use crate::error::CoreError;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone)
        .map_err(|_| CoreError::InvalidTimezone(format!("Invalid timezone: {}", timezone)))
}

/// Resolve a wall-clock time in `tz` to an absolute instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// spring-forward gap move one hour later.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => Some(local.with_timezone(&Utc)),
        None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|local| local.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rejects_unknown_zone() {
        assert!(validate_timezone("Mars/Olympus_Mons").is_err());
        assert!(validate_timezone("Europe/Paris").is_ok());
    }

    #[test]
    fn localizes_paris_winter_time() {
        let naive = NaiveDate::from_ymd_opt(2025, 1, 3)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let utc = localize(naive, chrono_tz::Europe::Paris).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 1, 3, 13, 30, 0).unwrap());
    }

    #[test]
    fn spring_forward_gap_moves_later() {
        // 02:30 does not exist in Paris on 2025-03-30
        let naive = NaiveDate::from_ymd_opt(2025, 3, 30)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let utc = localize(naive, chrono_tz::Europe::Paris).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 3, 30, 1, 30, 0).unwrap());
    }
}
