use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use smartflow_core::error::CoreError;
use smartflow_core::timezone::validate_timezone;

/// Detect system timezone
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if !tz.is_empty() && validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    "UTC".to_string()
}

/// Resolves an IANA name or one of a few common aliases.
pub fn normalize_timezone_input(input: &str) -> Result<Tz, CoreError> {
    if let Ok(tz) = validate_timezone(input) {
        return Ok(tz);
    }

    let normalized = match input.to_lowercase().as_str() {
        "est" | "eastern" => "America/New_York",
        "cst" | "central" => "America/Chicago",
        "mst" | "mountain" => "America/Denver",
        "pst" | "pacific" => "America/Los_Angeles",
        "gmt" | "utc" => "UTC",
        "bst" | "london" => "Europe/London",
        "cet" | "paris" => "Europe/Paris",
        "jst" | "tokyo" => "Asia/Tokyo",
        _ => {
            return Err(CoreError::InvalidTimezone(format!(
                "Unknown timezone '{}'. Use standard IANA names like 'Europe/Paris'",
                input
            )))
        }
    };
    validate_timezone(normalized)
}

/// Wall-clock rendering with the zone abbreviation.
pub fn format_local(datetime: DateTime<Utc>, tz: Tz) -> String {
    datetime
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M %Z")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("paris", chrono_tz::Europe::Paris)]
    #[case("pacific", chrono_tz::America::Los_Angeles)]
    #[case("Asia/Tokyo", chrono_tz::Asia::Tokyo)]
    #[case("utc", chrono_tz::UTC)]
    fn aliases_resolve_to_iana_names(#[case] input: &str, #[case] expected: Tz) {
        assert_eq!(normalize_timezone_input(input).unwrap(), expected);
    }

    #[test]
    fn unknown_zones_are_rejected() {
        assert!(normalize_timezone_input("Mars/Olympus").is_err());
    }

    #[test]
    fn formats_in_the_given_zone() {
        let dt = Utc.with_ymd_and_hms(2030, 7, 1, 12, 0, 0).unwrap();
        assert_eq!(format_local(dt, chrono_tz::Europe::Paris), "2030-07-01 14:00 CEST");
    }
}
