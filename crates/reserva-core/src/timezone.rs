use crate::error::CoreError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Validate an IANA timezone name
pub fn validate_timezone(time_zone: &str) -> Result<(), CoreError> {
    Tz::from_str(time_zone)
        .map(|_| ())
        .map_err(|_| CoreError::InvalidTimezone(time_zone.to_string()))
}

/// Format a UTC instant as a wall-clock string in the given zone
pub fn format_in_zone(
    datetime: DateTime<Utc>,
    time_zone: &str,
    format: &str,
) -> Result<String, CoreError> {
    let tz: Tz = time_zone
        .parse()
        .map_err(|_| CoreError::InvalidTimezone(time_zone.to_string()))?;

    let local_dt = datetime.with_timezone(&tz);
    Ok(local_dt.format(format).to_string())
}

/// The session-time label stored on a pattern, e.g. "14:00"
pub fn wall_clock_label(start_at: DateTime<Utc>, time_zone: &str) -> Result<String, CoreError> {
    format_in_zone(start_at, time_zone, "%H:%M")
}

/// Get timezone abbreviation for display (e.g., "EST", "EDT")
pub fn zone_abbreviation(time_zone: &str, at_time: DateTime<Utc>) -> Result<String, CoreError> {
    format_in_zone(at_time, time_zone, "%Z")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("America/New_York").is_ok());
        assert!(validate_timezone("Invalid/Timezone").is_err());
    }

    #[test]
    fn test_format_in_zone() {
        let noon_utc = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        // New York is UTC-4 in June.
        let local = format_in_zone(noon_utc, "America/New_York", "%H:%M").unwrap();
        assert_eq!(local, "08:00");
    }

    #[test]
    fn test_wall_clock_label() {
        let start = Utc.with_ymd_and_hms(2025, 11, 4, 14, 0, 0).unwrap();
        assert_eq!(wall_clock_label(start, "UTC").unwrap(), "14:00");
        // New York is UTC-5 in November.
        assert_eq!(wall_clock_label(start, "America/New_York").unwrap(), "09:00");
    }

    #[test]
    fn test_zone_abbreviation() {
        let winter = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(zone_abbreviation("UTC", winter).unwrap(), "UTC");
        assert_eq!(zone_abbreviation("America/New_York", winter).unwrap(), "EST");
    }

    #[test]
    fn test_invalid_zone_errors() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        assert!(matches!(
            format_in_zone(now, "Not/AZone", "%H:%M").unwrap_err(),
            CoreError::InvalidTimezone(_)
        ));
    }
}
