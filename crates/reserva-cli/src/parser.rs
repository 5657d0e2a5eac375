use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_english::{parse_date_string, Dialect};

/// Parse a natural-language or ISO date-time string into a UTC instant
pub fn parse_when(input: &str) -> Result<DateTime<Utc>> {
    parse_date_string(input, Utc::now(), Dialect::Us)
        .map_err(|e| anyhow::anyhow!("Failed to parse time '{}': {}", input, e))
}

/// Parse a weekday name into the 0 = Sunday .. 6 = Saturday numbering used by
/// weekly patterns
pub fn parse_weekday(input: &str) -> Result<i64> {
    let day = match input.trim().to_lowercase().as_str() {
        "sun" | "sunday" | "su" => 0,
        "mon" | "monday" | "m" => 1,
        "tue" | "tuesday" | "tu" => 2,
        "wed" | "wednesday" | "w" => 3,
        "thu" | "thursday" | "th" => 4,
        "fri" | "friday" | "f" => 5,
        "sat" | "saturday" | "sa" => 6,
        _ => {
            return Err(anyhow::anyhow!(
                "Invalid weekday: '{}'\n\nSupported formats:\n  • Full names: 'monday'\n  • Short names: 'mon'\n  • Single letters: 'm,tu,w,th,f,sa,su'",
                input
            ))
        }
    };
    Ok(day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_iso_style_dates() {
        assert!(parse_when("2025-11-04 14:00").is_ok());
        assert!(parse_when("garbage-in").is_err());
    }

    #[test]
    fn parses_relative_dates() {
        let tomorrow = parse_when("tomorrow").unwrap();
        assert!(tomorrow > Utc::now());
    }

    #[rstest]
    #[case("sunday", 0)]
    #[case("Mon", 1)]
    #[case("tue", 2)]
    #[case("w", 3)]
    #[case("THURSDAY", 4)]
    #[case("f", 5)]
    #[case("sat", 6)]
    fn parses_weekday_spellings(#[case] input: &str, #[case] expected: i64) {
        assert_eq!(parse_weekday(input).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_weekdays() {
        assert!(parse_weekday("funday").is_err());
    }
}
