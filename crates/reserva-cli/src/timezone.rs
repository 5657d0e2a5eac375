use chrono_tz::Tz;
use std::str::FromStr;

/// Validates that a timezone string is a valid IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, String> {
    Tz::from_str(timezone).map_err(|_| {
        format!("Invalid timezone: '{timezone}'. Use IANA timezone names like 'America/New_York'")
    })
}

/// Normalizes user-entered timezone input, accepting a few common aliases
pub fn normalize_timezone_input(input: &str) -> anyhow::Result<String> {
    let trimmed = input.trim();
    let resolved = match trimmed.to_lowercase().as_str() {
        "utc" | "gmt" => "UTC",
        "est" | "eastern" => "America/New_York",
        "cst" | "central" => "America/Chicago",
        "mst" | "mountain" => "America/Denver",
        "pst" | "pacific" => "America/Los_Angeles",
        _ => trimmed,
    };

    validate_timezone(resolved)
        .map(|_| resolved.to_string())
        .map_err(|e| anyhow::anyhow!(e))
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    // Method 1: Check TZ environment variable
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    // Method 2: Try to read from /etc/timezone (Linux)
    #[cfg(target_os = "linux")]
    {
        if let Ok(tz) = std::fs::read_to_string("/etc/timezone") {
            let tz = tz.trim();
            if validate_timezone(tz).is_ok() {
                return tz.to_string();
            }
        }
    }

    // Method 3: Platform-independent detection
    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    // Fallback to UTC
    "UTC".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_aliases_and_canonical_names() {
        assert_eq!(normalize_timezone_input("utc").unwrap(), "UTC");
        assert_eq!(
            normalize_timezone_input("eastern").unwrap(),
            "America/New_York"
        );
        assert_eq!(
            normalize_timezone_input("Europe/Berlin").unwrap(),
            "Europe/Berlin"
        );
        assert!(normalize_timezone_input("Nowhere/AtAll").is_err());
    }

    #[test]
    fn detection_always_returns_a_valid_zone() {
        let tz = detect_system_timezone();
        assert!(validate_timezone(&tz).is_ok());
    }
}
