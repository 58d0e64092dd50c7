// Duration strings as used by the Gemini API ("86400s", "0.5s")
// Author: kelexine (https://github.com/kelexine)

use crate::error::{AppError, Result};
use std::time::Duration;

/// Format a TTL the way the API expects it: whole seconds with an `s` suffix.
pub fn format_ttl(ttl: Duration) -> String {
    format!("{}s", ttl.as_secs())
}

/// Parse a TTL given as `"86400s"`, `"1.5s"` or plain seconds (`"86400"`).
pub fn parse_ttl(input: &str) -> Result<Duration> {
    let trimmed = input.trim();
    let seconds_str = trimmed.strip_suffix('s').unwrap_or(trimmed);

    let seconds: f64 = seconds_str
        .parse()
        .map_err(|_| AppError::InvalidRequest(format!("Invalid TTL '{}'", input)))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(AppError::InvalidRequest(format!(
            "TTL must be a positive number of seconds, got '{}'",
            input
        )));
    }

    Duration::try_from_secs_f64(seconds)
        .map_err(|_| AppError::InvalidRequest(format!("TTL '{}' is out of range", input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ttl() {
        assert_eq!(format_ttl(Duration::from_secs(86400)), "86400s");
        assert_eq!(format_ttl(Duration::from_millis(1500)), "1s");
    }

    #[test]
    fn test_parse_ttl() {
        assert_eq!(parse_ttl("604800s").unwrap().as_secs(), 604800);
        assert_eq!(parse_ttl("300").unwrap().as_secs(), 300);
        assert_eq!(parse_ttl(" 1.5s ").unwrap().as_millis(), 1500);
    }

    #[test]
    fn test_parse_ttl_rejects_garbage() {
        assert!(parse_ttl("").is_err());
        assert!(parse_ttl("tomorrow").is_err());
        assert!(parse_ttl("0s").is_err());
        assert!(parse_ttl("-5").is_err());
        assert!(parse_ttl("NaN").is_err());
    }
}
