//! Timeout validation for configured browser waits

use std::time::Duration;

use crate::ConfigError;

/// Maximum timeout for navigation and network-idle waits (5 minutes)
pub const MAX_NAVIGATION_TIMEOUT_MS: u64 = 300_000;

/// Maximum settling delay or content-readiness wait (30 seconds)
pub const MAX_SETTLE_TIMEOUT_MS: u64 = 30_000;

/// Validate a navigation timeout
///
/// # Example
/// ```ignore
/// let timeout = validate_navigation_timeout("navigation.timeout_ms", 45_000)?;
/// ```
pub fn validate_navigation_timeout(field: &str, ms: u64) -> Result<Duration, ConfigError> {
    if ms == 0 || ms > MAX_NAVIGATION_TIMEOUT_MS {
        return Err(ConfigError::InvalidTimeout(format!(
            "{field} must be between 1ms and {}ms ({} minutes). Received: {}ms ({:.1} minutes)",
            MAX_NAVIGATION_TIMEOUT_MS,
            MAX_NAVIGATION_TIMEOUT_MS / 60_000,
            ms,
            ms as f64 / 60_000.0
        )));
    }

    Ok(Duration::from_millis(ms))
}

/// Validate a settling delay or readiness wait (zero is allowed)
pub fn validate_settle_timeout(field: &str, ms: u64) -> Result<Duration, ConfigError> {
    if ms > MAX_SETTLE_TIMEOUT_MS {
        return Err(ConfigError::InvalidTimeout(format!(
            "{field} cannot exceed {}ms ({} seconds). Received: {}ms ({} seconds)",
            MAX_SETTLE_TIMEOUT_MS,
            MAX_SETTLE_TIMEOUT_MS / 1000,
            ms,
            ms / 1000
        )));
    }

    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_timeout_bounds() {
        assert_eq!(
            validate_navigation_timeout("t", 30_000).unwrap(),
            Duration::from_secs(30)
        );
        assert!(validate_navigation_timeout("t", 0).is_err());
        assert!(validate_navigation_timeout("t", MAX_NAVIGATION_TIMEOUT_MS + 1).is_err());
    }

    #[test]
    fn settle_timeout_allows_zero() {
        assert_eq!(validate_settle_timeout("s", 0).unwrap(), Duration::ZERO);
        let err = validate_settle_timeout("navigation.settle.delay_ms", 60_000).unwrap_err();
        assert!(err.to_string().contains("navigation.settle.delay_ms"));
    }
}
