//! Timestamp handling for the TriMet web service.
//!
//! TriMet reports instants (query time, scheduled and estimated arrivals,
//! detour windows) as milliseconds since the Unix epoch. This module turns
//! them into timezone-aware UTC instants; converting to Portland local time
//! is left to the caller.

use chrono::{DateTime, Utc};

/// Error returned when an epoch-milliseconds value can't be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    /// The value is not a number.
    #[error("not a millisecond timestamp: {0:?}")]
    NotANumber(String),

    /// The value is a number, but outside the range chrono can represent.
    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
}

/// Parse a "milliseconds since epoch" attribute value.
///
/// Empty input and a zero value both mean "no time given" and return
/// `Ok(None)`. Fractional milliseconds are kept to microsecond precision.
///
/// # Examples
///
/// ```
/// use trimet_client::domain::parse_epoch_millis;
///
/// let t = parse_epoch_millis("1300000000000").unwrap().unwrap();
/// assert_eq!(t.timestamp(), 1_300_000_000);
///
/// assert_eq!(parse_epoch_millis("").unwrap(), None);
/// assert_eq!(parse_epoch_millis("0").unwrap(), None);
/// assert!(parse_epoch_millis("soon").is_err());
/// ```
pub fn parse_epoch_millis(s: &str) -> Result<Option<DateTime<Utc>>, TimestampError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    if let Ok(millis) = s.parse::<i64>() {
        if millis == 0 {
            return Ok(None);
        }
        return DateTime::from_timestamp_millis(millis)
            .map(Some)
            .ok_or_else(|| TimestampError::OutOfRange(s.to_string()));
    }

    let millis: f64 = s
        .parse()
        .map_err(|_| TimestampError::NotANumber(s.to_string()))?;

    if !millis.is_finite() {
        return Err(TimestampError::NotANumber(s.to_string()));
    }
    if millis == 0.0 {
        return Ok(None);
    }

    let micros = (millis * 1000.0).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return Err(TimestampError::OutOfRange(s.to_string()));
    }

    DateTime::from_timestamp_micros(micros as i64)
        .map(Some)
        .ok_or_else(|| TimestampError::OutOfRange(s.to_string()))
}

/// Parse an optional attribute, treating a missing attribute as "no time".
pub fn parse_optional_epoch_millis(
    s: Option<&str>,
) -> Result<Option<DateTime<Utc>>, TimestampError> {
    match s {
        Some(s) => parse_epoch_millis(s),
        None => Ok(None),
    }
}
