//! Parsing of gateway expiry timestamps and TTL computation.
//!
//! The v1 gateway reports token expiry as a naive `YYYY-MM-DD HH:MM:SS`
//! string in Western Indonesian Time (a fixed UTC+7 offset). The v2 login
//! API uses RFC 3339 with an explicit offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Offset the gateway's naive timestamps are expressed in.
pub const GATEWAY_UTC_OFFSET_SECONDS: i32 = 7 * 3600;

const GATEWAY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Error returned when an expiry timestamp cannot be interpreted.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid expiry timestamp {value:?}: {reason}")]
pub struct ExpiryError {
    /// The raw value received from the gateway.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Parse a v1 `"YYYY-MM-DD HH:MM:SS"` timestamp as UTC+7.
///
/// # Examples
///
/// ```
/// use wappin_core::expiry::parse_gateway_datetime;
///
/// let expires_at = parse_gateway_datetime("2020-12-28 10:20:23").unwrap();
/// assert_eq!(expires_at.to_rfc3339(), "2020-12-28T03:20:23+00:00");
/// ```
pub fn parse_gateway_datetime(value: &str) -> Result<DateTime<Utc>, ExpiryError> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), GATEWAY_DATETIME_FORMAT).map_err(|e| {
        ExpiryError {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })?;

    FixedOffset::east_opt(GATEWAY_UTC_OFFSET_SECONDS)
        .and_then(|offset| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ExpiryError {
            value: value.to_string(),
            reason: "not representable at UTC+7".to_string(),
        })
}

/// Parse an RFC 3339 timestamp such as `2024-05-01T10:00:00+07:00`.
pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, ExpiryError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ExpiryError {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Time left until `expires_at`, truncated to whole seconds.
///
/// A timestamp at or before `now` yields a zero duration.
pub fn ttl_until(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> std::time::Duration {
    let remaining: Duration = expires_at - now;
    u64::try_from(remaining.num_seconds())
        .map(std::time::Duration::from_secs)
        .unwrap_or(std::time::Duration::ZERO)
}
