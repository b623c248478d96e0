//! Time sources and timestamp formatting
//!
//! Provides the `Clock` abstraction a logger reads record times from, and
//! the configurable formats used for the synthesized timestamp group.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Source of record timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock time in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTime;

impl Clock for RealTime {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use context_logger::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let t = Utc.with_ymd_and_hms(1991, 8, 25, 20, 57, 8).unwrap();
/// assert_eq!(TimestampFormat::Rfc3339Auto.format(&t), "1991-08-25T20:57:08Z");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// RFC 3339 in UTC with only as many fractional digits as needed:
    /// `2025-01-08T10:30:45.123456Z`, `2025-01-08T10:30:45Z`
    #[default]
    Rfc3339Auto,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Custom strftime format
    ///
    /// An invalid format string is rejected by [`TimestampFormat::validate`]
    /// and falls back to [`TimestampFormat::Rfc3339Auto`] when formatting.
    Custom(String),
}

impl TimestampFormat {
    /// Format a `DateTime<Utc>` according to this format
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Rfc3339Auto => datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut out = String::new();
                match write!(out, "{}", datetime.format(format_str)) {
                    Ok(()) => out,
                    Err(_) => datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                }
            }
        }
    }

    /// Reject custom formats chrono cannot render
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(format_str) = self {
            if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "TimestampFormat",
                    format!("invalid strftime format '{}'", format_str),
                ));
            }
        }
        Ok(())
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixMicros
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_rfc3339_auto_format() {
        let format = TimestampFormat::Rfc3339Auto;
        assert_eq!(format.format(&fixed_datetime()), "2025-01-08T10:30:45.123456Z");

        let whole = Utc.with_ymd_and_hms(1991, 8, 25, 20, 57, 8).unwrap();
        assert_eq!(format.format(&whole), "1991-08-25T20:57:08Z");
    }

    #[test]
    fn test_iso8601_format() {
        let format = TimestampFormat::Iso8601;
        assert_eq!(format.format(&fixed_datetime()), "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_unix_micros_format() {
        let format = TimestampFormat::UnixMicros;
        let parsed: i64 = format.format(&fixed_datetime()).parse().expect("numeric");
        assert_eq!(parsed, fixed_datetime().timestamp_micros());
        assert!(format.is_numeric());
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y/%m/%d %H:%M".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025/01/08 10:30");
    }

    #[test]
    fn test_invalid_custom_format() {
        let format = TimestampFormat::Custom("%Q".to_string());
        assert!(matches!(
            format.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert_eq!(format.format(&fixed_datetime()), "2025-01-08T10:30:45.123456Z");

        assert!(TimestampFormat::Custom("%Y-%m-%d".to_string()).validate().is_ok());
        assert!(TimestampFormat::Iso8601.validate().is_ok());
    }

    #[test]
    fn test_default_format() {
        assert_eq!(TimestampFormat::default(), TimestampFormat::Rfc3339Auto);
    }

    #[test]
    fn test_deserialization() {
        let format: TimestampFormat =
            serde_json::from_str(r#"{"Custom":"%Y-%m-%d"}"#).expect("deserialize Custom");
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
    }

    #[test]
    fn test_clocks() {
        let fixed = FixedClock(fixed_datetime());
        assert_eq!(fixed.now(), fixed_datetime());

        let before = Utc::now();
        let now = RealTime.now();
        assert!(now >= before);
    }
}
