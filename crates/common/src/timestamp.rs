//! Timestamp utilities.
//!
//! updateinfo documents store dates as decimal Unix timestamps inside
//! attributes, and the JSON output keeps that convention: a timestamp is
//! serialized as a string holding the number of seconds since the epoch.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::{Error, Result};

/// A point in time with whole-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a new timestamp from the current time.
    pub fn now() -> Self {
        Timestamp(Utc::now())
    }

    /// The Unix epoch.
    pub fn epoch() -> Self {
        Timestamp(DateTime::<Utc>::default())
    }

    /// A timestamp the given number of years from now, saturating at the
    /// largest representable date.
    pub fn years_from_now(years: u32) -> Self {
        let Timestamp(now) = Self::now();
        Timestamp(
            now.checked_add_months(Months::new(years.saturating_mul(12)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }

    /// Create a timestamp from seconds since the epoch.
    pub fn from_unix(secs: i64) -> Result<Self> {
        DateTime::from_timestamp(secs, 0)
            .map(Timestamp)
            .ok_or_else(|| Error::InvalidDate {
                value: secs.to_string(),
                reason: "timestamp out of range".to_string(),
            })
    }

    /// Parse a base-10 Unix timestamp such as `1700000000`.
    pub fn parse_unix(value: &str) -> Result<Self> {
        let secs: i64 = value.parse().map_err(|e: std::num::ParseIntError| {
            Error::InvalidDate {
                value: value.to_string(),
                reason: e.to_string(),
            }
        })?;
        Self::from_unix(secs)
    }

    /// Parse a date using a chrono format string.
    ///
    /// The value is tried as a date-time with an offset, then as a naive
    /// date-time taken as UTC, then as a bare date at midnight UTC.
    pub fn parse_with_format(value: &str, format: &str) -> Result<Self> {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(Timestamp(dt.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Timestamp(Utc.from_utc_datetime(&naive)));
        }
        match NaiveDate::parse_from_str(value, format) {
            Ok(date) => date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Timestamp(Utc.from_utc_datetime(&naive)))
                .ok_or_else(|| Error::InvalidDate {
                    value: value.to_string(),
                    reason: "date has no midnight".to_string(),
                }),
            Err(e) => Err(Error::InvalidDate {
                value: value.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Parse a date with an optional format; without one the value must be
    /// a Unix timestamp.
    pub fn parse(value: &str, format: Option<&str>) -> Result<Self> {
        match format {
            Some(format) if !format.is_empty() => Self::parse_with_format(value, format),
            _ => Self::parse_unix(value),
        }
    }

    /// Seconds since the epoch.
    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S +0000 UTC"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.unix().to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a Unix timestamp as a string or integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Timestamp, E> {
        Timestamp::parse_unix(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Timestamp, E> {
        Timestamp::from_unix(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Timestamp, E> {
        let secs = i64::try_from(v).map_err(E::custom)?;
        Timestamp::from_unix(secs).map_err(E::custom)
    }
}
