//! Floating-point timestamp type
//!
//! Model dates are stored as a `DOUBLE` column holding seconds since the Unix
//! epoch (1970-01-01 00:00:00 UTC), fractional part included.
//!
//! ## Invariants
//!
//! - A `Timestamp` is always finite (never NaN or an infinity)
//! - Archiving and un-archiving is lossless: the stored double is the value
//!
//! ```
//! use sds_core::Timestamp;
//!
//! let ts = Timestamp::from_secs_f64(1_700_000_000.0).unwrap();
//! assert_eq!(ts.as_secs_f64(), 1_700_000_000.0);
//! assert!(Timestamp::from_secs_f64(f64::NAN).is_none());
//! ```

use crate::error::DecodeError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since the Unix epoch, always finite
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Unix epoch
    pub const EPOCH: Timestamp = Timestamp(0.0);

    /// The current moment
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Create from seconds since epoch; `None` for non-finite input
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if secs.is_finite() {
            Some(Timestamp(secs))
        } else {
            None
        }
    }

    /// Create from a chrono date, keeping microsecond precision
    pub fn from_datetime(date: DateTime<Utc>) -> Self {
        Timestamp(date.timestamp_micros() as f64 / 1_000_000.0)
    }

    /// Seconds since epoch
    #[inline]
    pub const fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// Convert to a chrono date
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let micros = (self.0 * 1_000_000.0).round();
        if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
            return None;
        }
        Utc.timestamp_micros(micros as i64).single()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::EPOCH
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(date) => write!(f, "{}", date.to_rfc3339()),
            None => write!(f, "{}s", self.0),
        }
    }
}

/// Flatten a timestamp into its stored double
#[inline]
pub fn archive_date(date: Timestamp) -> f64 {
    date.as_secs_f64()
}

/// Read a required timestamp column back, rejecting non-finite values
pub fn required_double_as_date(value: f64, column: &str) -> Result<Timestamp, DecodeError> {
    Timestamp::from_secs_f64(value).ok_or_else(|| DecodeError::InvalidTimestamp {
        column: column.to_string(),
        value,
    })
}
