//! Time related utils.
//!
//! Signature schemes need the signing instant in a couple of fixed string
//! shapes. This module also hosts [`Clock`], the injectable source of that
//! instant.

use std::fmt::Debug;

use chrono::SubsecRound;
use chrono::Utc;

use crate::Error;
use crate::Result;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: `20220301`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format time into ISO8601: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse time from RFC3339.
///
/// All these formats are the same time:
///
/// - `2022-03-13T07:20:04Z`
/// - `2022-03-13T07:20:04+00:00`
/// - `2022-03-13T07:20:04.000+00:00`
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    Ok(chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::unexpected(format!("parse '{s}' into rfc3339 failed")).with_source(e))?
        .with_timezone(&Utc))
}

/// Clock supplies the instant used for signing.
///
/// Signers read the clock once per batch, so every URL produced by one call
/// shares the same date.
pub trait Clock: Debug + Send + Sync + 'static {
    /// Current UTC time with second precision.
    fn now(&self) -> DateTime;
}

/// SystemClock reads the wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        now().trunc_subsecs(0)
    }
}

/// FixedClock always returns the same instant.
///
/// Use it to pin the signing date in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime);

impl FixedClock {
    /// Create a clock frozen at `time`, truncated to whole seconds.
    pub fn new(time: DateTime) -> Self {
        Self(time.trunc_subsecs(0))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime {
        self.0
    }
}
