//! Expiration date calculation
//!
//! Turns a shelf life in days into the wall-clock expiration date the caller
//! should see. Callers describe their zone either as a whole-hour offset
//! (`GMT-5`, `gmt+10`) or as an IANA name (`America/Toronto`). The raw string
//! is parsed once into a [`TimeZoneSpec`]; the calculator only ever sees the
//! parsed form.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

/// Largest whole-hour offset representable as a UTC offset
const MAX_OFFSET_HOURS: i32 = 23;

const SECONDS_PER_HOUR: i32 = 3600;

/// Errors that can occur when resolving a zone or computing an expiration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpirationError {
    /// A `GMT±H` token is malformed
    #[error("Invalid time zone format: '{0}'. Expected GMT followed by a sign and whole hours, e.g. GMT-5")]
    InvalidTimeZoneFormat(String),

    /// A named zone is not in the time zone database
    #[error("Unknown time zone: '{0}'")]
    UnknownTimeZone(String),

    /// The expiration instant falls outside the representable date range
    #[error("Expiration date out of range for a shelf life of {0} days")]
    OutOfRange(u32),
}

/// A caller's time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeZoneSpec {
    /// Whole-hour offset from UTC, no daylight saving
    FixedOffset { hours: i32 },
    /// IANA zone, daylight saving applied at the target instant
    Named(Tz),
}

impl TimeZoneSpec {
    /// Parses a zone descriptor
    ///
    /// Anything starting with `GMT` (any case) must be a well-formed fixed
    /// offset; everything else is looked up as a zone name.
    pub fn parse(raw: &str) -> Result<Self, ExpirationError> {
        let is_gmt = raw
            .get(..3)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("GMT"));

        if is_gmt {
            Self::parse_fixed_offset(raw)
        } else {
            raw.parse::<Tz>()
                .map(TimeZoneSpec::Named)
                .map_err(|_| ExpirationError::UnknownTimeZone(raw.to_string()))
        }
    }

    fn parse_fixed_offset(raw: &str) -> Result<Self, ExpirationError> {
        let invalid = || ExpirationError::InvalidTimeZoneFormat(raw.to_string());

        let rest = &raw[3..];
        let mut chars = rest.chars();
        let sign = match chars.next() {
            Some('+') => 1,
            Some('-') => -1,
            _ => return Err(invalid()),
        };

        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hours: i32 = digits.parse().map_err(|_| invalid())?;
        if hours > MAX_OFFSET_HOURS {
            return Err(invalid());
        }

        Ok(TimeZoneSpec::FixedOffset { hours: sign * hours })
    }
}

impl FromStr for TimeZoneSpec {
    type Err = ExpirationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeZoneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneSpec::FixedOffset { hours } if *hours < 0 => write!(f, "GMT-{}", -hours),
            TimeZoneSpec::FixedOffset { hours } => write!(f, "GMT+{}", hours),
            TimeZoneSpec::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

/// Wall-clock components of an expiration date, formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationDate {
    /// Two-digit month, `"01"`..`"12"`
    pub month: String,
    /// Two-digit day of month
    pub date: String,
    /// Full English weekday name
    pub day_of_week: String,
    /// 12-hour time, e.g. `"07:05 PM"`
    pub time: String,
}

impl ExpirationDate {
    fn from_local<Z>(local: &DateTime<Z>) -> Self
    where
        Z: TimeZone,
        Z::Offset: fmt::Display,
    {
        Self {
            month: local.format("%m").to_string(),
            date: local.format("%d").to_string(),
            day_of_week: local.format("%A").to_string(),
            time: local.format("%I:%M %p").to_string(),
        }
    }
}

/// Computes when something with `shelf_life_days` left expires, as seen in `zone`
pub fn compute_expiration(
    shelf_life_days: u32,
    zone: &TimeZoneSpec,
    now: DateTime<Utc>,
) -> Result<ExpirationDate, ExpirationError> {
    let expiration_utc = expiration_instant(shelf_life_days, now)?;

    let formatted = match zone {
        TimeZoneSpec::FixedOffset { hours } => {
            let offset = FixedOffset::east_opt(hours * SECONDS_PER_HOUR)
                .ok_or_else(|| ExpirationError::InvalidTimeZoneFormat(zone.to_string()))?;
            ExpirationDate::from_local(&expiration_utc.with_timezone(&offset))
        }
        TimeZoneSpec::Named(tz) => ExpirationDate::from_local(&expiration_utc.with_timezone(tz)),
    };

    Ok(formatted)
}

/// The absolute UTC instant `shelf_life_days` after `now`
pub fn expiration_instant(
    shelf_life_days: u32,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ExpirationError> {
    Duration::try_days(i64::from(shelf_life_days))
        .and_then(|shelf_life| now.checked_add_signed(shelf_life))
        .ok_or(ExpirationError::OutOfRange(shelf_life_days))
}
