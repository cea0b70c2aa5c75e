//! Expiry durations: numeric millisecond offsets or shorthand strings
//! such as `"1m"`, `"2 hours"` or `"-10s"`.

use thiserror::Error;

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = SECOND * 60.0;
const HOUR: f64 = MINUTE * 60.0;
const DAY: f64 = HOUR * 24.0;
const WEEK: f64 = DAY * 7.0;
const YEAR: f64 = DAY * 365.25;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("E_INVALID_DURATION: empty duration")]
    Empty,

    #[error("E_INVALID_DURATION: invalid number in duration {0:?}")]
    InvalidNumber(String),

    #[error("E_INVALID_DURATION: unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { input: String, unit: String },

    #[error("E_INVALID_DURATION: duration {0:?} is out of range")]
    OutOfRange(String),
}

/// A signed offset from "now", in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpiryOffset(i64);

impl ExpiryOffset {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Absolute timestamp `now_ms + offset`, clamped to the `u64` range.
    pub fn after(self, now_ms: u64) -> u64 {
        if self.0 >= 0 {
            now_ms.saturating_add(self.0 as u64)
        } else {
            now_ms.saturating_sub(self.0.unsigned_abs())
        }
    }
}

/// Parse a duration string into a millisecond offset.
///
/// Accepts an optionally signed decimal number followed by an optional unit
/// (`ms`, `s`, `m`, `h`, `d`, `w`, `y` or their long forms, case-insensitive).
/// A bare number is milliseconds.
pub fn parse_duration(input: &str) -> Result<ExpiryOffset, DurationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }

    let split = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| DurationError::InvalidNumber(input.to_string()))?;

    let unit = unit.trim().to_ascii_lowercase();
    let factor = match unit.as_str() {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => SECOND,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR,
        "d" | "day" | "days" => DAY,
        "w" | "week" | "weeks" => WEEK,
        "y" | "yr" | "yrs" | "year" | "years" => YEAR,
        _ => {
            return Err(DurationError::UnknownUnit {
                input: input.to_string(),
                unit,
            })
        }
    };

    let millis = (value * factor).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(DurationError::OutOfRange(input.to_string()));
    }

    Ok(ExpiryOffset(millis as i64))
}

/// How long a signed URL stays valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpiresIn {
    /// Offset in milliseconds; negative values are already expired
    Millis(i64),
    /// Shorthand such as `"30m"`
    Text(String),
}

impl ExpiresIn {
    pub fn offset(&self) -> Result<ExpiryOffset, DurationError> {
        match self {
            Self::Millis(ms) => Ok(ExpiryOffset::from_millis(*ms)),
            Self::Text(text) => parse_duration(text),
        }
    }

    /// Absolute expiry timestamp relative to `now_ms`.
    pub fn resolve(&self, now_ms: u64) -> Result<u64, DurationError> {
        Ok(self.offset()?.after(now_ms))
    }
}

impl From<i64> for ExpiresIn {
    fn from(ms: i64) -> Self {
        Self::Millis(ms)
    }
}

impl From<std::time::Duration> for ExpiresIn {
    fn from(d: std::time::Duration) -> Self {
        Self::Millis(i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
    }
}

impl From<&str> for ExpiresIn {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ExpiresIn {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
