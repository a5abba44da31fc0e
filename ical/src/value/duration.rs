// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! DURATION values as defined in RFC 5545 Section 3.3.6.

use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::prelude::*;
use jiff::{SignedDuration, Span};

use crate::value::{Extra, number, parse_all};

/// A signed duration of weeks, days, hours, minutes and seconds.
///
/// Fields are kept as written; `P1W2D` is accepted even though RFC 5545 does
/// not combine weeks with other units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Duration {
    /// `false` for durations written with `-`.
    pub positive: bool,
    /// Weeks.
    pub weeks: u32,
    /// Days.
    pub days: u32,
    /// Hours.
    pub hours: u32,
    /// Minutes.
    pub minutes: u32,
    /// Seconds.
    pub seconds: u32,
}

/// Errors from parsing a DURATION value.
///
/// Kept distinct from date-time errors so callers can try one syntax and fall
/// back to the other.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration \"{value}\": {reason}")]
pub struct DurationError {
    /// The rejected text.
    pub value: String,
    /// Parser diagnostics.
    pub reason: String,
}

impl Default for Duration {
    fn default() -> Self {
        Self::new(0, 0, 0, 0, 0)
    }
}

impl Duration {
    /// A positive duration of the given length.
    #[must_use]
    pub const fn new(weeks: u32, days: u32, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            positive: true,
            weeks,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// The same duration pointing the other way.
    #[must_use]
    pub const fn negate(mut self) -> Self {
        self.positive = !self.positive;
        self
    }

    /// Whether every field is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.weeks == 0 && self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    /// Signed length in seconds, counting a day as 24 hours.
    #[must_use]
    pub fn total_seconds(&self) -> i64 {
        let abs = i64::from(self.weeks) * 604_800
            + i64::from(self.days) * 86_400
            + i64::from(self.hours) * 3_600
            + i64::from(self.minutes) * 60
            + i64::from(self.seconds);
        if self.positive { abs } else { -abs }
    }

    /// Exact duration, counting a day as 24 hours.
    #[must_use]
    pub fn to_signed_duration(&self) -> SignedDuration {
        SignedDuration::from_secs(self.total_seconds())
    }

    /// Calendar-aware span, keeping weeks and days as calendar units.
    ///
    /// # Errors
    /// Fails if a field exceeds the range `jiff` supports.
    pub fn to_span(&self) -> Result<Span, jiff::Error> {
        let span = Span::new()
            .try_weeks(i64::from(self.weeks))?
            .try_days(i64::from(self.days))?
            .try_hours(i64::from(self.hours))?
            .try_minutes(i64::from(self.minutes))?
            .try_seconds(i64::from(self.seconds))?;
        Ok(if self.positive { span } else { span.negate() })
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.positive && !self.is_zero() {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        if self.is_zero() {
            return f.write_str("T0S");
        }
        if self.weeks > 0 {
            write!(f, "{}W", self.weeks)?;
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            f.write_str("T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s)
    }
}

/// Parse a DURATION value.
///
/// # Errors
/// Returns a [`DurationError`] describing what did not match.
pub fn parse_duration(value: &str) -> Result<Duration, DurationError> {
    parse_all(duration(), value.trim()).map_err(|reason| DurationError {
        value: value.to_string(),
        reason,
    })
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// dur-value  = (["+"] / "-") "P" (dur-date / dur-time / dur-week)
///
/// dur-date   = dur-day [dur-time]
/// dur-time   = "T" (dur-hour / dur-minute / dur-second)
/// dur-week   = 1*DIGIT "W"
/// dur-hour   = 1*DIGIT "H" [dur-minute]
/// dur-minute = 1*DIGIT "M" [dur-second]
/// dur-second = 1*DIGIT "S"
/// dur-day    = 1*DIGIT "D"
/// ```
pub(crate) fn duration<'src>() -> impl Parser<'src, &'src str, Duration, Extra<'src>> + Clone {
    let unit = |c: char| number().then_ignore(just(c)).or_not();

    let time = just('T')
        .ignore_then(unit('H').then(unit('M')).then(unit('S')))
        .try_map(|((h, m), s), span| {
            if h.is_none() && m.is_none() && s.is_none() {
                Err(Rich::custom(span, "expected hours, minutes or seconds after 'T'"))
            } else {
                Ok((h, m, s))
            }
        })
        .or_not();

    one_of("+-")
        .or_not()
        .then_ignore(just('P'))
        .then(unit('W'))
        .then(unit('D'))
        .then(time)
        .try_map(|(((sign, weeks), days), time), span| {
            if weeks.is_none() && days.is_none() && time.is_none() {
                return Err(Rich::custom(span, "empty duration"));
            }
            let (hours, minutes, seconds) = time.unwrap_or_default();
            Ok(Duration {
                positive: sign != Some('-'),
                weeks: weeks.unwrap_or(0),
                days: days.unwrap_or(0),
                hours: hours.unwrap_or(0),
                minutes: minutes.unwrap_or(0),
                seconds: seconds.unwrap_or(0),
            })
        })
}
