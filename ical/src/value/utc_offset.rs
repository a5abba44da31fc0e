// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! UTC-OFFSET values as defined in RFC 5545 Section 3.3.14.

use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::prelude::*;
use jiff::tz::Offset;

use crate::value::{DateFormat, Extra, digits, parse_all};

/// A UTC offset.
///
/// The sign is kept apart from the magnitude so `-0000` survives a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcOffset {
    /// `false` for offsets written with `-`.
    pub positive: bool,
    /// Hours, 0-23.
    pub hours: u8,
    /// Minutes, 0-59.
    pub minutes: u8,
    /// Seconds, 0-59; written only when non-zero.
    pub seconds: u8,
}

/// Errors from parsing a UTC-OFFSET value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid UTC offset \"{value}\": {reason}")]
pub struct UtcOffsetError {
    /// The rejected text.
    pub value: String,
    /// Parser diagnostics.
    pub reason: String,
}

impl UtcOffset {
    /// Create an offset without seconds.
    #[must_use]
    pub const fn new(positive: bool, hours: u8, minutes: u8) -> Self {
        Self {
            positive,
            hours,
            minutes,
            seconds: 0,
        }
    }

    /// Create an offset from signed seconds east of UTC.
    #[must_use]
    pub fn from_seconds(total: i32) -> Self {
        let abs = total.unsigned_abs();
        Self {
            positive: total >= 0,
            hours: u8::try_from(abs / 3600 % 24).unwrap_or_default(),
            minutes: u8::try_from(abs / 60 % 60).unwrap_or_default(),
            seconds: u8::try_from(abs % 60).unwrap_or_default(),
        }
    }

    /// Signed seconds east of UTC.
    #[must_use]
    pub fn total_seconds(self) -> i32 {
        let abs =
            i32::from(self.hours) * 3600 + i32::from(self.minutes) * 60 + i32::from(self.seconds);
        if self.positive { abs } else { -abs }
    }

    /// Convert to a `jiff` offset.
    ///
    /// # Errors
    /// Fails if the offset is outside the range `jiff` supports.
    pub fn to_offset(self) -> Result<Offset, jiff::Error> {
        Offset::from_seconds(self.total_seconds())
    }

    /// Format as `±HHMM[SS]` or `±HH:MM[:SS]`.
    #[must_use]
    pub fn format(self, format: DateFormat) -> String {
        let sign = if self.positive { '+' } else { '-' };
        let sep = match format {
            DateFormat::Basic => "",
            DateFormat::Extended => ":",
        };
        let mut out = format!("{sign}{:02}{sep}{:02}", self.hours, self.minutes);
        if self.seconds != 0 {
            out.push_str(&format!("{sep}{:02}", self.seconds));
        }
        out
    }
}

impl Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DateFormat::Basic))
    }
}

impl FromStr for UtcOffset {
    type Err = UtcOffsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_utc_offset(s)
    }
}

/// Parse a UTC-OFFSET value in basic or extended form. The sign may be omitted.
///
/// # Errors
/// Returns a [`UtcOffsetError`] describing what did not match.
pub fn parse_utc_offset(value: &str) -> Result<UtcOffset, UtcOffsetError> {
    parse_all(utc_offset(false), value.trim()).map_err(|reason| UtcOffsetError {
        value: value.to_string(),
        reason,
    })
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// utc-offset = time-numzone
///
/// time-numzone = ("+" / "-") time-hour time-minute [time-second]
/// ```
pub(crate) fn utc_offset<'src>(
    sign_required: bool,
) -> impl Parser<'src, &'src str, UtcOffset, Extra<'src>> + Clone {
    let sign = one_of("+-").or_not().try_map(move |sign, span| match sign {
        None if sign_required => Err(Rich::custom(span, "expected '+' or '-'")),
        sign => Ok(sign != Some('-')),
    });
    let sep = just(':').or_not();

    sign.then(digits(2))
        .then_ignore(sep.clone())
        .then(digits(2))
        .then(sep.ignore_then(digits(2)).or_not())
        .try_map(|(((positive, hours), minutes), seconds), span| {
            let seconds = seconds.unwrap_or(0);
            if hours > 23 || minutes > 59 || seconds > 59 {
                return Err(Rich::custom(span, "offset out of range"));
            }
            let narrow = |n: u32| u8::try_from(n).map_err(|_| Rich::custom(span, "offset out of range"));
            Ok(UtcOffset {
                positive,
                hours: narrow(hours)?,
                minutes: narrow(minutes)?,
                seconds: narrow(seconds)?,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    #[test]
    fn parses_offsets() {
        let success_cases = [
            ("+0530",    UtcOffset::new(true, 5, 30)),
            ("-05:00",   UtcOffset::new(false, 5, 0)),
            ("0100",     UtcOffset::new(true, 1, 0)),
            ("-0000",    UtcOffset::new(false, 0, 0)),
            ("+013045",  UtcOffset { positive: true, hours: 1, minutes: 30, seconds: 45 }),
        ];
        for (src, expected) in success_cases {
            assert_eq!(parse_utc_offset(src), Ok(expected), "{src}");
        }
    }

    #[test]
    fn rejects_bad_offsets() {
        for src in ["", "+5", "+0560", "+2500", "+05:3", "UTC", "+05000"] {
            assert!(parse_utc_offset(src).is_err(), "{src}");
        }
    }

    #[test]
    fn negative_zero_round_trips() {
        let offset = parse_utc_offset("-0000").unwrap();
        assert_eq!(offset.to_string(), "-0000");
        assert_eq!(offset.total_seconds(), 0);
    }

    #[test]
    fn formats_and_converts() {
        let offset = UtcOffset::new(false, 3, 30);
        assert_eq!(offset.format(DateFormat::Extended), "-03:30");
        assert_eq!(offset.total_seconds(), -12_600);
        assert_eq!(UtcOffset::from_seconds(-12_600), offset);
        assert_eq!(offset.to_offset().unwrap().seconds(), -12_600);
    }
}
