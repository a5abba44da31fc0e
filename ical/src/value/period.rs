// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! PERIOD values as defined in RFC 5545 Section 3.3.9.

use std::str::FromStr;

use crate::value::datetime::{DateTimeError, ICalDateTime, parse_date_time};
use crate::value::duration::{Duration, DurationError, parse_duration};
use crate::value::DateFormat;

/// End of a period: an explicit date-time or a duration from the start.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PeriodEnd {
    /// `start/end`
    DateTime(ICalDateTime),
    /// `start/duration`
    Duration(Duration),
}

/// A period of time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Period {
    /// Start of the period.
    pub start: ICalDateTime,
    /// End of the period.
    pub end: PeriodEnd,
}

/// Errors from parsing a PERIOD value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    /// No `/` between start and end.
    #[error("invalid period \"{0}\": missing '/'")]
    MissingSeparator(String),
    /// Start or explicit end is not a date-time.
    #[error(transparent)]
    DateTime(#[from] DateTimeError),
    /// End is not a duration.
    #[error(transparent)]
    Duration(#[from] DurationError),
}

impl Period {
    /// Format as `start/end` or `start/duration`.
    #[must_use]
    pub fn format(&self, format: DateFormat) -> String {
        let end = match &self.end {
            PeriodEnd::DateTime(end) => end.format(format),
            PeriodEnd::Duration(duration) => duration.to_string(),
        };
        format!("{}/{end}", self.start.format(format))
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_period(s)
    }
}

/// Parse a PERIOD value.
///
/// # Errors
/// Returns a [`PeriodError`] if either half is malformed.
pub fn parse_period(value: &str) -> Result<Period, PeriodError> {
    let Some((start, end)) = value.trim().split_once('/') else {
        return Err(PeriodError::MissingSeparator(value.to_string()));
    };
    let start = parse_date_time(start)?;
    let end = if end.trim_start_matches(['+', '-']).starts_with('P') {
        PeriodEnd::Duration(parse_duration(end)?)
    } else {
        PeriodEnd::DateTime(parse_date_time(end)?)
    };
    Ok(Period { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_explicit_and_duration_periods() {
        let period = parse_period("19970101T180000Z/19970102T070000Z").unwrap();
        assert!(matches!(period.end, PeriodEnd::DateTime(_)));
        assert_eq!(period.format(DateFormat::Basic), "19970101T180000Z/19970102T070000Z");

        let period = parse_period("19970101T180000Z/PT5H30M").unwrap();
        assert_eq!(period.end, PeriodEnd::Duration(Duration::new(0, 0, 5, 30, 0)));
        assert_eq!(
            period.format(DateFormat::Extended),
            "1997-01-01T18:00:00Z/PT5H30M"
        );
    }

    #[test]
    fn reports_which_half_failed() {
        assert!(matches!(
            parse_period("19970101T180000Z"),
            Err(PeriodError::MissingSeparator(_))
        ));
        assert!(matches!(
            parse_period("bogus/PT1H"),
            Err(PeriodError::DateTime(_))
        ));
        assert!(matches!(
            parse_period("19970101T180000Z/PXH"),
            Err(PeriodError::Duration(_))
        ));
    }
}
