// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Typed value codecs for iCalendar property values.
//!
//! This module handles the parsing and formatting of the value types defined
//! in RFC 5545 Section 3.3 that need more than text handling: dates and
//! date-times, durations, periods, UTC offsets and recurrence rules.

mod datetime;
mod duration;
mod period;
mod rrule;
mod utc_offset;

pub use datetime::{DateTimeError, ICalDateTime, Zone, parse_date_time};
pub use duration::{Duration, DurationError, parse_duration};
pub use period::{Period, PeriodEnd, PeriodError, parse_period};
pub use rrule::{RecurParts, Recurrence, RecurrenceFrequency, WeekDay, WeekDayNum};
pub use utc_offset::{UtcOffset, UtcOffsetError, parse_utc_offset};

use chumsky::prelude::*;

/// How dates and times are written.
///
/// The text syntax uses the basic form (`20240315T093000Z`), xCal and jCal
/// use the extended form (`2024-03-15T09:30:00Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateFormat {
    /// `YYYYMMDD`, `HHMMSS`, `+HHMM`
    #[default]
    Basic,
    /// `YYYY-MM-DD`, `HH:MM:SS`, `+HH:MM`
    Extended,
}

pub(crate) type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Exactly `n` ASCII digits.
pub(crate) fn digits<'src>(n: usize) -> impl Parser<'src, &'src str, u32, Extra<'src>> + Clone {
    select! { c @ '0'..='9' => c }
        .repeated()
        .exactly(n)
        .collect::<String>()
        .try_map(|str, span| {
            lexical::parse::<u32, _>(&str).map_err(|_| Rich::custom(span, "expected digits"))
        })
}

/// One or more ASCII digits fitting in a `u32`.
pub(crate) fn number<'src>() -> impl Parser<'src, &'src str, u32, Extra<'src>> + Clone {
    select! { c @ '0'..='9' => c }
        .repeated()
        .at_least(1)
        .at_most(10) // u32 max is 10 digits: 4_294_967_295
        .collect::<String>()
        .try_map(|str, span| {
            lexical::parse::<u32, _>(&str).map_err(|_| Rich::custom(span, "number out of range"))
        })
}

/// Run a parser over the whole input, joining diagnostics into one message.
pub(crate) fn parse_all<'src, T>(
    parser: impl Parser<'src, &'src str, T, Extra<'src>>,
    src: &'src str,
) -> Result<T, String> {
    parser
        .then_ignore(end())
        .parse(src)
        .into_result()
        .map_err(|errs| {
            errs.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        })
}
