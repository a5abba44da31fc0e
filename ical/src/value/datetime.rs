// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! DATE and DATE-TIME values as defined in RFC 5545 Sections 3.3.4 and 3.3.5,
//! in both the basic (`20240101T120000Z`) and extended
//! (`2024-01-01T12:00:00Z`) ISO 8601 forms.

use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::prelude::*;
use jiff::civil::{self, Date, Time};
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};

use crate::value::utc_offset::{UtcOffset, utc_offset};
use crate::value::{DateFormat, Extra, digits, parse_all};

/// Time zone of a date-time value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Zone {
    /// No zone information; local wall-clock time.
    Floating,
    /// Trailing `Z`.
    Utc,
    /// Numeric offset suffix, as allowed by the extended syntaxes.
    Offset(UtcOffset),
    /// Tied to a `TZID` parameter.
    Named(String),
}

/// A DATE or DATE-TIME value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ICalDateTime {
    /// Calendar date.
    pub date: Date,
    /// Time of day, `None` for a DATE value.
    pub time: Option<Time>,
    /// Zone of the time of day; always [`Zone::Floating`] for a DATE value.
    pub zone: Zone,
}

/// Errors from parsing a DATE or DATE-TIME value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date-time \"{value}\": {reason}")]
pub struct DateTimeError {
    /// The rejected text.
    pub value: String,
    /// Parser diagnostics.
    pub reason: String,
}

impl ICalDateTime {
    /// A DATE value.
    #[must_use]
    pub const fn date(date: Date) -> Self {
        Self {
            date,
            time: None,
            zone: Zone::Floating,
        }
    }

    /// A DATE-TIME value with the given zone.
    #[must_use]
    pub fn date_time(date_time: civil::DateTime, zone: Zone) -> Self {
        Self {
            date: date_time.date(),
            time: Some(date_time.time()),
            zone,
        }
    }

    /// A UTC DATE-TIME value for an instant.
    #[must_use]
    pub fn utc(timestamp: Timestamp) -> Self {
        Self::date_time(timestamp.to_zoned(TimeZone::UTC).datetime(), Zone::Utc)
    }

    /// A DATE-TIME value carrying the wall-clock time of `zoned`.
    ///
    /// IANA zones become [`Zone::Named`], fixed offsets become [`Zone::Offset`].
    #[must_use]
    pub fn from_zoned(zoned: &Zoned) -> Self {
        let zone = match zoned.time_zone().iana_name() {
            Some("UTC") => Zone::Utc,
            Some(name) => Zone::Named(name.to_string()),
            None => Zone::Offset(UtcOffset::from_seconds(zoned.offset().seconds())),
        };
        Self::date_time(zoned.datetime(), zone)
    }

    /// Whether the value has a time part.
    #[must_use]
    pub const fn has_time(&self) -> bool {
        self.time.is_some()
    }

    /// Tie a floating DATE-TIME value to a named zone.
    #[must_use]
    pub fn with_tzid(mut self, tzid: &str) -> Self {
        if self.time.is_some() && self.zone == Zone::Floating {
            self.zone = Zone::Named(tzid.to_string());
        }
        self
    }

    /// The `TZID` this value refers to, if any.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.zone {
            Zone::Named(tzid) => Some(tzid),
            _ => None,
        }
    }

    /// Civil date-time, midnight for DATE values.
    #[must_use]
    pub fn civil(&self) -> civil::DateTime {
        self.date.to_datetime(self.time.unwrap_or(Time::midnight()))
    }

    /// Resolve to an instant.
    ///
    /// Floating values and DATE values are interpreted in `floating`; named
    /// zones are looked up in the system time zone database.
    ///
    /// # Errors
    /// Fails if the named zone is unknown or the wall-clock time cannot be
    /// resolved.
    pub fn to_timestamp(&self, floating: &TimeZone) -> Result<Timestamp, jiff::Error> {
        let civil = self.civil();
        let tz = match &self.zone {
            Zone::Floating => floating.clone(),
            Zone::Utc => TimeZone::UTC,
            Zone::Offset(offset) => TimeZone::fixed(offset.to_offset()?),
            Zone::Named(name) => TimeZone::get(name)?,
        };
        Ok(civil.to_zoned(tz)?.timestamp())
    }

    /// Format in the given syntax. Named zones are written without a suffix.
    #[must_use]
    pub fn format(&self, format: DateFormat) -> String {
        let d = self.date;
        let mut out = match format {
            DateFormat::Basic => format!("{:04}{:02}{:02}", d.year(), d.month(), d.day()),
            DateFormat::Extended => format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()),
        };

        let Some(t) = self.time else {
            return out;
        };
        out.push_str(&match format {
            DateFormat::Basic => format!("T{:02}{:02}{:02}", t.hour(), t.minute(), t.second()),
            DateFormat::Extended => {
                format!("T{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second())
            }
        });
        match &self.zone {
            Zone::Utc => out.push('Z'),
            Zone::Offset(offset) => out.push_str(&offset.format(format)),
            Zone::Floating | Zone::Named(_) => {}
        }
        out
    }
}

impl Display for ICalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DateFormat::Basic))
    }
}

impl FromStr for ICalDateTime {
    type Err = DateTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_date_time(s)
    }
}

/// Parse a DATE or DATE-TIME value in basic or extended form.
///
/// # Errors
/// Returns a [`DateTimeError`] describing what did not match.
pub fn parse_date_time(value: &str) -> Result<ICalDateTime, DateTimeError> {
    parse_all(date_time(), value.trim()).map_err(|reason| DateTimeError {
        value: value.to_string(),
        reason,
    })
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// date-value         = date-fullyear date-month date-mday
/// date-fullyear      = 4DIGIT
/// date-month         = 2DIGIT        ;01-12
/// date-mday          = 2DIGIT        ;01-28, 01-29, 01-30, 01-31
/// ```
fn date<'src>() -> impl Parser<'src, &'src str, Date, Extra<'src>> + Clone {
    let extended = digits(4)
        .then_ignore(just('-'))
        .then(digits(2))
        .then_ignore(just('-'))
        .then(digits(2));
    let basic = digits(4).then(digits(2)).then(digits(2));

    choice((extended, basic)).try_map(|((year, month), day), span| {
        let invalid = || Rich::custom(span, "invalid calendar date");
        let year = i16::try_from(year).map_err(|_| invalid())?;
        let month = i8::try_from(month).map_err(|_| invalid())?;
        let day = i8::try_from(day).map_err(|_| invalid())?;
        Date::new(year, month, day).map_err(|_| invalid())
    })
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// time         = time-hour time-minute time-second [time-utc]
/// time-hour    = 2DIGIT        ;00-23
/// time-minute  = 2DIGIT        ;00-59
/// time-second  = 2DIGIT        ;00-60
/// ```
fn time<'src>() -> impl Parser<'src, &'src str, Time, Extra<'src>> + Clone {
    let sep = just(':').or_not();
    digits(2)
        .then_ignore(sep.clone())
        .then(digits(2))
        .then_ignore(sep)
        .then(digits(2))
        .try_map(|((hour, minute), second), span| {
            let invalid = || Rich::custom(span, "invalid time of day");
            if hour > 23 || minute > 59 || second > 60 {
                return Err(invalid());
            }
            // NOTE: leap second 60 is contracted to 59
            let second = second.min(59);
            let (h, m, s) = (
                i8::try_from(hour).map_err(|_| invalid())?,
                i8::try_from(minute).map_err(|_| invalid())?,
                i8::try_from(second).map_err(|_| invalid())?,
            );
            Time::new(h, m, s, 0).map_err(|_| invalid())
        })
}

fn zone<'src>() -> impl Parser<'src, &'src str, Zone, Extra<'src>> + Clone {
    choice((
        one_of("Zz").to(Zone::Utc),
        utc_offset(true).map(Zone::Offset),
    ))
    .or_not()
    .map(|zone| zone.unwrap_or(Zone::Floating))
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// date-time  = date "T" time ;As specified in the DATE and TIME
/// ```
pub(crate) fn date_time<'src>() -> impl Parser<'src, &'src str, ICalDateTime, Extra<'src>> + Clone
{
    date()
        .then(
            one_of("Tt")
                .ignore_then(time())
                .then(zone())
                .or_not(),
        )
        .map(|(date, time)| match time {
            Some((time, zone)) => ICalDateTime {
                date,
                time: Some(time),
                zone,
            },
            None => ICalDateTime::date(date),
        })
}
