// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! RECUR values as defined in RFC 5545 Section 3.3.10.
//!
//! Parsing is lenient: malformed parts and values are skipped with a warning
//! and everything that could be understood is kept. Rule parts are first
//! split into an ordered [`RecurParts`] multimap, which is also the shape the
//! xCal and jCal representations are built from.

use std::fmt::{self, Display};
use std::sync::OnceLock;

use regex::Regex;

use crate::keyword::{
    KW_RRULE_BYDAY, KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY,
    KW_RRULE_BYSECOND, KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT,
    KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::DateFormat;
use crate::value::datetime::{ICalDateTime, parse_date_time};
use crate::warning::{Warning, WarningKind};

/// Recurrence frequency
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[expect(missing_docs)]
pub enum RecurrenceFrequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Day of the week
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::Display, strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
#[expect(missing_docs)]
pub enum WeekDay {
    #[strum(serialize = "SU")]
    Sunday,
    #[strum(serialize = "MO")]
    Monday,
    #[strum(serialize = "TU")]
    Tuesday,
    #[strum(serialize = "WE")]
    Wednesday,
    #[strum(serialize = "TH")]
    Thursday,
    #[strum(serialize = "FR")]
    Friday,
    #[strum(serialize = "SA")]
    Saturday,
}

/// Day of week with optional occurrence, e.g. `-1SU`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekDayNum {
    /// Occurrence within the month or year
    pub occurrence: Option<i32>,
    /// Day of the week
    pub day: WeekDay,
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.occurrence {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.day)
    }
}

impl WeekDayNum {
    /// Parse `[+|-]n?DD`. Returns `None` if the text does not have that shape.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        const RE: &str = r"^([+-]?\d{1,2})?([A-Za-z]{2})$";
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| Regex::new(RE).unwrap());

        let caps = re.captures(value.trim())?;
        let day = caps.get(2)?.as_str().parse().ok()?;
        let occurrence = caps.get(1).map(|m| match lexical::parse::<i32, _>(m.as_str().trim_start_matches('+')) {
            Ok(n) => n,
            Err(e) => unreachable!("two-digit ordinal {:?} failed to parse: {e}", m.as_str()),
        });
        Some(Self { occurrence, day })
    }
}

/// Ordered multimap of recurrence rule parts, names upper-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurParts {
    parts: Vec<(String, Vec<String>)>,
}

impl RecurParts {
    /// Create an empty part list.
    #[must_use]
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Split `NAME=v1,v2;NAME=v` text into parts.
    ///
    /// Parts without `=` or with an empty name are skipped with a warning;
    /// empty parts between semicolons are ignored.
    pub fn parse(text: &str, warnings: &mut Vec<Warning>) -> Self {
        let mut parts = Self::new();
        for part in text.split(';') {
            if part.trim().is_empty() {
                continue;
            }
            match part.split_once('=') {
                Some((name, values)) if !name.trim().is_empty() => {
                    for value in values.split(',') {
                        parts.push(name.trim(), value.trim());
                    }
                }
                _ => warnings.push(
                    WarningKind::InvalidRecurPart {
                        part: part.to_string(),
                    }
                    .into(),
                ),
            }
        }
        parts
    }

    /// Append a value to a part.
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .parts
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, values)) => values.push(value),
            None => self.parts.push((name.to_ascii_uppercase(), vec![value])),
        }
    }

    /// Values of a part.
    #[must_use]
    pub fn get(&self, name: &str) -> &[String] {
        self.parts
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map_or(&[], |(_, values)| values.as_slice())
    }

    /// Iterate `(NAME, values)` in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.parts.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Whether there are no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Join back into `NAME=v1,v2;NAME=v` text.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.parts
            .iter()
            .map(|(name, values)| format!("{name}={}", values.join(",")))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// A recurrence rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recurrence {
    /// Frequency; required, but a rule without it is still kept.
    pub frequency: Option<RecurrenceFrequency>,
    /// Last instance
    pub until: Option<ICalDateTime>,
    /// Number of occurrences
    pub count: Option<u32>,
    /// Interval between recurrences
    pub interval: Option<u32>,
    /// Second specifier
    pub by_second: Vec<i32>,
    /// Minute specifier
    pub by_minute: Vec<i32>,
    /// Hour specifier
    pub by_hour: Vec<i32>,
    /// Day of week specifier
    pub by_day: Vec<WeekDayNum>,
    /// Day of month specifier
    pub by_month_day: Vec<i32>,
    /// Day of year specifier
    pub by_year_day: Vec<i32>,
    /// Week number specifier
    pub by_week_no: Vec<i32>,
    /// Month specifier
    pub by_month: Vec<i32>,
    /// Position in set
    pub by_set_pos: Vec<i32>,
    /// Start day of week
    pub wkst: Option<WeekDay>,
    /// Unrecognized parts such as `X-NAME=...`, in order
    pub extensions: Vec<(String, Vec<String>)>,
}

impl Recurrence {
    /// A rule with only a frequency.
    #[must_use]
    pub fn new(frequency: RecurrenceFrequency) -> Self {
        Self {
            frequency: Some(frequency),
            ..Self::default()
        }
    }

    /// Parse rule text, collecting warnings for anything skipped.
    pub fn parse(text: &str, warnings: &mut Vec<Warning>) -> Self {
        Self::from_parts(&RecurParts::parse(text, warnings), warnings)
    }

    /// Interpret split rule parts.
    pub fn from_parts(parts: &RecurParts, warnings: &mut Vec<Warning>) -> Self {
        let mut rule = Self::default();
        for (name, values) in parts.iter() {
            let single = matches!(
                name,
                KW_RRULE_FREQ | KW_RRULE_UNTIL | KW_RRULE_COUNT | KW_RRULE_INTERVAL | KW_RRULE_WKST
            );
            if single
                && let Some(ignored) = values.get(1..)
                && !ignored.is_empty()
            {
                warnings.push(
                    WarningKind::ExtraValues {
                        name: name.to_string(),
                        ignored: ignored.join(","),
                    }
                    .into(),
                );
            }

            let mut reject = |value: &str| {
                warnings.push(
                    WarningKind::InvalidRecurValue {
                        name: name.to_string(),
                        value: value.to_string(),
                    }
                    .into(),
                );
            };
            let first = values.first().map_or("", String::as_str);

            match name {
                KW_RRULE_FREQ => match first.parse() {
                    Ok(freq) => rule.frequency = Some(freq),
                    Err(_) => reject(first),
                },
                KW_RRULE_UNTIL => match parse_date_time(first) {
                    Ok(until) => rule.until = Some(until),
                    Err(_) => reject(first),
                },
                KW_RRULE_COUNT => match lexical::parse::<u32, _>(first) {
                    Ok(count) => rule.count = Some(count),
                    Err(_) => reject(first),
                },
                KW_RRULE_INTERVAL => match lexical::parse::<u32, _>(first) {
                    Ok(interval) => rule.interval = Some(interval),
                    Err(_) => reject(first),
                },
                KW_RRULE_WKST => match first.parse() {
                    Ok(day) => rule.wkst = Some(day),
                    Err(_) => reject(first),
                },
                KW_RRULE_BYDAY => {
                    for value in values {
                        match WeekDayNum::parse(value) {
                            Some(day) => rule.by_day.push(day),
                            None => reject(value),
                        }
                    }
                }
                _ => {
                    let Some(target) = rule.integer_list_mut(name) else {
                        rule.extensions.push((name.to_string(), values.to_vec()));
                        continue;
                    };
                    for value in values {
                        match lexical::parse::<i32, _>(value.trim_start_matches('+')) {
                            Ok(n) => target.push(n),
                            Err(_) => reject(value),
                        }
                    }
                }
            }
        }

        if rule.frequency.is_none() {
            warnings.push(WarningKind::MissingFrequency.into());
        }
        rule
    }

    fn integer_list_mut(&mut self, name: &str) -> Option<&mut Vec<i32>> {
        Some(match name {
            KW_RRULE_BYSECOND => &mut self.by_second,
            KW_RRULE_BYMINUTE => &mut self.by_minute,
            KW_RRULE_BYHOUR => &mut self.by_hour,
            KW_RRULE_BYMONTHDAY => &mut self.by_month_day,
            KW_RRULE_BYYEARDAY => &mut self.by_year_day,
            KW_RRULE_BYWEEKNO => &mut self.by_week_no,
            KW_RRULE_BYMONTH => &mut self.by_month,
            KW_RRULE_BYSETPOS => &mut self.by_set_pos,
            _ => return None,
        })
    }

    /// Rule parts in canonical order, FREQ first.
    #[must_use]
    pub fn to_parts(&self, format: DateFormat) -> RecurParts {
        let mut parts = RecurParts::new();
        if let Some(freq) = self.frequency {
            parts.push(KW_RRULE_FREQ, freq.as_ref());
        }
        if let Some(until) = &self.until {
            parts.push(KW_RRULE_UNTIL, until.format(format));
        }
        if let Some(count) = self.count {
            parts.push(KW_RRULE_COUNT, count.to_string());
        }
        if let Some(interval) = self.interval {
            parts.push(KW_RRULE_INTERVAL, interval.to_string());
        }

        let mut push_all = |name: &str, values: &[i32]| {
            for v in values {
                parts.push(name, v.to_string());
            }
        };
        push_all(KW_RRULE_BYSECOND, &self.by_second);
        push_all(KW_RRULE_BYMINUTE, &self.by_minute);
        push_all(KW_RRULE_BYHOUR, &self.by_hour);
        for day in &self.by_day {
            parts.push(KW_RRULE_BYDAY, day.to_string());
        }
        let mut push_all = |name: &str, values: &[i32]| {
            for v in values {
                parts.push(name, v.to_string());
            }
        };
        push_all(KW_RRULE_BYMONTHDAY, &self.by_month_day);
        push_all(KW_RRULE_BYYEARDAY, &self.by_year_day);
        push_all(KW_RRULE_BYWEEKNO, &self.by_week_no);
        push_all(KW_RRULE_BYMONTH, &self.by_month);
        push_all(KW_RRULE_BYSETPOS, &self.by_set_pos);

        if let Some(wkst) = self.wkst {
            parts.push(KW_RRULE_WKST, wkst.as_ref());
        }
        for (name, values) in &self.extensions {
            for v in values {
                parts.push(name, v.clone());
            }
        }
        parts
    }

    /// Rule text in canonical order, as used by the text syntax.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_parts(DateFormat::Basic).to_text()
    }
}

impl Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
