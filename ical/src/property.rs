// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Typed properties produced and consumed by the scribes.
//!
//! A [`Property`] pairs a name and its parameters with a [`PropertyValue`].
//! Values a scribe could not interpret are carried as
//! [`PropertyValue::Raw`], so writing them back reproduces the input.

use std::fmt::{self, Display};

use crate::parameter::{DataType, Parameters};
use crate::value::{Duration, ICalDateTime, Period, Recurrence, UtcOffset};

/// A property with a typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name, casing as read or given.
    pub name: String,
    /// Parameters, without `VALUE` which is derived from the value.
    pub parameters: Parameters,
    /// Typed value.
    pub value: PropertyValue,
}

impl Property {
    /// Create a property without parameters.
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            parameters: Parameters::new(),
            value,
        }
    }

    /// Append a parameter value.
    #[must_use]
    pub fn with_parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parameters.put(name, value);
        self
    }

    /// Whether the name matches, ignoring case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Value of a [`Property`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// TEXT, unescaped.
    Text(String),
    /// Comma separated TEXT values, unescaped.
    TextList(Vec<String>),
    /// URI or CAL-ADDRESS.
    Uri(String),
    /// INTEGER
    Integer(i32),
    /// A single DATE or DATE-TIME.
    DateTime(ICalDateTime),
    /// A list of DATE or DATE-TIME values.
    DateTimes(Vec<ICalDateTime>),
    /// A list of PERIOD values.
    Periods(Vec<Period>),
    /// DURATION
    Duration(Duration),
    /// Alarm trigger.
    Trigger(Trigger),
    /// UTC-OFFSET
    UtcOffset(UtcOffset),
    /// RECUR
    Recurrence(Recurrence),
    /// Geographic position.
    Geo(Geo),
    /// Request status.
    RequestStatus(RequestStatus),
    /// Attachment.
    Attachment(Attachment),
    /// Uninterpreted value text, exactly as on the wire.
    Raw {
        /// Data type named by the `VALUE` parameter.
        data_type: Option<DataType>,
        /// Value text.
        value: String,
    },
}

impl PropertyValue {
    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::TextList(_) => "text list",
            Self::Uri(_) => "uri",
            Self::Integer(_) => "integer",
            Self::DateTime(_) => "date-time",
            Self::DateTimes(_) => "date-time list",
            Self::Periods(_) => "period list",
            Self::Duration(_) => "duration",
            Self::Trigger(_) => "trigger",
            Self::UtcOffset(_) => "utc-offset",
            Self::Recurrence(_) => "recurrence",
            Self::Geo(_) => "geo",
            Self::RequestStatus(_) => "request-status",
            Self::Attachment(_) => "attachment",
            Self::Raw { .. } => "raw",
        }
    }

    /// The text, if this is a TEXT value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The date-time, if this is a single DATE or DATE-TIME value.
    #[must_use]
    pub const fn as_date_time(&self) -> Option<&ICalDateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// The rule, if this is a RECUR value.
    #[must_use]
    pub const fn as_recurrence(&self) -> Option<&Recurrence> {
        match self {
            Self::Recurrence(rule) => Some(rule),
            _ => None,
        }
    }
}

/// TRIGGER value: relative duration or absolute date-time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Offset from the start or end of the related component.
    Duration(Duration),
    /// Absolute UTC date-time.
    DateTime(ICalDateTime),
}

/// GEO value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geo {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// REQUEST-STATUS value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestStatus {
    /// Hierarchical status code, e.g. `2.0`.
    pub code: String,
    /// Status description.
    pub description: String,
    /// Exception data.
    pub data: Option<String>,
}

/// ATTACH value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// Reference to the attachment.
    Uri(String),
    /// Inline content, written as BASE64.
    Binary(Vec<u8>),
}

impl Display for Geo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.latitude, self.longitude)
    }
}
