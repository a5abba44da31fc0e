// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Read and write iCalendar data in its three wire formats.
//!
//! - the text syntax of RFC 5545 and vCalendar 1.0, through [`ICalReader`]
//!   and [`ICalWriter`], or one level down through the streaming
//!   [`syntax::ContentReader`] and [`formatter::ContentWriter`];
//! - xCal (RFC 6321) in [`xcal`];
//! - jCal (RFC 7265) in [`jcal`].
//!
//! All three share the [`Component`] tree and the per-property [`Scribe`]s
//! of a [`ScribeIndex`]. Problems in the input never abort a read: they are
//! collected as [`Warning`]s while the affected property is kept verbatim or
//! dropped.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

pub mod component;
pub mod formatter;
pub mod jcal;
#[allow(missing_docs)]
pub mod keyword;
pub mod parameter;
pub mod property;
pub mod reader;
pub mod scribe;
pub mod syntax;
pub mod value;
pub mod version;
pub mod warning;
pub mod writer;
pub mod xcal;
pub mod xml;

pub use crate::component::{Component, Document};
pub use crate::formatter::{
    ContentWriter, FoldingScheme, FoldingStyle, ScrubEvent, WriteError, WriterOptions,
};
pub use crate::jcal::JCalError;
pub use crate::parameter::{DataType, Parameters};
pub use crate::property::{Attachment, Geo, Property, PropertyValue, RequestStatus, Trigger};
pub use crate::reader::ICalReader;
pub use crate::scribe::{ParseContext, Scribe, ScribeError, ScribeIndex, WriteContext};
pub use crate::syntax::{ContentReader, RawProperty, ReadEvent, ReadHandler, ReaderOptions};
pub use crate::value::{
    Duration, ICalDateTime, Period, PeriodEnd, Recurrence, RecurrenceFrequency, UtcOffset,
    WeekDay, WeekDayNum, Zone,
};
pub use crate::version::ICalVersion;
pub use crate::warning::{Warning, WarningKind};
pub use crate::writer::ICalWriter;
pub use crate::xcal::XCalError;
pub use crate::xml::XmlElement;
