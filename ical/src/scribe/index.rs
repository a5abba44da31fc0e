// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Registry of scribes keyed by property name.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::keyword::{
    KW_ACTION, KW_ATTENDEE, KW_CALSCALE, KW_CATEGORIES, KW_CLASS, KW_COMMENT, KW_COMPLETED,
    KW_CONTACT, KW_CREATED, KW_DESCRIPTION, KW_DTEND, KW_DTSTAMP, KW_DTSTART, KW_DUE, KW_EXDATE,
    KW_EXRULE, KW_LAST_MODIFIED, KW_LOCATION, KW_METHOD, KW_ORGANIZER, KW_PERCENT_COMPLETE,
    KW_PRIORITY, KW_PRODID, KW_RDATE, KW_RECURRENCE_ID, KW_RELATED_TO, KW_REPEAT, KW_RESOURCES,
    KW_RRULE, KW_SEQUENCE, KW_STATUS, KW_SUMMARY, KW_TRANSP, KW_TZID, KW_TZNAME, KW_TZOFFSETFROM,
    KW_TZOFFSETTO, KW_TZURL, KW_UID, KW_URL, KW_VERSION,
};
use crate::property::PropertyValue;
use crate::scribe::{
    AttachmentScribe, DateListScribe, DateOrDateTimeScribe, DateTimeScribe, DurationScribe,
    GeoScribe, IntegerScribe, PeriodListScribe, RawScribe, RecurrenceScribe, RequestStatusScribe,
    Scribe, TextListScribe, TextScribe, TriggerScribe, UriScribe, UtcOffsetScribe,
};

static RAW: RawScribe = RawScribe;

static STANDARD: LazyLock<ScribeIndex> = LazyLock::new(ScribeIndex::new);

/// Scribes keyed by upper-case property name.
///
/// Built once, then only read: register extra scribes with
/// [`ScribeIndex::with_scribe`] before handing the index to readers and
/// writers.
pub struct ScribeIndex {
    scribes: HashMap<String, Box<dyn Scribe>>,
}

impl fmt::Debug for ScribeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.scribes.keys().collect();
        names.sort();
        f.debug_struct("ScribeIndex").field("scribes", &names).finish()
    }
}

impl Default for ScribeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ScribeIndex {
    /// An index with scribes for the RFC 5545 properties.
    #[must_use]
    pub fn new() -> Self {
        let mut index = Self::empty();
        for name in [
            KW_SUMMARY,
            KW_DESCRIPTION,
            KW_LOCATION,
            KW_COMMENT,
            KW_UID,
            KW_PRODID,
            KW_VERSION,
            KW_CALSCALE,
            KW_METHOD,
            KW_STATUS,
            KW_CLASS,
            KW_TRANSP,
            KW_TZID,
            KW_TZNAME,
            KW_ACTION,
            KW_CONTACT,
            KW_RELATED_TO,
        ] {
            index.register(TextScribe::new(name));
        }
        for name in [KW_CATEGORIES, KW_RESOURCES] {
            index.register(TextListScribe::new(name));
        }
        for name in [KW_URL, KW_TZURL] {
            index.register(UriScribe::uri(name));
        }
        for name in [KW_ORGANIZER, KW_ATTENDEE] {
            index.register(UriScribe::cal_address(name));
        }
        for name in [KW_PRIORITY, KW_SEQUENCE, KW_PERCENT_COMPLETE, KW_REPEAT] {
            index.register(IntegerScribe::new(name));
        }
        for name in [KW_DTSTAMP, KW_CREATED, KW_LAST_MODIFIED, KW_COMPLETED] {
            index.register(DateTimeScribe::new(name));
        }
        for name in [KW_DTSTART, KW_DTEND, KW_DUE, KW_RECURRENCE_ID] {
            index.register(DateOrDateTimeScribe::new(name));
        }
        index.register(DateListScribe::new(KW_EXDATE));
        index.register(DateListScribe::with_periods(KW_RDATE));
        index.register(PeriodListScribe);
        index.register(DurationScribe);
        index.register(TriggerScribe);
        for name in [KW_TZOFFSETFROM, KW_TZOFFSETTO] {
            index.register(UtcOffsetScribe::new(name));
        }
        for name in [KW_RRULE, KW_EXRULE] {
            index.register(RecurrenceScribe::new(name));
        }
        index.register(GeoScribe);
        index.register(RequestStatusScribe);
        index.register(AttachmentScribe);
        index
    }

    /// An index without scribes; every property is read verbatim.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            scribes: HashMap::new(),
        }
    }

    /// The shared index of [`ScribeIndex::new`].
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Add a scribe, replacing any scribe registered under the same name.
    #[must_use]
    pub fn with_scribe(mut self, scribe: impl Scribe + 'static) -> Self {
        self.register(scribe);
        self
    }

    fn register(&mut self, scribe: impl Scribe + 'static) {
        self.scribes
            .insert(scribe.name().to_ascii_uppercase(), Box::new(scribe));
    }

    /// Scribe registered for a property name, ignoring case.
    ///
    /// xCal element names and jCal names are lower-case property names, so
    /// the same lookup serves all three syntaxes.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Scribe> {
        self.scribes
            .get(&name.to_ascii_uppercase())
            .map(AsRef::as_ref)
    }

    /// Whether a scribe is registered for the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scribes.contains_key(&name.to_ascii_uppercase())
    }

    /// Scribe for reading a property: the registered one, or [`RawScribe`].
    #[must_use]
    pub fn scribe_for(&self, name: &str) -> &dyn Scribe {
        self.get(name).unwrap_or(&RAW)
    }

    /// Scribe for writing a property: raw values always go to [`RawScribe`]
    /// so they are written back exactly as read.
    #[must_use]
    pub fn writer_for(&self, name: &str, value: &PropertyValue) -> &dyn Scribe {
        match value {
            PropertyValue::Raw { .. } => &RAW,
            _ => self.scribe_for(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::DataType;
    use crate::version::ICalVersion;

    #[test]
    fn standard_index_covers_core_properties() {
        let index = ScribeIndex::standard();
        for name in ["SUMMARY", "dtstart", "Rrule", "request-status", "ATTACH", "FREEBUSY"] {
            assert!(index.contains(name), "missing scribe for {name}");
        }
        assert!(!index.contains("X-CUSTOM"));
    }

    #[test]
    fn unknown_names_fall_back_to_raw() {
        let index = ScribeIndex::standard();
        let scribe = index.scribe_for("X-CUSTOM");
        assert_eq!(scribe.name(), "");
        assert_eq!(
            index.scribe_for("DTSTART").default_data_type(ICalVersion::V2_0),
            DataType::DateTime
        );
    }

    #[test]
    fn extra_scribes_replace_defaults() {
        let index = ScribeIndex::new().with_scribe(TextScribe::new("X-CUSTOM"));
        assert!(index.contains("x-custom"));
        let index = index.with_scribe(TextScribe::new(KW_DTSTART));
        assert_eq!(
            index.scribe_for(KW_DTSTART).default_data_type(ICalVersion::V2_0),
            DataType::Text
        );
    }

    #[test]
    fn raw_values_are_written_raw() {
        let index = ScribeIndex::standard();
        let raw = PropertyValue::Raw {
            data_type: None,
            value: "x".to_string(),
        };
        assert_eq!(index.writer_for(KW_DTSTART, &raw).name(), "");
    }
}
