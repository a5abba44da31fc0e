// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Writing whole components in the text syntax.

use std::io::{self, Write};

use crate::component::Component;
use crate::formatter::{ContentWriter, ScrubEvent, WriteError, WriterOptions};
use crate::property::Property;
use crate::scribe::{ScribeError, ScribeIndex, WriteContext};

/// Writes components through the scribes of a [`ScribeIndex`].
///
/// Properties whose value does not fit their scribe are skipped; everything
/// else, including raw values, is written.
#[derive(Debug)]
pub struct ICalWriter<'i, W: Write> {
    writer: ContentWriter<W>,
    index: &'i ScribeIndex,
}

impl<W: Write> ICalWriter<'static, W> {
    /// Create a writer with the standard scribes.
    pub fn new(writer: W, options: WriterOptions) -> Self {
        Self::with_index(writer, options, ScribeIndex::standard())
    }
}

impl<'i, W: Write> ICalWriter<'i, W> {
    /// Create a writer with a scribe index.
    pub fn with_index(writer: W, options: WriterOptions, index: &'i ScribeIndex) -> Self {
        Self {
            writer: ContentWriter::new(writer, options),
            index,
        }
    }

    /// Observe parameter values changed to fit the wire format.
    pub fn set_scrub_hook(&mut self, hook: impl FnMut(&ScrubEvent) + Send + 'static) {
        self.writer.set_scrub_hook(hook);
    }

    /// Write a component and everything below it.
    ///
    /// # Errors
    /// Fails on an invalid component, property or parameter name, or on an
    /// I/O error.
    pub fn write(&mut self, component: &Component) -> Result<(), WriteError> {
        let mut stack: Vec<(&Component, usize)> = Vec::new();
        self.open(component)?;
        stack.push((component, 0));

        while let Some(top) = stack.last_mut() {
            let (current, next) = *top;
            match current.components.get(next) {
                Some(child) => {
                    top.1 += 1;
                    self.open(child)?;
                    stack.push((child, 0));
                }
                None => {
                    self.writer.write_end_component(&current.name)?;
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    fn open(&mut self, component: &Component) -> Result<(), WriteError> {
        self.writer.write_begin_component(&component.name)?;
        for property in &component.properties {
            self.write_property(property)?;
        }
        Ok(())
    }

    /// Write a single property line.
    ///
    /// # Errors
    /// Fails on an invalid property or parameter name, or on an I/O error.
    pub fn write_property(&mut self, property: &Property) -> Result<(), WriteError> {
        let ctx = WriteContext::new(self.writer.options().version);
        let scribe = self.index.writer_for(&property.name, &property.value);
        let text = match scribe.write_text(&property.value, &ctx) {
            Ok(text) => text,
            Err(ScribeError::SkipMe(reason)) => {
                tracing::debug!(property = %property.name, %reason, "skipping property");
                return Ok(());
            }
            Err(ScribeError::CannotParse(warning)) => {
                tracing::debug!(property = %property.name, %warning, "skipping property");
                return Ok(());
            }
        };
        let parameters = scribe.prepare_parameters(property, &ctx);
        self.writer.write_property(&property.name, &parameters, &text)
    }

    /// Flush the underlying writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Unwrap the underlying writer.
    pub fn into_writer(self) -> W {
        self.writer.into_writer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::KW_VCALENDAR;
    use crate::property::PropertyValue;
    use crate::value::{ICalDateTime, Zone};

    fn write(component: &Component) -> String {
        let mut writer = ICalWriter::new(Vec::new(), WriterOptions::default());
        writer.write(component).unwrap();
        String::from_utf8(writer.into_writer()).unwrap()
    }

    #[test]
    fn writes_nested_components_in_order() {
        let calendar = Component::new(KW_VCALENDAR)
            .with_property(Property::new("VERSION", PropertyValue::Text("2.0".into())))
            .with_component(
                Component::new("VEVENT")
                    .with_property(Property::new("SUMMARY", PropertyValue::Text("a, b".into()))),
            )
            .with_component(Component::new("VTODO"));
        assert_eq!(
            write(&calendar),
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nSUMMARY:a\\, b\r\nEND:VEVENT\r\nBEGIN:VTODO\r\nEND:VTODO\r\nEND:VCALENDAR\r\n"
        );
    }

    #[test]
    fn named_zone_adds_tzid() {
        let start = ICalDateTime::date_time(
            jiff::civil::date(2024, 3, 15).at(9, 30, 0, 0),
            Zone::Named("Europe/Berlin".to_string()),
        );
        let event = Component::new("VEVENT")
            .with_property(Property::new("DTSTART", PropertyValue::DateTime(start)));
        assert!(write(&event).contains("DTSTART;TZID=Europe/Berlin:20240315T093000\r\n"));
    }

    #[test]
    fn mismatched_value_is_skipped() {
        let event = Component::new("VEVENT")
            .with_property(Property::new("DTSTART", PropertyValue::Integer(5)));
        assert_eq!(write(&event), "BEGIN:VEVENT\r\nEND:VEVENT\r\n");
    }

    #[test]
    fn invalid_names_fail_loudly() {
        let mut writer = ICalWriter::new(Vec::new(), WriterOptions::default());
        let bad = Component::new("V:EVENT");
        assert!(matches!(writer.write(&bad), Err(WriteError::InvalidName { .. })));
    }

    #[test]
    fn deep_nesting_is_written_iteratively() {
        let mut root = Component::new("X-ROOT");
        let mut cursor = &mut root;
        for _ in 0..100_000 {
            cursor.components.push(Component::new("X-CHILD"));
            cursor = &mut cursor.components[0];
        }
        let out = write(&root);
        assert_eq!(out.matches("BEGIN:X-CHILD").count(), 100_000);
        assert!(out.ends_with("END:X-CHILD\r\nEND:X-ROOT\r\n"));
    }
}
