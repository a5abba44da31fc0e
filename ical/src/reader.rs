// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Reading whole components from the text syntax.

use std::io::{self, BufRead};
use std::ops::ControlFlow;

use crate::component::Component;
use crate::keyword::{KW_VALUE, KW_VERSION};
use crate::scribe::{ParseContext, ScribeIndex, finish_property};
use crate::property::PropertyValue;
use crate::syntax::{ContentReader, RawProperty, ReadEvent, ReadHandler, ReaderOptions};
use crate::warning::{Warning, WarningKind};

/// Reads one top-level component at a time, e.g. each VCALENDAR of a
/// stream holding several.
///
/// ```
/// use wirecal_ical::ICalReader;
///
/// let src = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nSUMMARY:Hi\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
/// let mut reader = ICalReader::new(src.as_bytes());
/// let calendar = reader.read_next().unwrap().unwrap();
/// assert_eq!(calendar.components[0].name, "VEVENT");
/// assert!(reader.warnings().is_empty());
/// assert!(reader.read_next().unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct ICalReader<'i, R> {
    reader: ContentReader<R>,
    index: &'i ScribeIndex,
    ctx: ParseContext,
}

impl<R: BufRead> ICalReader<'static, R> {
    /// Create a reader with the standard scribes and default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReaderOptions::default(), ScribeIndex::standard())
    }
}

impl<'i, R: BufRead> ICalReader<'i, R> {
    /// Create a reader with options and a scribe index.
    pub fn with_options(reader: R, options: ReaderOptions, index: &'i ScribeIndex) -> Self {
        Self {
            reader: ContentReader::with_options(reader, options),
            index,
            ctx: ParseContext::new(options.version),
        }
    }

    /// Warnings raised by the last call to [`ICalReader::read_next`].
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        self.ctx.warnings()
    }

    /// Read the next top-level component, or `None` at end of input.
    ///
    /// Components still open at end of input are closed with a warning.
    ///
    /// # Errors
    /// Propagates I/O errors of the underlying reader.
    pub fn read_next(&mut self) -> io::Result<Option<Component>> {
        self.ctx.clear();
        let mut assembler = Assembler {
            index: self.index,
            ctx: &mut self.ctx,
            stack: Vec::new(),
            finished: None,
        };
        if self.reader.drive(&mut assembler)?.is_break() {
            return Ok(assembler.finished);
        }
        Ok(assembler.close_all())
    }
}

impl<R: BufRead> Iterator for ICalReader<'_, R> {
    type Item = io::Result<Component>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Builds a component tree from read events with an explicit stack.
struct Assembler<'a, 'i> {
    index: &'i ScribeIndex,
    ctx: &'a mut ParseContext,
    stack: Vec<Component>,
    finished: Option<Component>,
}

impl Assembler<'_, '_> {
    fn property(&mut self, raw: RawProperty) {
        self.ctx.line = Some(raw.line);
        self.ctx.property = Some(raw.name.clone());

        if raw.name.eq_ignore_ascii_case(KW_VERSION) {
            match raw.value.parse() {
                Ok(version) => self.ctx.version = version,
                Err(()) => self.ctx.warn(WarningKind::UnknownVersion {
                    value: raw.value.clone(),
                }),
            }
        }

        let Some(parent) = self.stack.last_mut() else {
            self.ctx.warn(WarningKind::SkippedProperty {
                reason: "property outside of any component".to_string(),
            });
            return;
        };

        let RawProperty {
            name,
            data_type,
            parameters,
            value,
            ..
        } = raw;
        if let Some(ignored) = parameters.get_all(KW_VALUE).get(1..)
            && !ignored.is_empty()
        {
            self.ctx.warn(WarningKind::ExtraValues {
                name: KW_VALUE.to_string(),
                ignored: ignored.join(","),
            });
        }

        let scribe = self.index.scribe_for(&name);
        let result = scribe.parse_text(&value, data_type.as_ref(), &parameters, self.ctx);
        let raw_value = || PropertyValue::Raw { data_type, value };
        if let Some(mut property) = finish_property(name, parameters, result, raw_value, self.ctx) {
            // typed values carry their data type; raw ones keep VALUE as written
            if !matches!(property.value, PropertyValue::Raw { .. }) {
                property.parameters.remove(KW_VALUE);
            }
            parent.properties.push(property);
        }
    }

    fn end(&mut self) -> ControlFlow<()> {
        let Some(done) = self.stack.pop() else {
            return ControlFlow::Continue(());
        };
        match self.stack.last_mut() {
            Some(parent) => {
                parent.components.push(done);
                ControlFlow::Continue(())
            }
            None => {
                self.finished = Some(done);
                ControlFlow::Break(())
            }
        }
    }

    fn close_all(mut self) -> Option<Component> {
        while let Some(open) = self.stack.last() {
            self.ctx.line = None;
            self.ctx.property = None;
            self.ctx.warn(WarningKind::UnclosedComponent {
                name: open.name.clone(),
            });
            if self.end().is_break() {
                break;
            }
        }
        self.finished
    }
}

impl ReadHandler for Assembler<'_, '_> {
    fn handle(&mut self, event: ReadEvent) -> ControlFlow<()> {
        match event {
            ReadEvent::BeginComponent { name, .. } => {
                self.stack.push(Component::new(name));
                ControlFlow::Continue(())
            }
            ReadEvent::EndComponent {
                line, unmatched, ..
            } => {
                let Some(unmatched) = unmatched else {
                    return self.end();
                };
                self.ctx.warn(
                    Warning::from(WarningKind::UnmatchedEnd {
                        found: unmatched.found,
                        expected: unmatched.expected.clone().unwrap_or_else(|| "(none)".to_string()),
                    })
                    .at_line(Some(line)),
                );
                if unmatched.expected.is_none() {
                    return ControlFlow::Continue(());
                }
                self.end()
            }
            ReadEvent::Property(raw) => {
                self.property(raw);
                ControlFlow::Continue(())
            }
            ReadEvent::ValuelessParameter {
                property,
                parameter,
                line,
            } => {
                self.ctx.warn(
                    Warning::from(WarningKind::ValuelessParameter { parameter })
                        .at_line(Some(line))
                        .for_property(property),
                );
                ControlFlow::Continue(())
            }
            ReadEvent::InvalidLine { text, line, .. } => {
                self.ctx
                    .warn(Warning::from(WarningKind::InvalidLine { text }).at_line(Some(line)));
                ControlFlow::Continue(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(src: &str) -> (Vec<Component>, Vec<Vec<Warning>>) {
        let mut reader = ICalReader::new(src.as_bytes());
        let mut components = Vec::new();
        let mut warnings = Vec::new();
        while let Some(component) = reader.read_next().unwrap() {
            components.push(component);
            warnings.push(reader.warnings().to_vec());
        }
        (components, warnings)
    }

    #[test]
    fn reads_concatenated_calendars_with_fresh_warnings() {
        let src = "BEGIN:VCALENDAR\r\nX-A;P:1\r\nEND:VCALENDAR\r\nBEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n";
        let (components, warnings) = read_all(src);
        assert_eq!(components.len(), 2);
        assert_eq!(warnings[0].len(), 1);
        assert_eq!(warnings[0][0].code, Some(3));
        assert_eq!(warnings[0][0].property.as_deref(), Some("X-A"));
        assert!(warnings[1].is_empty());
    }

    #[test]
    fn unparseable_value_is_kept_raw() {
        let src = "BEGIN:VEVENT\r\nDTSTART:tomorrow\r\nEND:VEVENT\r\n";
        let (components, warnings) = read_all(src);
        let dtstart = components[0].property("DTSTART").unwrap();
        assert_eq!(
            dtstart.value,
            PropertyValue::Raw {
                data_type: None,
                value: "tomorrow".to_string()
            }
        );
        assert_eq!(warnings[0][0].code, Some(4));
        assert_eq!(warnings[0][0].line, Some(2));
    }

    #[test]
    fn extra_value_types_are_reported() {
        let src = "BEGIN:VEVENT\r\nDTSTART;VALUE=DATE,DATE-TIME:20240101\r\nEND:VEVENT\r\n";
        let (components, warnings) = read_all(src);
        let dtstart = components[0].property("DTSTART").unwrap();
        assert!(matches!(dtstart.value, PropertyValue::DateTime(ref dt) if !dt.has_time()));
        assert!(!dtstart.parameters.contains(KW_VALUE));
        assert_eq!(warnings[0].len(), 1);
        assert_eq!(warnings[0][0].code, Some(11));
        assert_eq!(warnings[0][0].property.as_deref(), Some("DTSTART"));
    }

    #[test]
    fn value_parameter_stays_only_on_raw_values() {
        let src = "BEGIN:VEVENT\r\nX-A;value=text;B=c:v\r\nDTSTART;VALUE=DATE:20240101\r\nEND:VEVENT\r\n";
        let (components, warnings) = read_all(src);
        assert!(warnings[0].is_empty(), "{:?}", warnings[0]);
        let raw = components[0].property("X-A").unwrap();
        assert_eq!(raw.parameters.get(KW_VALUE), Some("text"));
        assert!(!components[0].property("DTSTART").unwrap().parameters.contains(KW_VALUE));
    }

    #[test]
    fn unclosed_components_are_closed_at_eof() {
        let (components, warnings) = read_all("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:x\r\n");
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].components[0].properties.len(), 1);
        let codes: Vec<_> = warnings[0].iter().filter_map(|w| w.code).collect();
        assert_eq!(codes, [10, 10]);
    }

    #[test]
    fn stray_end_and_orphan_property_are_reported() {
        let (components, warnings) = read_all("END:VEVENT\r\nSUMMARY:x\r\nBEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n");
        assert_eq!(components.len(), 1);
        let codes: Vec<_> = warnings[0].iter().filter_map(|w| w.code).collect();
        assert_eq!(codes, [2, 5]);
    }

    #[test]
    fn version_switches_parse_version() {
        let src = "BEGIN:VCALENDAR\r\nVERSION:3.0\r\nEND:VCALENDAR\r\n";
        let (_, warnings) = read_all(src);
        assert_eq!(warnings[0][0].code, Some(9));
    }
}
