// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Resumable tokenizer turning content lines into component and property events.
//!
//! Nesting is tracked with an explicit stack, so arbitrarily deep input never
//! grows the call stack. A consumer may stop after any event and resume later
//! with the nesting state intact.

use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::ops::ControlFlow;

use crate::keyword::{KW_BEGIN, KW_END, KW_VALUE, KW_VERSION};
use crate::parameter::Parameters;
use crate::syntax::RawProperty;
use crate::syntax::escape::caret_decode;
use crate::syntax::scanner::{ContentLineError, scan_content_line};
use crate::syntax::unfold::Unfolder;
use crate::version::ICalVersion;

/// Options for reading the text syntax.
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    /// Decode RFC 6868 caret sequences in parameter values.
    ///
    /// Default: `true`. Never applied to vCalendar 1.0 data.
    pub caret_decoding: bool,

    /// Version assumed until a `VERSION` property says otherwise.
    ///
    /// Default: `ICalVersion::V2_0`.
    pub version: ICalVersion,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            caret_decoding: true,
            version: ICalVersion::V2_0,
        }
    }
}

impl ReaderOptions {
    /// Set the caret decoding option.
    #[must_use]
    pub const fn caret_decoding(mut self, enabled: bool) -> Self {
        self.caret_decoding = enabled;
        self
    }

    /// Set the initial version.
    #[must_use]
    pub const fn version(mut self, version: ICalVersion) -> Self {
        self.version = version;
        self
    }
}

/// An `END` line that did not close the innermost open component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedEnd {
    /// Name written on the END line.
    pub found: String,
    /// Innermost open component, `None` when nothing was open.
    pub expected: Option<String>,
}

/// Event produced by [`ContentReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    /// `BEGIN:<name>`
    BeginComponent {
        /// Component name as written.
        name: String,
        /// Line number.
        line: usize,
    },

    /// `END:<name>`; closes the innermost open component.
    EndComponent {
        /// Name of the component being closed.
        name: String,
        /// Line number.
        line: usize,
        /// Set when the END line named a different component.
        unmatched: Option<UnmatchedEnd>,
    },

    /// A property line.
    Property(RawProperty),

    /// A parameter without `=value`, reported before its property.
    ValuelessParameter {
        /// Property name.
        property: String,
        /// Parameter name.
        parameter: String,
        /// Line number.
        line: usize,
    },

    /// A line that could not be tokenized; reading continues after it.
    InvalidLine {
        /// The logical line.
        text: String,
        /// Line number.
        line: usize,
        /// What was wrong.
        error: ContentLineError,
    },
}

/// Receiver of [`ReadEvent`]s driven by [`ContentReader::drive`].
///
/// Returning [`ControlFlow::Break`] suspends reading right after that event.
pub trait ReadHandler {
    /// Handle one event.
    fn handle(&mut self, event: ReadEvent) -> ControlFlow<()>;
}

impl<F: FnMut(ReadEvent) -> ControlFlow<()>> ReadHandler for F {
    fn handle(&mut self, event: ReadEvent) -> ControlFlow<()> {
        self(event)
    }
}

/// Pull-based, resumable content line tokenizer.
#[derive(Debug)]
pub struct ContentReader<R> {
    lines: Unfolder<R>,
    options: ReaderOptions,
    version: ICalVersion,
    stack: Vec<String>,
    queued: VecDeque<ReadEvent>,
}

impl<R: BufRead> ContentReader<R> {
    /// Create a reader with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReaderOptions::default())
    }

    /// Create a reader with options.
    pub fn with_options(reader: R, options: ReaderOptions) -> Self {
        Self {
            lines: Unfolder::new(reader),
            options,
            version: options.version,
            stack: Vec::new(),
            queued: VecDeque::new(),
        }
    }

    /// Names of the currently open components, outermost first.
    #[must_use]
    pub fn open_components(&self) -> &[String] {
        &self.stack
    }

    /// Version announced by the most recent `VERSION` property.
    #[must_use]
    pub const fn version(&self) -> ICalVersion {
        self.version
    }

    /// Read the next event, or `None` at end of input.
    ///
    /// # Errors
    /// Propagates I/O errors of the underlying reader.
    pub fn next_event(&mut self) -> io::Result<Option<ReadEvent>> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Ok(Some(event));
            }
            let Some(line) = self.lines.next_line()? else {
                return Ok(None);
            };
            self.process_line(line.text, line.line_number);
        }
    }

    /// Feed events to `handler` until it breaks or input ends.
    ///
    /// Returns [`ControlFlow::Break`] if the handler stopped; calling `drive`
    /// again resumes with the next event.
    ///
    /// # Errors
    /// Propagates I/O errors of the underlying reader.
    pub fn drive(&mut self, handler: &mut impl ReadHandler) -> io::Result<ControlFlow<()>> {
        while let Some(event) = self.next_event()? {
            if handler.handle(event).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn process_line(&mut self, text: String, line: usize) {
        let content = match scan_content_line(&text) {
            Ok(content) => content,
            Err(error) => {
                tracing::debug!(line, %error, "skipping malformed line");
                self.queued
                    .push_back(ReadEvent::InvalidLine { text, line, error });
                return;
            }
        };

        if content.name.eq_ignore_ascii_case(KW_BEGIN) {
            let name = content.value.trim().to_string();
            if name.is_empty() {
                self.queued.push_back(ReadEvent::InvalidLine {
                    text,
                    line,
                    error: ContentLineError::EmptyName,
                });
                return;
            }
            tracing::trace!(line, %name, "begin component");
            self.stack.push(name.clone());
            self.queued
                .push_back(ReadEvent::BeginComponent { name, line });
            return;
        }

        if content.name.eq_ignore_ascii_case(KW_END) {
            let found = content.value.trim().to_string();
            let event = match self.stack.pop() {
                Some(open) if open.eq_ignore_ascii_case(&found) => ReadEvent::EndComponent {
                    name: open,
                    line,
                    unmatched: None,
                },
                Some(open) => ReadEvent::EndComponent {
                    name: open.clone(),
                    line,
                    unmatched: Some(UnmatchedEnd {
                        found,
                        expected: Some(open),
                    }),
                },
                None => ReadEvent::EndComponent {
                    name: found.clone(),
                    line,
                    unmatched: Some(UnmatchedEnd {
                        found,
                        expected: None,
                    }),
                },
            };
            tracing::trace!(line, "end component");
            self.queued.push_back(event);
            return;
        }

        let decode = self.options.caret_decoding && self.version.supports_caret_encoding();
        let mut parameters = Parameters::new();
        for param in &content.parameters {
            match &param.values {
                Some(values) => {
                    for value in values {
                        let value = if decode {
                            caret_decode(value)
                        } else {
                            (*value).into()
                        };
                        parameters.put(param.name, value);
                    }
                }
                None => {
                    self.queued.push_back(ReadEvent::ValuelessParameter {
                        property: content.name.to_string(),
                        parameter: param.name.to_ascii_uppercase(),
                        line,
                    });
                    parameters.put_valueless(param.name);
                }
            }
        }

        let data_type = parameters.get(KW_VALUE).and_then(|value| value.parse().ok());

        if content.name.eq_ignore_ascii_case(KW_VERSION) {
            if let Ok(version) = content.value.parse() {
                self.version = version;
            }
        }

        self.queued.push_back(ReadEvent::Property(RawProperty {
            name: content.name.to_string(),
            data_type,
            parameters,
            value: content.value.to_string(),
            line,
        }));
    }
}

impl<R: BufRead> Iterator for ContentReader<R> {
    type Item = io::Result<ReadEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::DataType;

    fn events(src: &str) -> Vec<ReadEvent> {
        ContentReader::new(src.as_bytes())
            .collect::<io::Result<_>>()
            .unwrap()
    }

    fn begin(name: &str, line: usize) -> ReadEvent {
        ReadEvent::BeginComponent {
            name: name.to_string(),
            line,
        }
    }

    fn end(name: &str, line: usize) -> ReadEvent {
        ReadEvent::EndComponent {
            name: name.to_string(),
            line,
            unmatched: None,
        }
    }

    #[test]
    fn emits_component_and_property_events() {
        let src = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nSUMMARY:Hi\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let events = events(src);
        assert_eq!(events.len(), 6);
        assert_eq!(events[0], begin("VCALENDAR", 1));
        assert_eq!(events[2], begin("VEVENT", 3));
        assert_eq!(events[4], end("VEVENT", 5));
        assert_eq!(events[5], end("VCALENDAR", 6));
        let ReadEvent::Property(summary) = &events[3] else {
            panic!("expected property, got {:?}", events[3]);
        };
        assert_eq!(summary.name, "SUMMARY");
        assert_eq!(summary.value, "Hi");
        assert_eq!(summary.line, 4);
    }

    #[test]
    fn begin_and_end_are_case_insensitive() {
        let events = events("begin:vcalendar\nEnd:VCALENDAR\n");
        assert_eq!(events, [begin("vcalendar", 1), end("vcalendar", 2)]);
    }

    #[test]
    fn malformed_line_is_reported_and_skipped() {
        let events = events("BEGIN:VCALENDAR\r\nbad-line\r\nEND:VCALENDAR\r\n");
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            ReadEvent::InvalidLine {
                text: "bad-line".to_string(),
                line: 2,
                error: ContentLineError::MissingColon,
            }
        );
    }

    #[test]
    fn unmatched_end_still_closes_innermost_component() {
        let events = events("BEGIN:A\nBEGIN:B\nEND:A\nEND:A\nEND:C\n");
        assert_eq!(
            events[2],
            ReadEvent::EndComponent {
                name: "B".to_string(),
                line: 3,
                unmatched: Some(UnmatchedEnd {
                    found: "A".to_string(),
                    expected: Some("B".to_string()),
                }),
            }
        );
        assert_eq!(events[3], end("A", 4));
        assert_eq!(
            events[4],
            ReadEvent::EndComponent {
                name: "C".to_string(),
                line: 5,
                unmatched: Some(UnmatchedEnd {
                    found: "C".to_string(),
                    expected: None,
                }),
            }
        );
    }

    #[test]
    fn valueless_parameter_is_signalled_before_property() {
        let events = events("X-PROP;FOO;bar=1:value\n");
        assert_eq!(
            events[0],
            ReadEvent::ValuelessParameter {
                property: "X-PROP".to_string(),
                parameter: "FOO".to_string(),
                line: 1,
            }
        );
        let ReadEvent::Property(prop) = &events[1] else {
            panic!("expected property");
        };
        assert!(prop.parameters.is_valueless("FOO"));
        assert_eq!(prop.parameters.get("BAR"), Some("1"));
    }

    #[test]
    fn value_parameter_names_the_data_type() {
        let events = events("DTSTART;value=date;TZID=UTC:20240101\n");
        let ReadEvent::Property(prop) = &events[0] else {
            panic!("expected property");
        };
        assert_eq!(prop.data_type, Some(DataType::Date));
        let names: Vec<_> = prop.parameters.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["VALUE", "TZID"]);
        assert_eq!(prop.parameters.get("VALUE"), Some("date"));
    }

    #[test]
    fn caret_decoding_follows_options_and_version() {
        let src = "X;CN=^'Joe^':v\n";
        let decoded = events(src);
        let ReadEvent::Property(prop) = &decoded[0] else {
            panic!("expected property");
        };
        assert_eq!(prop.parameters.get("CN"), Some("\"Joe\""));

        let opts = ReaderOptions::default().caret_decoding(false);
        let raw: Vec<_> = ContentReader::with_options(src.as_bytes(), opts)
            .collect::<io::Result<_>>()
            .unwrap();
        let ReadEvent::Property(prop) = &raw[0] else {
            panic!("expected property");
        };
        assert_eq!(prop.parameters.get("CN"), Some("^'Joe^'"));

        let v1 = events("VERSION:1.0\nX;CN=^'Joe^':v\n");
        let ReadEvent::Property(prop) = &v1[1] else {
            panic!("expected property");
        };
        assert_eq!(prop.parameters.get("CN"), Some("^'Joe^'"));
    }

    #[test]
    fn stop_and_resume_keeps_nesting() {
        let src = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:A\r\nEND:VEVENT\r\nX-AFTER:1\r\nEND:VCALENDAR\r\n";
        let mut reader = ContentReader::new(src.as_bytes());

        let mut seen = Vec::new();
        let mut stop_on_summary = |event: ReadEvent| {
            let stop = matches!(&event, ReadEvent::Property(p) if p.name == "SUMMARY");
            seen.push(event);
            if stop {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };
        let flow = reader.drive(&mut stop_on_summary).unwrap();
        assert!(flow.is_break());
        assert_eq!(seen.len(), 3);
        assert_eq!(reader.open_components(), ["VCALENDAR", "VEVENT"]);

        let mut rest = Vec::new();
        let flow = reader
            .drive(&mut |event| {
                rest.push(event);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert!(flow.is_continue());
        assert_eq!(rest.len(), 3);
        assert_eq!(rest[0], end("VEVENT", 4));
        assert!(reader.open_components().is_empty());
    }

    #[test]
    fn deep_nesting_uses_no_recursion() {
        let depth = 100_000;
        let mut src = String::new();
        for _ in 0..depth {
            src.push_str("BEGIN:X\n");
        }
        for _ in 0..depth {
            src.push_str("END:X\n");
        }
        let mut reader = ContentReader::new(src.as_bytes());
        let mut count = 0;
        while let Some(event) = reader.next_event().unwrap() {
            assert!(!matches!(event, ReadEvent::EndComponent { unmatched: Some(_), .. }));
            count += 1;
        }
        assert_eq!(count, 2 * depth);
    }

    #[test]
    fn unclosed_components_remain_open_at_eof() {
        let mut reader = ContentReader::new("BEGIN:VCALENDAR\nSUMMARY:x\n".as_bytes());
        while reader.next_event().unwrap().is_some() {}
        assert_eq!(reader.open_components(), ["VCALENDAR"]);
    }
}
