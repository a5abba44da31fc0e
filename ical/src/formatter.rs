// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar (RFC 5545) text output: line folding and content line emission.
//!
//! [`FoldingWriter`] folds logical lines and terminates them with CRLF.
//! [`ContentWriter`] builds validated, quoted and caret-encoded content lines
//! on top of it.

mod emitter;

use std::io::{self, Write};

pub use crate::formatter::emitter::{ContentWriter, ScrubEvent, WriteError};
pub(crate) use crate::formatter::emitter::validate_name;

use crate::version::ICalVersion;

/// Line folding style for RFC 5545 formatting.
///
/// RFC 5545 specifies that folded lines should start with CRLF followed by
/// a whitespace character (SPACE or TAB).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FoldingStyle {
    /// CRLF + SPACE (RFC 5545 default)
    #[default]
    Space,
    /// CRLF + TAB
    Tab,
}

impl FoldingStyle {
    /// Get the folding sequence for this style.
    #[must_use]
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Space => "\r\n ",
            Self::Tab => "\r\n\t",
        }
    }

    /// Get the length of the continuation character after CRLF.
    #[must_use]
    pub(crate) const fn continuation_len() -> usize {
        1 // Both SPACE and TAB are 1 byte
    }
}

/// Where and how to fold long lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldingScheme {
    /// Maximum line length in octets, including the continuation character.
    /// `None` disables folding.
    pub max_line_length: Option<usize>,
    /// Continuation character written after each inserted CRLF.
    pub style: FoldingStyle,
}

impl Default for FoldingScheme {
    fn default() -> Self {
        Self {
            max_line_length: Some(75),
            style: FoldingStyle::Space,
        }
    }
}

impl FoldingScheme {
    /// Folding scheme with a custom line length.
    ///
    /// # Errors
    /// The length must leave room for content after the continuation character.
    pub fn new(max_line_length: usize, style: FoldingStyle) -> Result<Self, WriteError> {
        if max_line_length <= FoldingStyle::continuation_len() {
            return Err(WriteError::InvalidFoldingScheme { max_line_length });
        }
        Ok(Self {
            max_line_length: Some(max_line_length),
            style,
        })
    }

    /// Never fold.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_line_length: None,
            style: FoldingStyle::Space,
        }
    }
}

/// Fold one logical line, without the final CRLF.
///
/// Lines are split on UTF-8 character boundaries only. Every physical line is
/// at most `max_line_length` octets, unless a single character is wider than
/// the room left.
#[must_use]
pub fn fold_line(line: &str, scheme: &FoldingScheme) -> String {
    let Some(max_len) = scheme.max_line_length else {
        return line.to_string();
    };
    if line.len() <= max_len {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / max_len * 3);
    let mut pos = 0;
    while pos < line.len() {
        let budget = if pos == 0 {
            max_len
        } else {
            out.push_str(scheme.style.as_str());
            max_len.saturating_sub(FoldingStyle::continuation_len())
        };
        let end = safe_split(line, pos, budget);
        out.push_str(line.get(pos..end).unwrap_or_default());
        pos = end;
    }
    out
}

/// Largest char boundary at most `budget` bytes after `pos`, but always past `pos`.
fn safe_split(line: &str, pos: usize, budget: usize) -> usize {
    let mut end = (pos + budget).min(line.len());
    while end > pos && !line.is_char_boundary(end) {
        end -= 1;
    }
    if end == pos {
        // Wider than the budget; emit the whole character
        end = pos + line.get(pos..).and_then(|s| s.chars().next()).map_or(1, char::len_utf8);
    }
    end
}

/// Writes logical lines, folding them and appending CRLF.
#[derive(Debug)]
pub struct FoldingWriter<W: Write> {
    writer: W,
    scheme: FoldingScheme,
}

impl<W: Write> FoldingWriter<W> {
    /// Create a new folding writer.
    pub const fn new(writer: W, scheme: FoldingScheme) -> Self {
        Self { writer, scheme }
    }

    /// Write one logical line.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(fold_line(line, &self.scheme).as_bytes())?;
        self.writer.write_all(b"\r\n")
    }

    /// Flush the underlying writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Get a mutable reference to the underlying writer.
    #[must_use]
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consumes this writer, returning the underlying writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Options for writing the text syntax.
#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    /// Line folding.
    ///
    /// Default: 75 octets, CRLF + SPACE.
    pub folding: FoldingScheme,

    /// Encode parameter values with RFC 6868 caret sequences.
    ///
    /// Default: `true`. Never applied to vCalendar 1.0 output.
    pub caret_encoding: bool,

    /// Version of the output.
    ///
    /// Default: `ICalVersion::V2_0`.
    pub version: ICalVersion,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            folding: FoldingScheme::default(),
            caret_encoding: true,
            version: ICalVersion::V2_0,
        }
    }
}

impl WriterOptions {
    /// Set the line folding scheme.
    #[must_use]
    pub const fn folding(mut self, folding: FoldingScheme) -> Self {
        self.folding = folding;
        self
    }

    /// Set the caret encoding option.
    #[must_use]
    pub const fn caret_encoding(mut self, enabled: bool) -> Self {
        self.caret_encoding = enabled;
        self
    }

    /// Set the output version.
    #[must_use]
    pub const fn version(mut self, version: ICalVersion) -> Self {
        self.version = version;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::unfold::Unfolder;

    fn unfold_all(src: &str) -> Vec<String> {
        Unfolder::new(src.as_bytes())
            .map(|l| l.map(|l| l.text))
            .collect::<io::Result<_>>()
            .unwrap()
    }

    #[test]
    fn short_lines_are_untouched() {
        let scheme = FoldingScheme::default();
        assert_eq!(fold_line("SUMMARY:Hi", &scheme), "SUMMARY:Hi");
    }

    #[test]
    fn folds_at_max_length() {
        let scheme = FoldingScheme::new(10, FoldingStyle::Space).unwrap();
        let folded = fold_line("0123456789abcdefghijKLM", &scheme);
        assert_eq!(folded, "0123456789\r\n abcdefghi\r\n jKLM");
        for physical in folded.split("\r\n") {
            assert!(physical.len() <= 10);
        }
    }

    #[test]
    fn never_splits_utf8_sequences() {
        let scheme = FoldingScheme::new(5, FoldingStyle::Tab).unwrap();
        let line = "ab日本語cd";
        let folded = fold_line(line, &scheme);
        for physical in folded.split("\r\n") {
            assert!(physical.len() <= 5, "{physical:?}");
        }
        assert_eq!(folded, "ab日\r\n\t本\r\n\t語c\r\n\td");
    }

    #[test]
    fn keeps_whitespace_at_fold_points() {
        let scheme = FoldingScheme::new(4, FoldingStyle::Space).unwrap();
        let line = "a   b  \t c";
        let mut buf = Vec::new();
        FoldingWriter::new(&mut buf, scheme).write_line(line).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("\r\n"));
        assert_eq!(unfold_all(&text), [line]);
    }

    #[test]
    fn fold_then_unfold_round_trips() {
        let lines = [
            "DESCRIPTION:".to_string() + &"x".repeat(200),
            "SUMMARY:".to_string() + &"多字节文本 ".repeat(30),
            "X:".to_string() + &" ".repeat(100),
        ];
        for scheme in [
            FoldingScheme::default(),
            FoldingScheme::new(2, FoldingStyle::Tab).unwrap(),
            FoldingScheme::none(),
        ] {
            for line in &lines {
                let mut buf = Vec::new();
                FoldingWriter::new(&mut buf, scheme).write_line(line).unwrap();
                let text = String::from_utf8(buf).unwrap();
                assert_eq!(unfold_all(&text), [line.as_str()]);
            }
        }
    }

    #[test]
    fn rejects_too_short_lines() {
        assert!(FoldingScheme::new(1, FoldingStyle::Space).is_err());
    }
}
