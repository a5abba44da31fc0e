// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Reassemble folded physical lines into logical content lines.

use std::io::{self, BufRead};

/// A logical content line with the 1-based number of its first physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Unfolded line, without line terminator.
    pub text: String,
    /// Physical line number where this logical line starts.
    pub line_number: usize,
}

/// Pull-based unfolder over any buffered reader.
///
/// CRLF and bare LF both end a physical line. A physical line starting with a
/// single SPACE or TAB continues the previous one, with that one character
/// removed. Empty physical lines are skipped.
#[derive(Debug)]
pub struct Unfolder<R> {
    reader: R,
    /// Physical line read ahead while looking for continuations.
    pending: Option<(String, usize)>,
    line_number: usize,
    eof: bool,
}

impl<R: BufRead> Unfolder<R> {
    /// Create a new unfolder.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            pending: None,
            line_number: 0,
            eof: false,
        }
    }

    /// Number of physical lines consumed so far.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    fn read_physical(&mut self) -> io::Result<Option<(String, usize)>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        if self.eof {
            return Ok(None);
        }

        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            self.eof = true;
            return Ok(None);
        }
        self.line_number += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some((buf, self.line_number)))
    }

    /// Read the next logical line, or `None` at end of input.
    ///
    /// # Errors
    /// Propagates I/O errors of the underlying reader, including invalid UTF-8.
    pub fn next_line(&mut self) -> io::Result<Option<LogicalLine>> {
        let (mut text, line_number) = loop {
            match self.read_physical()? {
                Some((line, _)) if line.is_empty() => {}
                Some(line) => break line,
                None => return Ok(None),
            }
        };

        loop {
            match self.read_physical()? {
                Some((line, _)) if line.starts_with([' ', '\t']) => {
                    text.push_str(line.get(1..).unwrap_or_default());
                }
                Some((line, _)) if line.is_empty() => {}
                Some(line) => {
                    self.pending = Some(line);
                    break;
                }
                None => break,
            }
        }

        Ok(Some(LogicalLine { text, line_number }))
    }
}

impl<R: BufRead> Iterator for Unfolder<R> {
    type Item = io::Result<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
