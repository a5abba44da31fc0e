// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Raw iCalendar line protocol: unfolding, content line scanning and
//! BEGIN/END tokenization, with no knowledge of property semantics.
//!
//! ```text
//! Bytes → Unfolder → Logical Lines → Lexer/Scanner → ContentReader → ReadEvent
//! ```

pub mod escape;
pub mod lexer;
mod reader;
pub mod scanner;
pub mod unfold;

pub use crate::syntax::reader::{ContentReader, ReadEvent, ReadHandler, ReaderOptions, UnmatchedEnd};

use crate::parameter::{DataType, Parameters};

/// A property as it appears on the wire, before any value parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    /// Property name, original casing preserved.
    pub name: String,
    /// Data type named by the first value of the `VALUE` parameter.
    pub data_type: Option<DataType>,
    /// Parameters in written order, `VALUE` included, caret-decoded when enabled.
    pub parameters: Parameters,
    /// Value text exactly as written.
    pub value: String,
    /// Line number of the content line.
    pub line: usize,
}
