// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Content line emission with name validation, parameter scrubbing, caret
//! encoding and quoting.

use std::fmt;
use std::io::{self, Write};

use crate::formatter::{FoldingWriter, WriterOptions};
use crate::keyword::{KW_BEGIN, KW_END};
use crate::parameter::Parameters;
use crate::syntax::escape::{caret_encode, scrub_control_chars};

/// Errors raised while writing the text syntax.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// A component, property or parameter name with characters outside `[A-Za-z0-9-]`.
    #[error("invalid {kind} name \"{name}\"")]
    InvalidName {
        /// What was being named.
        kind: &'static str,
        /// The rejected name.
        name: String,
    },

    /// Folding line length too short to hold any content.
    #[error("folding line length {max_line_length} leaves no room for content")]
    InvalidFoldingScheme {
        /// The rejected length.
        max_line_length: usize,
    },

    /// The underlying writer failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Notification that a parameter value was altered before writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubEvent {
    /// Property the parameter belongs to.
    pub property: String,
    /// Parameter name.
    pub parameter: String,
    /// Value as supplied.
    pub original: String,
    /// Value as written, before quoting.
    pub modified: String,
}

type ScrubHook = Box<dyn FnMut(&ScrubEvent) + Send>;

/// Writes components and properties as folded content lines.
pub struct ContentWriter<W: Write> {
    writer: FoldingWriter<W>,
    options: WriterOptions,
    scrub_hook: Option<ScrubHook>,
}

impl<W: Write> fmt::Debug for ContentWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentWriter")
            .field("options", &self.options)
            .field("scrub_hook", &self.scrub_hook.is_some())
            .finish_non_exhaustive()
    }
}

impl<W: Write> ContentWriter<W> {
    /// Create a new writer.
    pub fn new(writer: W, options: WriterOptions) -> Self {
        Self {
            writer: FoldingWriter::new(writer, options.folding),
            options,
            scrub_hook: None,
        }
    }

    /// Options in effect.
    #[must_use]
    pub const fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Register a callback invoked whenever a parameter value is altered.
    pub fn set_scrub_hook(&mut self, hook: impl FnMut(&ScrubEvent) + Send + 'static) {
        self.scrub_hook = Some(Box::new(hook));
    }

    /// Write `BEGIN:<name>`.
    ///
    /// # Errors
    /// Fails on an invalid name or an I/O error.
    pub fn write_begin_component(&mut self, name: &str) -> Result<(), WriteError> {
        validate_name("component", name)?;
        self.writer.write_line(&format!("{KW_BEGIN}:{name}"))?;
        Ok(())
    }

    /// Write `END:<name>`.
    ///
    /// # Errors
    /// Fails on an invalid name or an I/O error.
    pub fn write_end_component(&mut self, name: &str) -> Result<(), WriteError> {
        validate_name("component", name)?;
        self.writer.write_line(&format!("{KW_END}:{name}"))?;
        Ok(())
    }

    /// Write a property line. The value is written exactly as given.
    ///
    /// # Errors
    /// Fails on an invalid property or parameter name, before anything is
    /// written, or on an I/O error.
    pub fn write_property(
        &mut self,
        name: &str,
        parameters: &Parameters,
        value: &str,
    ) -> Result<(), WriteError> {
        validate_name("property", name)?;
        for (param, _) in parameters.iter() {
            validate_name("parameter", param)?;
        }

        let mut line = String::with_capacity(name.len() + value.len() + 16);
        line.push_str(name);
        for (param, values) in parameters.iter() {
            if parameters.is_valueless(param) && !values.is_empty() {
                line.push(';');
                line.push_str(param);
            }
            line.push(';');
            line.push_str(param);
            for (i, v) in values.iter().enumerate() {
                line.push(if i == 0 { '=' } else { ',' });
                let encoded = self.encode_parameter_value(name, param, v);
                line.push_str(&quote_if_needed(&encoded));
            }
        }
        line.push(':');
        line.push_str(value);

        self.writer.write_line(&line)?;
        Ok(())
    }

    fn encode_parameter_value(&mut self, property: &str, parameter: &str, value: &str) -> String {
        let caret = self.options.caret_encoding && self.options.version.supports_caret_encoding();

        let scrubbed = scrub_control_chars(value, caret);
        let modified = if caret {
            caret_encode(&scrubbed).into_owned()
        } else {
            scrubbed.replace('"', "'")
        };

        let changed = scrubbed.len() != value.len() || (!caret && modified != scrubbed);
        if changed {
            tracing::debug!(property, parameter, "parameter value scrubbed");
            if let Some(hook) = self.scrub_hook.as_mut() {
                hook(&ScrubEvent {
                    property: property.to_string(),
                    parameter: parameter.to_string(),
                    original: value.to_string(),
                    modified: modified.clone(),
                });
            }
        }
        modified
    }

    /// Flush the underlying writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consumes this writer, returning the underlying writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer.into_writer()
    }
}

pub(crate) fn validate_name(kind: &'static str, name: &str) -> Result<(), WriteError> {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        Ok(())
    } else {
        Err(WriteError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

/// Quote a parameter value that contains `,`, `;` or `:`.
fn quote_if_needed(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains([',', ';', ':']) {
        format!("\"{s}\"").into()
    } else {
        s.into()
    }
}
