// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Property marshalling between the wire syntaxes and typed values.
//!
//! A [`Scribe`] knows how one kind of property looks in the text, xCal and
//! jCal syntaxes. Scribes are looked up by property name in a
//! [`ScribeIndex`]; names without a scribe are handled by [`RawScribe`],
//! which keeps the value verbatim.
//!
//! Parsing never fails hard. A scribe signals [`ScribeError::CannotParse`]
//! to keep the value as [`PropertyValue::Raw`] with a warning, or
//! [`ScribeError::SkipMe`] to drop the property with a warning.

mod datetime;
mod index;
mod numeric;
mod recurrence;
mod structured;
mod temporal;
mod text;

pub use datetime::{DateListScribe, DateOrDateTimeScribe, DateTimeScribe, PeriodListScribe};
pub use index::ScribeIndex;
pub use numeric::{GeoScribe, IntegerScribe};
pub use recurrence::RecurrenceScribe;
pub use structured::{AttachmentScribe, RequestStatusScribe};
pub use temporal::{DurationScribe, TriggerScribe, UtcOffsetScribe};
pub use text::{RawScribe, TextListScribe, TextScribe, UriScribe};

use std::fmt::Display;

use serde_json::Value;

use crate::keyword::KW_VALUE;
use crate::parameter::{DataType, Parameters};
use crate::property::{Property, PropertyValue};
use crate::version::ICalVersion;
use crate::warning::{Warning, WarningKind};
use crate::xml::XmlElement;

/// Per-property failure of a scribe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScribeError {
    /// The value is kept verbatim and the warning recorded.
    #[error("{0}")]
    CannotParse(Warning),

    /// The property is dropped and the reason recorded.
    #[error("property skipped: {0}")]
    SkipMe(String),
}

impl ScribeError {
    /// A [`ScribeError::CannotParse`] with an unparseable-value warning.
    pub fn cannot_parse(reason: impl Display) -> Self {
        Self::CannotParse(
            WarningKind::UnparseableValue {
                reason: reason.to_string(),
            }
            .into(),
        )
    }

    /// A [`ScribeError::SkipMe`].
    pub fn skip(reason: impl Display) -> Self {
        Self::SkipMe(reason.to_string())
    }

    /// The value handed to a scribe is not one it writes.
    #[must_use]
    pub fn unexpected(value: &PropertyValue) -> Self {
        Self::SkipMe(format!("cannot write a {} value", value.kind()))
    }
}

/// State shared by the scribes while parsing one document.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    /// Version of the data being parsed.
    pub version: ICalVersion,
    /// Line of the property being parsed, for text input.
    pub line: Option<usize>,
    /// Name of the property being parsed.
    pub property: Option<String>,
    warnings: Vec<Warning>,
}

impl ParseContext {
    /// Create a context for the given version.
    #[must_use]
    pub fn new(version: ICalVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Record a warning, filling in the current line and property.
    pub fn warn(&mut self, warning: impl Into<Warning>) {
        let mut warning = warning.into();
        if warning.line.is_none() {
            warning.line = self.line;
        }
        if warning.property.is_none() {
            warning.property.clone_from(&self.property);
        }
        self.warnings.push(warning);
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Take the recorded warnings, leaving none behind.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Forget recorded warnings and the current location.
    pub fn clear(&mut self) {
        self.warnings.clear();
        self.line = None;
        self.property = None;
    }
}

/// State shared by the scribes while writing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteContext {
    /// Version being written.
    pub version: ICalVersion,
}

impl WriteContext {
    /// Create a context for the given version.
    #[must_use]
    pub const fn new(version: ICalVersion) -> Self {
        Self { version }
    }
}

/// Marshaller for one kind of property.
///
/// The text methods are mandatory. The xCal and jCal methods default to
/// carrying the text form as a single value of the resolved data type, which
/// fits every value whose text form needs no escaping.
pub trait Scribe: Send + Sync {
    /// Upper-case property name this scribe is registered under.
    fn name(&self) -> &str;

    /// Data type written when no `VALUE` parameter is present.
    fn default_data_type(&self, version: ICalVersion) -> DataType;

    /// Data type of a concrete value; defaults to [`Scribe::default_data_type`].
    fn data_type(&self, _value: &PropertyValue, version: ICalVersion) -> DataType {
        self.default_data_type(version)
    }

    /// Parameters to write for `property`, derived from a copy of its own.
    ///
    /// `VALUE` is added when the value's data type differs from the default
    /// and removed otherwise.
    fn prepare_parameters(&self, property: &Property, ctx: &WriteContext) -> Parameters {
        let mut parameters = property.parameters.clone();
        set_value_parameter(
            &mut parameters,
            &self.data_type(&property.value, ctx.version),
            &self.default_data_type(ctx.version),
            ctx.version,
        );
        parameters
    }

    /// Write the value in the text syntax, escaped as needed.
    ///
    /// # Errors
    /// [`ScribeError::SkipMe`] if the value is not one this scribe writes.
    fn write_text(&self, value: &PropertyValue, ctx: &WriteContext) -> Result<String, ScribeError>;

    /// Parse a value from the text syntax.
    ///
    /// # Errors
    /// [`ScribeError`] describing how to treat the property.
    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&DataType>,
        parameters: &Parameters,
        ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError>;

    /// Value elements of the xCal property element.
    ///
    /// # Errors
    /// [`ScribeError::SkipMe`] if the value is not one this scribe writes.
    fn write_xml(
        &self,
        value: &PropertyValue,
        ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        let data_type = self.data_type(value, ctx.version);
        let text = self.write_text(value, ctx)?;
        Ok(vec![XmlElement::with_text(data_type.structured_name(), text)])
    }

    /// Parse the xCal property element, whose `<parameters>` have already
    /// been read into `parameters`.
    ///
    /// # Errors
    /// [`ScribeError`] describing how to treat the property.
    fn parse_xml(
        &self,
        element: &XmlElement,
        parameters: &Parameters,
        ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        let Some((data_type, text)) = first_xml_value(element) else {
            return Err(ScribeError::cannot_parse("no value element"));
        };
        self.parse_text(text, data_type.as_ref(), parameters, ctx)
    }

    /// Values following the type string of the jCal property array.
    ///
    /// # Errors
    /// [`ScribeError::SkipMe`] if the value is not one this scribe writes.
    fn write_json(&self, value: &PropertyValue, ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        Ok(vec![Value::String(self.write_text(value, ctx)?)])
    }

    /// Parse the values of a jCal property array.
    ///
    /// # Errors
    /// [`ScribeError`] describing how to treat the property.
    fn parse_json(
        &self,
        data_type: Option<&DataType>,
        values: &[Value],
        parameters: &Parameters,
        ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        let text = values.iter().map(json_text).collect::<Vec<_>>().join(",");
        self.parse_text(&text, data_type, parameters, ctx)
    }
}

/// Add or remove `VALUE` depending on whether `actual` is the default.
pub(crate) fn set_value_parameter(
    parameters: &mut Parameters,
    actual: &DataType,
    default: &DataType,
    version: ICalVersion,
) {
    if actual == default {
        parameters.remove(KW_VALUE);
    } else {
        parameters.replace(KW_VALUE, actual.text_name(version));
    }
}

/// Reject an explicit `VALUE` outside `accepted`.
pub(crate) fn check_data_type(
    data_type: Option<&DataType>,
    accepted: &[DataType],
) -> Result<(), ScribeError> {
    match data_type {
        Some(dt) if !accepted.contains(dt) => Err(ScribeError::cannot_parse(format_args!(
            "unexpected value type {dt}"
        ))),
        _ => Ok(()),
    }
}

/// Data type and text of the first value element of an xCal property.
pub(crate) fn first_xml_value(element: &XmlElement) -> Option<(Option<DataType>, &str)> {
    element
        .children
        .first()
        .map(|child| (DataType::from_structured_name(&child.name), child.text.as_str()))
}

/// Text of a scalar jCal value.
pub(crate) fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Turn a scribe result into a property, applying the failure contract.
///
/// `raw` produces the verbatim value kept on [`ScribeError::CannotParse`].
pub(crate) fn finish_property(
    name: String,
    parameters: Parameters,
    result: Result<PropertyValue, ScribeError>,
    raw: impl FnOnce() -> PropertyValue,
    ctx: &mut ParseContext,
) -> Option<Property> {
    let value = match result {
        Ok(value) => value,
        Err(ScribeError::CannotParse(warning)) => {
            tracing::debug!(property = %name, %warning, "keeping unparseable value verbatim");
            ctx.warn(warning);
            raw()
        }
        Err(ScribeError::SkipMe(reason)) => {
            tracing::debug!(property = %name, %reason, "skipping property");
            ctx.warn(WarningKind::SkippedProperty { reason });
            return None;
        }
    };
    Some(Property {
        name,
        parameters,
        value,
    })
}
