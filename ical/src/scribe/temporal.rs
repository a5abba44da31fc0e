// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scribes for DURATION, TRIGGER and UTC-OFFSET values.

use serde_json::Value;

use crate::keyword::{KW_DURATION, KW_TRIGGER};
use crate::parameter::{DataType, Parameters};
use crate::property::{PropertyValue, Trigger};
use crate::scribe::{ParseContext, Scribe, ScribeError, WriteContext, check_data_type};
use crate::value::{DateFormat, parse_date_time, parse_duration, parse_utc_offset};
use crate::version::ICalVersion;
use crate::xml::XmlElement;

/// DURATION
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationScribe;

impl Scribe for DurationScribe {
    fn name(&self) -> &str {
        KW_DURATION
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::Duration
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::Duration(duration) => Ok(duration.to_string()),
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&DataType>,
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        check_data_type(data_type, &[DataType::Duration])?;
        parse_duration(value)
            .map(PropertyValue::Duration)
            .map_err(ScribeError::cannot_parse)
    }
}

/// TRIGGER: a duration relative to the related component, or an absolute
/// date-time.
///
/// Without `VALUE`, a value that is not a duration is tried as a date-time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerScribe;

impl Scribe for TriggerScribe {
    fn name(&self) -> &str {
        KW_TRIGGER
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::Duration
    }

    fn data_type(&self, value: &PropertyValue, version: ICalVersion) -> DataType {
        match value {
            PropertyValue::Trigger(Trigger::DateTime(_)) => DataType::DateTime,
            _ => self.default_data_type(version),
        }
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::Trigger(Trigger::Duration(duration)) => Ok(duration.to_string()),
            PropertyValue::Trigger(Trigger::DateTime(dt)) => Ok(dt.format(DateFormat::Basic)),
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&DataType>,
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        check_data_type(data_type, &[DataType::Duration, DataType::DateTime])?;
        if data_type == Some(&DataType::DateTime) {
            return parse_date_time(value)
                .map(|dt| PropertyValue::Trigger(Trigger::DateTime(dt)))
                .map_err(ScribeError::cannot_parse);
        }

        match parse_duration(value) {
            Ok(duration) => Ok(PropertyValue::Trigger(Trigger::Duration(duration))),
            Err(err) => match parse_date_time(value) {
                Ok(dt) => {
                    tracing::debug!(value, "trigger without VALUE=DATE-TIME read as date-time");
                    Ok(PropertyValue::Trigger(Trigger::DateTime(dt)))
                }
                Err(_) => Err(ScribeError::cannot_parse(err)),
            },
        }
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        let data_type = self.data_type(value, ctx.version);
        let text = match value {
            PropertyValue::Trigger(Trigger::DateTime(dt)) => dt.format(DateFormat::Extended),
            other => self.write_text(other, ctx)?,
        };
        Ok(vec![XmlElement::with_text(data_type.structured_name(), text)])
    }

    fn write_json(&self, value: &PropertyValue, ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        let text = match value {
            PropertyValue::Trigger(Trigger::DateTime(dt)) => dt.format(DateFormat::Extended),
            other => self.write_text(other, ctx)?,
        };
        Ok(vec![Value::String(text)])
    }
}

/// UTC-OFFSET properties, TZOFFSETFROM and TZOFFSETTO.
#[derive(Debug, Clone, Copy)]
pub struct UtcOffsetScribe {
    name: &'static str,
}

impl UtcOffsetScribe {
    /// Scribe for the named property.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Scribe for UtcOffsetScribe {
    fn name(&self) -> &str {
        self.name
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::UtcOffset
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::UtcOffset(offset) => Ok(offset.format(DateFormat::Basic)),
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&DataType>,
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        check_data_type(data_type, &[DataType::UtcOffset])?;
        parse_utc_offset(value)
            .map(PropertyValue::UtcOffset)
            .map_err(ScribeError::cannot_parse)
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        _ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        match value {
            PropertyValue::UtcOffset(offset) => Ok(vec![XmlElement::with_text(
                DataType::UtcOffset.structured_name(),
                offset.format(DateFormat::Extended),
            )]),
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn write_json(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        match value {
            PropertyValue::UtcOffset(offset) => {
                Ok(vec![Value::String(offset.format(DateFormat::Extended))])
            }
            other => Err(ScribeError::unexpected(other)),
        }
    }
}
