// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scribe for RECUR values.
//!
//! In xCal each rule part is a child element of `<recur>`; in jCal the rule
//! is an object keyed by lower-case part name, with numeric parts as numbers
//! and repeated parts as arrays.

use serde_json::{Map, Value};

use crate::keyword::{
    KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND,
    KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT, KW_RRULE_INTERVAL,
};
use crate::parameter::{DataType, Parameters};
use crate::property::PropertyValue;
use crate::scribe::{ParseContext, Scribe, ScribeError, WriteContext, check_data_type, json_text};
use crate::value::{DateFormat, RecurParts, Recurrence};
use crate::version::ICalVersion;
use crate::xml::XmlElement;

const NUMERIC_PARTS: [&str; 10] = [
    KW_RRULE_COUNT,
    KW_RRULE_INTERVAL,
    KW_RRULE_BYSECOND,
    KW_RRULE_BYMINUTE,
    KW_RRULE_BYHOUR,
    KW_RRULE_BYMONTHDAY,
    KW_RRULE_BYYEARDAY,
    KW_RRULE_BYWEEKNO,
    KW_RRULE_BYMONTH,
    KW_RRULE_BYSETPOS,
];

/// Recurrence rule properties, RRULE and EXRULE.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceScribe {
    name: &'static str,
}

impl RecurrenceScribe {
    /// Scribe for the named property.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    fn rule<'a>(value: &'a PropertyValue) -> Result<&'a Recurrence, ScribeError> {
        value
            .as_recurrence()
            .ok_or_else(|| ScribeError::unexpected(value))
    }

    fn from_parts(parts: &RecurParts, ctx: &mut ParseContext) -> PropertyValue {
        let mut warnings = Vec::new();
        let rule = Recurrence::from_parts(parts, &mut warnings);
        for warning in warnings {
            ctx.warn(warning);
        }
        PropertyValue::Recurrence(rule)
    }
}

impl Scribe for RecurrenceScribe {
    fn name(&self) -> &str {
        self.name
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::Recur
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        Self::rule(value).map(Recurrence::to_text)
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&DataType>,
        _parameters: &Parameters,
        ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        check_data_type(data_type, &[DataType::Recur])?;
        let mut warnings = Vec::new();
        let parts = RecurParts::parse(value, &mut warnings);
        for warning in warnings {
            ctx.warn(warning);
        }
        Ok(Self::from_parts(&parts, ctx))
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        _ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        let parts = Self::rule(value)?.to_parts(DateFormat::Extended);
        let mut recur = XmlElement::new(DataType::Recur.structured_name());
        for (name, values) in parts.iter() {
            let name = name.to_ascii_lowercase();
            for v in values {
                recur.children.push(XmlElement::with_text(name.as_str(), v.as_str()));
            }
        }
        Ok(vec![recur])
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        _parameters: &Parameters,
        ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        let recur_name = DataType::Recur.structured_name();
        let Some(recur) = element.child(&recur_name) else {
            return Err(ScribeError::cannot_parse("no recur element"));
        };
        let mut parts = RecurParts::new();
        for part in &recur.children {
            parts.push(&part.name, part.text.trim());
        }
        Ok(Self::from_parts(&parts, ctx))
    }

    fn write_json(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        let parts = Self::rule(value)?.to_parts(DateFormat::Extended);
        let mut object = Map::new();
        for (name, values) in parts.iter() {
            let numeric = NUMERIC_PARTS.contains(&name);
            let mut json: Vec<Value> = values
                .iter()
                .map(|v| match lexical::parse::<i64, _>(v.as_str()) {
                    Ok(n) if numeric => Value::from(n),
                    _ => Value::String(v.clone()),
                })
                .collect();
            let entry = if json.len() == 1 {
                json.remove(0)
            } else {
                Value::Array(json)
            };
            object.insert(name.to_ascii_lowercase(), entry);
        }
        Ok(vec![Value::Object(object)])
    }

    fn parse_json(
        &self,
        data_type: Option<&DataType>,
        values: &[Value],
        parameters: &Parameters,
        ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        match values.first() {
            Some(Value::Object(object)) => {
                let mut parts = RecurParts::new();
                for (name, value) in object {
                    match value {
                        Value::Array(items) => {
                            for item in items {
                                parts.push(name, json_text(item));
                            }
                        }
                        other => parts.push(name, json_text(other)),
                    }
                }
                Ok(Self::from_parts(&parts, ctx))
            }
            Some(Value::String(text)) => self.parse_text(text, data_type, parameters, ctx),
            _ => Err(ScribeError::cannot_parse("expected a recurrence object")),
        }
    }
}
