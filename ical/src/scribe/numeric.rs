// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scribes for numeric values.

use serde_json::Value;

use crate::keyword::KW_GEO;
use crate::parameter::{DataType, Parameters};
use crate::property::{Geo, PropertyValue};
use crate::scribe::{
    ParseContext, Scribe, ScribeError, WriteContext, check_data_type, first_xml_value, json_text,
};
use crate::version::ICalVersion;
use crate::xml::XmlElement;

/// INTEGER properties such as PRIORITY or SEQUENCE.
#[derive(Debug, Clone, Copy)]
pub struct IntegerScribe {
    name: &'static str,
}

impl IntegerScribe {
    /// Scribe for the named property.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

fn parse_integer(value: &str) -> Result<i32, ScribeError> {
    let trimmed = value.trim();
    lexical::parse::<i32, _>(trimmed.strip_prefix('+').unwrap_or(trimmed))
        .map_err(|_| ScribeError::cannot_parse(format_args!("\"{value}\" is not an integer")))
}

impl Scribe for IntegerScribe {
    fn name(&self) -> &str {
        self.name
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::Integer
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::Integer(n) => Ok(n.to_string()),
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
        check_data_type(data_type, &[DataType::Integer])?;
        parse_integer(value).map(PropertyValue::Integer)
    }

    fn write_json(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        match value {
            PropertyValue::Integer(n) => Ok(vec![Value::from(*n)]),
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn parse_json(
        &self,
        data_type: Option<&DataType>,
        values: &[Value],
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        check_data_type(data_type, &[DataType::Integer])?;
        match values.first() {
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(PropertyValue::Integer)
                .ok_or_else(|| ScribeError::cannot_parse(format_args!("{n} is not an integer"))),
            Some(other) => parse_integer(&json_text(other)).map(PropertyValue::Integer),
            None => Err(ScribeError::cannot_parse("no value")),
        }
    }
}

/// GEO, a latitude and longitude pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoScribe;

const LATITUDE: &str = "latitude";
const LONGITUDE: &str = "longitude";

fn parse_float(value: &str) -> Result<f64, ScribeError> {
    lexical::parse::<f64, _>(value.trim())
        .map_err(|_| ScribeError::cannot_parse(format_args!("\"{value}\" is not a number")))
}

fn geo_from_json(value: &Value) -> Result<f64, ScribeError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ScribeError::cannot_parse("coordinate out of range")),
        other => parse_float(&json_text(other)),
    }
}

impl Scribe for GeoScribe {
    fn name(&self) -> &str {
        KW_GEO
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::Float
    }

    fn write_text(&self, value: &PropertyValue, ctx: &WriteContext) -> Result<String, ScribeError> {
        let PropertyValue::Geo(geo) = value else {
            return Err(ScribeError::unexpected(value));
        };
        // vCalendar 1.0 separates the coordinates with a comma
        let sep = if ctx.version == ICalVersion::V1_0 { ',' } else { ';' };
        Ok(format!("{}{sep}{}", geo.latitude, geo.longitude))
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&DataType>,
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        check_data_type(data_type, &[DataType::Float])?;
        let Some((lat, lon)) = value.split_once(';').or_else(|| value.split_once(',')) else {
            return Err(ScribeError::cannot_parse("expected latitude and longitude"));
        };
        Ok(PropertyValue::Geo(Geo {
            latitude: parse_float(lat)?,
            longitude: parse_float(lon)?,
        }))
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        _ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        let PropertyValue::Geo(geo) = value else {
            return Err(ScribeError::unexpected(value));
        };
        Ok(vec![
            XmlElement::with_text(LATITUDE, geo.latitude.to_string()),
            XmlElement::with_text(LONGITUDE, geo.longitude.to_string()),
        ])
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        parameters: &Parameters,
        ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        match (element.child_text(LATITUDE), element.child_text(LONGITUDE)) {
            (Some(lat), Some(lon)) => Ok(PropertyValue::Geo(Geo {
                latitude: parse_float(lat)?,
                longitude: parse_float(lon)?,
            })),
            _ => {
                let Some((data_type, text)) = first_xml_value(element) else {
                    return Err(ScribeError::cannot_parse("no value element"));
                };
                self.parse_text(text, data_type.as_ref(), parameters, ctx)
            }
        }
    }

    fn write_json(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        let PropertyValue::Geo(geo) = value else {
            return Err(ScribeError::unexpected(value));
        };
        Ok(vec![Value::Array(vec![
            Value::from(geo.latitude),
            Value::from(geo.longitude),
        ])])
    }

    fn parse_json(
        &self,
        data_type: Option<&DataType>,
        values: &[Value],
        parameters: &Parameters,
        ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        match values {
            [Value::Array(pair)] => match pair.as_slice() {
                [lat, lon] => Ok(PropertyValue::Geo(Geo {
                    latitude: geo_from_json(lat)?,
                    longitude: geo_from_json(lon)?,
                })),
                _ => Err(ScribeError::cannot_parse("expected latitude and longitude")),
            },
            [Value::String(text)] => self.parse_text(text, data_type, parameters, ctx),
            _ => Err(ScribeError::cannot_parse("expected latitude and longitude")),
        }
    }
}
