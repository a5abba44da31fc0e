// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scribes for text-like values and the verbatim fallback.

use serde_json::Value;

use crate::keyword::{KW_VALUE, XCAL_UNKNOWN};
use crate::parameter::{DataType, Parameters};
use crate::property::{Property, PropertyValue};
use crate::scribe::{
    ParseContext, Scribe, ScribeError, WriteContext, check_data_type, first_xml_value, json_text,
};
use crate::syntax::escape::{escape_text, join_escaped, split_unescaped, unescape_text};
use crate::version::ICalVersion;
use crate::xml::XmlElement;

/// TEXT properties such as SUMMARY or UID.
#[derive(Debug, Clone, Copy)]
pub struct TextScribe {
    name: &'static str,
}

impl TextScribe {
    /// Scribe for the named property.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Scribe for TextScribe {
    fn name(&self) -> &str {
        self.name
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::Text
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::Text(text) => Ok(escape_text(text).into_owned()),
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
        check_data_type(data_type, &[DataType::Text])?;
        Ok(PropertyValue::Text(unescape_text(value).into_owned()))
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        _ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        match value {
            PropertyValue::Text(text) => Ok(vec![XmlElement::with_text("text", text.as_str())]),
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        let Some((data_type, text)) = first_xml_value(element) else {
            return Err(ScribeError::cannot_parse("no value element"));
        };
        check_data_type(data_type.as_ref(), &[DataType::Text])?;
        Ok(PropertyValue::Text(text.to_string()))
    }

    fn write_json(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        match value {
            PropertyValue::Text(text) => Ok(vec![Value::String(text.clone())]),
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
        check_data_type(data_type, &[DataType::Text])?;
        let text = values.iter().map(json_text).collect::<Vec<_>>().join(",");
        Ok(PropertyValue::Text(text))
    }
}

/// Comma separated TEXT lists, CATEGORIES and RESOURCES.
#[derive(Debug, Clone, Copy)]
pub struct TextListScribe {
    name: &'static str,
}

impl TextListScribe {
    /// Scribe for the named property.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Scribe for TextListScribe {
    fn name(&self) -> &str {
        self.name
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::Text
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::TextList(items) => Ok(join_escaped(items, ',')),
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
        check_data_type(data_type, &[DataType::Text])?;
        Ok(PropertyValue::TextList(split_unescaped(value, ',')))
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        _ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        match value {
            PropertyValue::TextList(items) => Ok(items
                .iter()
                .map(|item| XmlElement::with_text("text", item.as_str()))
                .collect()),
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        let items = element.children.iter().map(|c| c.text.clone()).collect();
        Ok(PropertyValue::TextList(items))
    }

    fn write_json(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        match value {
            PropertyValue::TextList(items) => {
                Ok(items.iter().map(|item| Value::String(item.clone())).collect())
            }
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
        check_data_type(data_type, &[DataType::Text])?;
        Ok(PropertyValue::TextList(values.iter().map(json_text).collect()))
    }
}

/// URI and CAL-ADDRESS properties. The value is never escaped.
#[derive(Debug, Clone)]
pub struct UriScribe {
    name: &'static str,
    data_type: DataType,
}

impl UriScribe {
    /// URI valued property, e.g. URL.
    #[must_use]
    pub const fn uri(name: &'static str) -> Self {
        Self {
            name,
            data_type: DataType::Uri,
        }
    }

    /// CAL-ADDRESS valued property, e.g. ATTENDEE.
    #[must_use]
    pub const fn cal_address(name: &'static str) -> Self {
        Self {
            name,
            data_type: DataType::CalAddress,
        }
    }
}

impl Scribe for UriScribe {
    fn name(&self) -> &str {
        self.name
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        self.data_type.clone()
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::Uri(uri) => Ok(uri.clone()),
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
        check_data_type(data_type, &[self.data_type.clone(), DataType::Url])?;
        Ok(PropertyValue::Uri(value.to_string()))
    }
}

/// Verbatim fallback for properties without a registered scribe and for
/// values other scribes could not parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawScribe;

impl RawScribe {
    fn unknown() -> DataType {
        DataType::Other(XCAL_UNKNOWN.to_string())
    }
}

impl Scribe for RawScribe {
    fn name(&self) -> &str {
        ""
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        Self::unknown()
    }

    fn data_type(&self, value: &PropertyValue, _version: ICalVersion) -> DataType {
        match value {
            PropertyValue::Raw {
                data_type: Some(data_type),
                ..
            } => data_type.clone(),
            _ => Self::unknown(),
        }
    }

    /// A `VALUE` parameter already present is written as it was read.
    fn prepare_parameters(&self, property: &Property, ctx: &WriteContext) -> Parameters {
        let mut parameters = property.parameters.clone();
        if let PropertyValue::Raw {
            data_type: Some(data_type),
            ..
        } = &property.value
            && !parameters.contains(KW_VALUE)
        {
            parameters.put(KW_VALUE, data_type.text_name(ctx.version));
        }
        parameters
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::Raw { value, .. } => Ok(value.clone()),
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
        Ok(PropertyValue::Raw {
            data_type: data_type.cloned(),
            value: value.to_string(),
        })
    }

    fn parse_json(
        &self,
        data_type: Option<&DataType>,
        values: &[Value],
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        let value = match values {
            [single] => json_text(single),
            _ => Value::Array(values.to_vec()).to_string(),
        };
        Ok(PropertyValue::Raw {
            data_type: data_type.cloned(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(scribe: &dyn Scribe, value: &str) -> PropertyValue {
        let mut ctx = ParseContext::default();
        scribe
            .parse_text(value, None, &Parameters::new(), &mut ctx)
            .unwrap()
    }

    #[test]
    fn text_is_unescaped_and_escaped() {
        let scribe = TextScribe::new("SUMMARY");
        let value = parse(&scribe, r"a\, b\; c\nd\\");
        assert_eq!(value, PropertyValue::Text("a, b; c\nd\\".to_string()));
        let text = scribe.write_text(&value, &WriteContext::default()).unwrap();
        assert_eq!(text, r"a\, b\; c\nd\\");
    }

    #[test]
    fn text_rejects_other_value_types() {
        let scribe = TextScribe::new("SUMMARY");
        let mut ctx = ParseContext::default();
        let result = scribe.parse_text("AAAA", Some(&DataType::Binary), &Parameters::new(), &mut ctx);
        assert!(matches!(result, Err(ScribeError::CannotParse(_))));
    }

    #[test]
    fn text_list_splits_on_unescaped_commas() {
        let scribe = TextListScribe::new("CATEGORIES");
        let value = parse(&scribe, r"WORK,a\,b,,HOME");
        assert_eq!(
            value,
            PropertyValue::TextList(vec![
                "WORK".to_string(),
                "a,b".to_string(),
                String::new(),
                "HOME".to_string()
            ])
        );
        let text = scribe.write_text(&value, &WriteContext::default()).unwrap();
        assert_eq!(text, r"WORK,a\,b,,HOME");
    }

    #[test]
    fn uri_is_kept_verbatim() {
        let scribe = UriScribe::cal_address("ATTENDEE");
        let value = parse(&scribe, "mailto:a@example.com");
        assert_eq!(value, PropertyValue::Uri("mailto:a@example.com".to_string()));
        assert_eq!(scribe.default_data_type(ICalVersion::V2_0), DataType::CalAddress);
    }

    #[test]
    fn raw_restores_value_parameter() {
        let property = Property {
            name: "X-DATA".to_string(),
            parameters: Parameters::new(),
            value: PropertyValue::Raw {
                data_type: Some(DataType::Uri),
                value: "http://x".to_string(),
            },
        };
        let v1 = RawScribe.prepare_parameters(&property, &WriteContext::new(ICalVersion::V1_0));
        assert_eq!(v1.get(KW_VALUE), Some("URL"));
        let v2 = RawScribe.prepare_parameters(&property, &WriteContext::default());
        assert_eq!(v2.get(KW_VALUE), Some("URI"));
    }

    #[test]
    fn raw_keeps_value_parameter_as_read() {
        let parameters: Parameters = [("VALUE", "text"), ("A", "b")].into_iter().collect();
        let property = Property {
            name: "X-DATA".to_string(),
            parameters: parameters.clone(),
            value: PropertyValue::Raw {
                data_type: Some(DataType::Text),
                value: "v".to_string(),
            },
        };
        let prepared = RawScribe.prepare_parameters(&property, &WriteContext::default());
        assert_eq!(prepared, parameters);
        let order: Vec<_> = prepared.iter().map(|(name, values)| (name, values.to_vec())).collect();
        assert_eq!(
            order,
            [
                ("VALUE", vec!["text".to_string()]),
                ("A", vec!["b".to_string()])
            ]
        );
    }

    #[test]
    fn wrong_value_kind_is_skipped_on_write() {
        let result = TextScribe::new("SUMMARY").write_text(&PropertyValue::Integer(1), &WriteContext::default());
        assert!(matches!(result, Err(ScribeError::SkipMe(_))));
    }
}
