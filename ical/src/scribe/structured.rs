// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scribes for REQUEST-STATUS and ATTACH.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::keyword::{KW_ATTACH, KW_ENCODING, KW_ENCODING_BASE64, KW_REQUEST_STATUS};
use crate::parameter::{DataType, Parameters};
use crate::property::{Attachment, Property, PropertyValue, RequestStatus};
use crate::scribe::{
    ParseContext, Scribe, ScribeError, WriteContext, check_data_type, json_text,
    set_value_parameter,
};
use crate::syntax::escape::{escape_text, split_unescaped};
use crate::version::ICalVersion;
use crate::xml::XmlElement;

const CODE: &str = "code";
const DESCRIPTION: &str = "description";
const DATA: &str = "data";

/// REQUEST-STATUS: `code;description[;data]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestStatusScribe;

impl RequestStatusScribe {
    fn from_parts(mut parts: Vec<String>) -> Result<PropertyValue, ScribeError> {
        if parts.len() < 2 {
            return Err(ScribeError::cannot_parse("expected a status code and description"));
        }
        let data = (parts.len() > 2).then(|| parts.split_off(2).join(";"));
        let description = parts.pop().unwrap_or_default();
        let code = parts.pop().unwrap_or_default();
        Ok(PropertyValue::RequestStatus(RequestStatus {
            code,
            description,
            data,
        }))
    }

    fn status(value: &PropertyValue) -> Result<&RequestStatus, ScribeError> {
        match value {
            PropertyValue::RequestStatus(status) => Ok(status),
            other => Err(ScribeError::unexpected(other)),
        }
    }
}

impl Scribe for RequestStatusScribe {
    fn name(&self) -> &str {
        KW_REQUEST_STATUS
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::Text
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        let status = Self::status(value)?;
        let mut text = format!("{};{}", escape_text(&status.code), escape_text(&status.description));
        if let Some(data) = &status.data {
            text.push(';');
            text.push_str(&escape_text(data));
        }
        Ok(text)
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&DataType>,
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        check_data_type(data_type, &[DataType::Text])?;
        Self::from_parts(split_unescaped(value, ';'))
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        _ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        let status = Self::status(value)?;
        let mut children = vec![
            XmlElement::with_text(CODE, status.code.as_str()),
            XmlElement::with_text(DESCRIPTION, status.description.as_str()),
        ];
        if let Some(data) = &status.data {
            children.push(XmlElement::with_text(DATA, data.as_str()));
        }
        Ok(children)
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        let mut parts: Vec<String> = [CODE, DESCRIPTION]
            .iter()
            .filter_map(|name| element.child_text(name).map(str::to_string))
            .collect();
        if let Some(data) = element.child_text(DATA) {
            parts.push(data.to_string());
        }
        Self::from_parts(parts)
    }

    fn write_json(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        let status = Self::status(value)?;
        let mut parts = vec![
            Value::String(status.code.clone()),
            Value::String(status.description.clone()),
        ];
        if let Some(data) = &status.data {
            parts.push(Value::String(data.clone()));
        }
        Ok(vec![Value::Array(parts)])
    }

    fn parse_json(
        &self,
        data_type: Option<&DataType>,
        values: &[Value],
        _parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        check_data_type(data_type, &[DataType::Text])?;
        match values {
            [Value::Array(items)] => Self::from_parts(items.iter().map(json_text).collect()),
            [Value::String(text)] => Self::from_parts(split_unescaped(text, ';')),
            _ => Err(ScribeError::cannot_parse("expected a status array")),
        }
    }
}

/// ATTACH: a URI, or inline BASE64 content.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentScribe;

impl AttachmentScribe {
    fn decode(value: &str) -> Result<PropertyValue, ScribeError> {
        let bytes: String = value.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(bytes)
            .map(|data| PropertyValue::Attachment(Attachment::Binary(data)))
            .map_err(|e| ScribeError::cannot_parse(format_args!("invalid BASE64 content: {e}")))
    }
}

impl Scribe for AttachmentScribe {
    fn name(&self) -> &str {
        KW_ATTACH
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::Uri
    }

    fn data_type(&self, value: &PropertyValue, version: ICalVersion) -> DataType {
        match value {
            PropertyValue::Attachment(Attachment::Binary(_)) => DataType::Binary,
            _ => self.default_data_type(version),
        }
    }

    fn prepare_parameters(&self, property: &Property, ctx: &WriteContext) -> Parameters {
        let mut parameters = property.parameters.clone();
        set_value_parameter(
            &mut parameters,
            &self.data_type(&property.value, ctx.version),
            &self.default_data_type(ctx.version),
            ctx.version,
        );
        match &property.value {
            PropertyValue::Attachment(Attachment::Binary(_)) => {
                parameters.replace(KW_ENCODING, KW_ENCODING_BASE64);
            }
            _ => {
                parameters.remove(KW_ENCODING);
            }
        }
        parameters
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::Attachment(Attachment::Uri(uri)) => Ok(uri.clone()),
            PropertyValue::Attachment(Attachment::Binary(data)) => Ok(STANDARD.encode(data)),
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&DataType>,
        parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        check_data_type(data_type, &[DataType::Uri, DataType::Url, DataType::Binary])?;
        let inline = data_type == Some(&DataType::Binary)
            || parameters
                .encoding()
                .is_some_and(|e| e.eq_ignore_ascii_case(KW_ENCODING_BASE64));
        if inline {
            Self::decode(value)
        } else {
            Ok(PropertyValue::Attachment(Attachment::Uri(value.to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::KW_VALUE;

    fn parse(scribe: &dyn Scribe, value: &str, parameters: &Parameters) -> Result<PropertyValue, ScribeError> {
        let mut ctx = ParseContext::default();
        scribe.parse_text(value, parameters.value_type().as_ref(), parameters, &mut ctx)
    }

    #[test]
    fn request_status_parts() {
        let value = parse(&RequestStatusScribe, r"3.7;Invalid user;ATTENDEE:mailto:a\;b", &Parameters::new()).unwrap();
        assert_eq!(
            value,
            PropertyValue::RequestStatus(RequestStatus {
                code: "3.7".to_string(),
                description: "Invalid user".to_string(),
                data: Some("ATTENDEE:mailto:a;b".to_string()),
            })
        );
        let text = RequestStatusScribe.write_text(&value, &WriteContext::default()).unwrap();
        assert_eq!(text, r"3.7;Invalid user;ATTENDEE:mailto:a\;b");

        assert!(parse(&RequestStatusScribe, "2.0", &Parameters::new()).is_err());
    }

    #[test]
    fn request_status_json_is_an_array() {
        let value = parse(&RequestStatusScribe, "2.0;Success", &Parameters::new()).unwrap();
        let json = RequestStatusScribe.write_json(&value, &WriteContext::default()).unwrap();
        assert_eq!(json, [serde_json::json!(["2.0", "Success"])]);
    }

    #[test]
    fn inline_attachment_round_trip() {
        let params: Parameters = [(KW_ENCODING, "BASE64"), (KW_VALUE, "BINARY")].into_iter().collect();
        let value = parse(&AttachmentScribe, "aGVsbG8=", &params).unwrap();
        assert_eq!(value, PropertyValue::Attachment(Attachment::Binary(b"hello".to_vec())));

        let property = Property::new(KW_ATTACH, value);
        let prepared = AttachmentScribe.prepare_parameters(&property, &WriteContext::default());
        assert_eq!(prepared.get(KW_ENCODING), Some("BASE64"));
        assert_eq!(prepared.get(KW_VALUE), Some("BINARY"));
        assert_eq!(
            AttachmentScribe.write_text(&property.value, &WriteContext::default()).unwrap(),
            "aGVsbG8="
        );
    }

    #[test]
    fn uri_attachment_and_bad_base64() {
        let value = parse(&AttachmentScribe, "https://example.com/a.pdf", &Parameters::new()).unwrap();
        assert_eq!(
            value,
            PropertyValue::Attachment(Attachment::Uri("https://example.com/a.pdf".to_string()))
        );

        let params: Parameters = [(KW_ENCODING, "BASE64")].into_iter().collect();
        assert!(matches!(
            parse(&AttachmentScribe, "not base64!", &params),
            Err(ScribeError::CannotParse(_))
        ));
    }
}
