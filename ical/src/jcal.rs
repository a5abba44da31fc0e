// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! jCal, the JSON representation of iCalendar (RFC 7265).
//!
//! A component is `[name, [properties...], [components...]]` and a property
//! is `[name, {parameters}, type, value...]`, all names lower case:
//!
//! ```json
//! ["vcalendar", [["version", {}, "text", "2.0"]], [
//!   ["vevent", [["dtstart", {"tzid": "Europe/Berlin"}, "date-time", "2024-01-15T09:00:00"]], []]
//! ]]
//! ```
//!
//! A document is either a single component or an array of components.
//! Documents are always read and written as iCalendar 2.0.

use serde_json::{Map, Value};

use crate::component::{Component, Document};
use crate::formatter::{WriteError, validate_name};
use crate::keyword::KW_VALUE;
use crate::parameter::{DataType, Parameters};
use crate::property::{Property, PropertyValue};
use crate::scribe::{ParseContext, ScribeIndex, WriteContext, finish_property, json_text};
use crate::version::ICalVersion;

/// Errors of the jCal codec.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JCalError {
    /// The input is not valid JSON, or nests deeper than the JSON parser allows.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is valid but not shaped like jCal.
    #[error("not a jCal document: {0}")]
    InvalidDocument(String),

    /// A component or property name cannot be written.
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Parse a jCal document with the standard scribes.
///
/// # Errors
/// [`JCalError`] if the input is not a well-formed jCal document.
pub fn parse_document(src: &str) -> Result<Document, JCalError> {
    parse_document_with(src, ScribeIndex::standard())
}

/// Parse a jCal document with the given scribes.
///
/// # Errors
/// [`JCalError`] if the input is not a well-formed jCal document.
pub fn parse_document_with(src: &str, index: &ScribeIndex) -> Result<Document, JCalError> {
    let value: Value = serde_json::from_str(src)?;
    let Value::Array(items) = value else {
        return Err(invalid("document must be an array"));
    };

    let roots = if matches!(items.first(), Some(Value::String(_))) {
        vec![Value::Array(items)]
    } else {
        items
    };

    let mut ctx = ParseContext::new(ICalVersion::V2_0);
    let mut components = Vec::with_capacity(roots.len());
    for root in roots {
        components.push(read_component(root, index, &mut ctx)?);
    }
    Ok(Document {
        components,
        warnings: ctx.take_warnings(),
    })
}

fn invalid(reason: impl Into<String>) -> JCalError {
    JCalError::InvalidDocument(reason.into())
}

type Frame = (Component, std::vec::IntoIter<Value>);

fn read_component(
    root: Value,
    index: &ScribeIndex,
    ctx: &mut ParseContext,
) -> Result<Component, JCalError> {
    let mut current = open_component(root, index, ctx)?;
    let mut stack: Vec<Frame> = Vec::new();
    loop {
        match current.1.next() {
            Some(child) => {
                let frame = open_component(child, index, ctx)?;
                stack.push(std::mem::replace(&mut current, frame));
            }
            None => match stack.pop() {
                Some(mut parent) => {
                    parent.0.components.push(current.0);
                    current = parent;
                }
                None => return Ok(current.0),
            },
        }
    }
}

fn open_component(
    value: Value,
    index: &ScribeIndex,
    ctx: &mut ParseContext,
) -> Result<Frame, JCalError> {
    let Value::Array(items) = value else {
        return Err(invalid("component must be an array"));
    };
    let mut items = items.into_iter();
    let (Some(Value::String(name)), Some(Value::Array(properties)), Some(Value::Array(children)), None) =
        (items.next(), items.next(), items.next(), items.next())
    else {
        return Err(invalid("component must be [name, [properties], [components]]"));
    };

    let mut component = Component::new(name.to_ascii_uppercase());
    for property in properties {
        if let Some(property) = read_property(property, index, ctx)? {
            component.properties.push(property);
        }
    }
    Ok((component, children.into_iter()))
}

fn read_property(
    value: Value,
    index: &ScribeIndex,
    ctx: &mut ParseContext,
) -> Result<Option<Property>, JCalError> {
    let Value::Array(items) = value else {
        return Err(invalid("property must be an array"));
    };
    let mut items = items.into_iter();
    let (Some(Value::String(name)), Some(Value::Object(params)), Some(Value::String(type_name))) =
        (items.next(), items.next(), items.next())
    else {
        return Err(invalid("property must be [name, {parameters}, type, values...]"));
    };
    let values: Vec<Value> = items.collect();
    if values.is_empty() {
        return Err(invalid(format!("property {name} has no value")));
    }

    let name = name.to_ascii_uppercase();
    ctx.line = None;
    ctx.property = Some(name.clone());

    let parameters = read_parameters(params);
    let data_type = DataType::from_structured_name(&type_name);
    let scribe = index.scribe_for(&name);
    let result = scribe.parse_json(data_type.as_ref(), &values, &parameters, ctx);
    let raw_value = || PropertyValue::Raw {
        data_type,
        value: values.iter().map(json_text).collect::<Vec<_>>().join(","),
    };
    Ok(finish_property(name, parameters, result, raw_value, ctx))
}

fn read_parameters(params: Map<String, Value>) -> Parameters {
    let mut parameters = Parameters::new();
    for (name, value) in params {
        match value {
            Value::Array(values) if values.is_empty() => parameters.put_valueless(&name),
            Value::Array(values) => {
                for value in &values {
                    parameters.put(&name, json_text(value));
                }
            }
            other => parameters.put(&name, json_text(&other)),
        }
    }
    parameters
}

/// Write components as a jCal document with the standard scribes.
///
/// A single component is written as one component array, several as an
/// array of them.
///
/// # Errors
/// [`JCalError::Write`] if a component or property name is not a valid
/// iCalendar name.
pub fn write_document(components: &[Component]) -> Result<String, JCalError> {
    write_document_with(components, ScribeIndex::standard())
}

/// Write components as a jCal document with the given scribes.
///
/// Properties whose scribe refuses the value are left out.
///
/// # Errors
/// [`JCalError::Write`] if a component or property name is not a valid
/// iCalendar name.
pub fn write_document_with(
    components: &[Component],
    index: &ScribeIndex,
) -> Result<String, JCalError> {
    let ctx = WriteContext::new(ICalVersion::V2_0);
    let mut out = String::new();
    match components {
        [single] => write_component(&mut out, single, index, &ctx)?,
        _ => {
            out.push('[');
            for (i, component) in components.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_component(&mut out, component, index, &ctx)?;
            }
            out.push(']');
        }
    }
    Ok(out)
}

/// Stream a component tree as text with an explicit stack.
fn write_component(
    out: &mut String,
    root: &Component,
    index: &ScribeIndex,
    ctx: &WriteContext,
) -> Result<(), JCalError> {
    write_open(out, root, index, ctx)?;
    let mut stack = vec![(root, 0)];
    while let Some(top) = stack.last_mut() {
        let (current, next) = *top;
        match current.components.get(next) {
            Some(child) => {
                top.1 += 1;
                if next > 0 {
                    out.push(',');
                }
                write_open(out, child, index, ctx)?;
                stack.push((child, 0));
            }
            None => {
                out.push_str("]]");
                stack.pop();
            }
        }
    }
    Ok(())
}

fn write_open(
    out: &mut String,
    component: &Component,
    index: &ScribeIndex,
    ctx: &WriteContext,
) -> Result<(), JCalError> {
    validate_name("component", &component.name)?;
    out.push('[');
    out.push_str(&serde_json::to_string(&component.name.to_ascii_lowercase())?);
    out.push_str(",[");
    let mut first = true;
    for property in &component.properties {
        if let Some(json) = property_json(property, index, ctx)? {
            if !first {
                out.push(',');
            }
            first = false;
            out.push_str(&serde_json::to_string(&json)?);
        }
    }
    out.push_str("],[");
    Ok(())
}

fn property_json(
    property: &Property,
    index: &ScribeIndex,
    ctx: &WriteContext,
) -> Result<Option<Value>, JCalError> {
    validate_name("property", &property.name)?;
    let scribe = index.writer_for(&property.name, &property.value);
    let values = match scribe.write_json(&property.value, ctx) {
        Ok(values) => values,
        Err(err) => {
            tracing::debug!(property = %property.name, %err, "skipping property");
            return Ok(None);
        }
    };

    let mut parameters = scribe.prepare_parameters(property, ctx);
    parameters.remove(KW_VALUE);
    let mut params = Map::new();
    for (name, values) in &parameters {
        validate_name("parameter", name)?;
        if parameters.is_valueless(name) && !values.is_empty() {
            tracing::debug!(property = %property.name, parameter = name, "valueless occurrence not representable in jCal");
        }
        let value = match values {
            [single] => Value::String(single.clone()),
            many => Value::Array(many.iter().cloned().map(Value::String).collect()),
        };
        params.insert(name.to_ascii_lowercase(), value);
    }

    let type_name = scribe.data_type(&property.value, ctx.version).structured_name();

    let mut array = Vec::with_capacity(values.len() + 3);
    array.push(Value::String(property.name.to_ascii_lowercase()));
    array.push(Value::Object(params));
    array.push(Value::String(type_name));
    array.extend(values);
    Ok(Some(Value::Array(array)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::property::Geo;
    use crate::value::RecurrenceFrequency;

    const DOC: &str = r#"["vcalendar",
      [["prodid", {}, "text", "-//Example//EN"], ["version", {}, "text", "2.0"]],
      [["vevent",
        [
          ["dtstart", {"tzid": "Europe/Berlin"}, "date-time", "2024-01-15T09:00:00"],
          ["summary", {}, "text", "Planning, review"],
          ["categories", {}, "text", "WORK", "MEETING"],
          ["geo", {}, "float", [37.386013, -122.082932]],
          ["rrule", {}, "recur", {"freq": "WEEKLY", "byday": ["MO", "WE"], "count": 4}],
          ["x-custom", {"x-param": ["a", "b"]}, "unknown", "anything"]
        ],
        []
      ]]
    ]"#;

    #[test]
    fn parses_single_component_document() {
        let doc = parse_document(DOC).unwrap();
        assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);
        assert_eq!(doc.components.len(), 1);

        let event = &doc.components[0].components[0];
        assert_eq!(event.name, "VEVENT");
        assert_eq!(
            event.property("DTSTART").unwrap().parameters.tzid(),
            Some("Europe/Berlin")
        );
        assert_eq!(
            event.property("SUMMARY").unwrap().value.as_text(),
            Some("Planning, review")
        );
        assert_eq!(
            event.property("CATEGORIES").unwrap().value,
            PropertyValue::TextList(vec!["WORK".to_string(), "MEETING".to_string()])
        );
        assert_eq!(
            event.property("GEO").unwrap().value,
            PropertyValue::Geo(Geo {
                latitude: 37.386_013,
                longitude: -122.082_932
            })
        );

        let recur = event.property("RRULE").unwrap().value.as_recurrence().unwrap();
        assert_eq!(recur.frequency, Some(RecurrenceFrequency::Weekly));
        assert_eq!(recur.by_day.len(), 2);
        assert_eq!(recur.count, Some(4));

        let custom = event.property("X-CUSTOM").unwrap();
        assert_eq!(custom.parameters.get_all("X-PARAM").len(), 2);
        assert_eq!(
            custom.value,
            PropertyValue::Raw {
                data_type: None,
                value: "anything".to_string()
            }
        );
    }

    #[test]
    fn parses_array_of_components() {
        let src = r#"[["vcalendar", [], []], ["vcalendar", [], []]]"#;
        let doc = parse_document(src).unwrap();
        assert_eq!(doc.components.len(), 2);
    }

    #[test]
    fn writes_compact_arrays() {
        let event = Component::new("VEVENT")
            .with_property(Property::new("SUMMARY", PropertyValue::Text("Hi".to_string())))
            .with_property(Property::new("PRIORITY", PropertyValue::Integer(1)));
        let json = write_document(&[event]).unwrap();
        assert_eq!(
            json,
            r#"["vevent",[["summary",{},"text","Hi"],["priority",{},"integer",1]],[]]"#
        );
    }

    #[test]
    fn writes_and_reads_back() {
        let doc = parse_document(DOC).unwrap();
        let json = write_document(&doc.components).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value[2][0][1][0],
            json!(["dtstart", {"tzid": "Europe/Berlin"}, "date-time", "2024-01-15T09:00:00"])
        );
        assert_eq!(value[2][0][1][5][1], json!({"x-param": ["a", "b"]}));

        let again = parse_document(&json).unwrap();
        assert_eq!(again.components, doc.components);
    }

    #[test]
    fn unparseable_value_falls_back_to_raw() {
        let src = r#"["vevent", [["dtstart", {}, "date-time", "soon"]], []]"#;
        let doc = parse_document(src).unwrap();
        assert_eq!(
            doc.components[0].property("DTSTART").unwrap().value,
            PropertyValue::Raw {
                data_type: Some(DataType::DateTime),
                value: "soon".to_string()
            }
        );
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].code, Some(4));
    }

    #[rustfmt::skip]
    #[test]
    fn rejects_malformed_documents() {
        let fail_cases = [
            "{}",
            r#"["vevent"]"#,
            r#"["vevent", {}, []]"#,
            r#"["vevent", [["summary", {}, "text"]], []]"#,
            r#"["vevent", [["summary", [], "text", "x"]], []]"#,
            r#"["vevent", [], [], []]"#,
        ];
        for src in fail_cases {
            assert!(
                matches!(parse_document(src), Err(JCalError::InvalidDocument(_))),
                "expected failure for {src}"
            );
        }
        assert!(matches!(parse_document("[\"vevent\""), Err(JCalError::Json(_))));
    }

    #[test]
    fn nesting_beyond_json_limit_is_an_error() {
        let depth = 1_000;
        let mut src = String::new();
        for _ in 0..depth {
            src.push_str("[\"x-deep\",[],[");
        }
        for _ in 0..depth {
            src.push_str("]]");
        }
        assert!(matches!(parse_document(&src), Err(JCalError::Json(_))));
    }

    #[test]
    fn deep_trees_are_written_without_recursion() {
        const DEPTH: usize = 100_000;
        let mut root = Component::new("X-DEEP");
        for _ in 1..DEPTH {
            root = Component::new("X-DEEP").with_component(root);
        }
        let json = write_document(std::slice::from_ref(&root)).unwrap();
        assert_eq!(json.matches("\"x-deep\"").count(), DEPTH);
        assert!(json.ends_with("]]"));
    }
}
