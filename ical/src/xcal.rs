// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! xCal, the XML representation of iCalendar (RFC 6321).
//!
//! ```xml
//! <icalendar xmlns="urn:ietf:params:xml:ns:icalendar-2.0">
//!   <vcalendar>
//!     <properties>
//!       <dtstart>
//!         <parameters><tzid><text>Europe/Berlin</text></tzid></parameters>
//!         <date-time>2024-01-15T09:00:00</date-time>
//!       </dtstart>
//!     </properties>
//!     <components>...</components>
//!   </vcalendar>
//! </icalendar>
//! ```
//!
//! Component and property element names are lower case in the document and
//! upper case in the model. Documents are always read and written as
//! iCalendar 2.0.

use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::component::{Component, Document};
use crate::formatter::{WriteError, validate_name};
use crate::keyword::{
    KW_ALTREP, KW_DELEGATED_FROM, KW_DELEGATED_TO, KW_DIR, KW_MEMBER, KW_SENT_BY, KW_VALUE,
    XCAL_COMPONENTS, XCAL_ICALENDAR, XCAL_NAMESPACE, XCAL_PARAMETERS, XCAL_PROPERTIES,
};
use crate::parameter::{DataType, Parameters};
use crate::property::{Property, PropertyValue};
use crate::scribe::{ParseContext, ScribeIndex, WriteContext, finish_property};
use crate::version::ICalVersion;
use crate::warning::{Warning, WarningKind};
use crate::xml::{XmlElement, local_name, read_element, write_element};

/// Errors of the xCal codec.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum XCalError {
    /// The input is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// The XML is well-formed but not an xCal document.
    #[error("not an xCal document: {0}")]
    InvalidDocument(String),

    /// A component or property name cannot be written.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// The output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<quick_xml::Error> for XCalError {
    fn from(err: quick_xml::Error) -> Self {
        XCalError::Xml(err.to_string())
    }
}

/// Parse an xCal document with the standard scribes.
///
/// # Errors
/// [`XCalError`] if the input is not a well-formed xCal document.
pub fn parse_document(src: &str) -> Result<Document, XCalError> {
    parse_document_with(src, ScribeIndex::standard())
}

/// Which child list of a component the parser is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Open,
    Properties,
    Components,
}

struct Frame {
    component: Component,
    section: Section,
}

/// Parse an xCal document with the given scribes.
///
/// # Errors
/// [`XCalError`] if the input is not a well-formed xCal document.
pub fn parse_document_with(src: &str, index: &ScribeIndex) -> Result<Document, XCalError> {
    let mut reader = Reader::from_str(src);
    let mut ctx = ParseContext::new(ICalVersion::V2_0);
    let mut components = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut seen_root = false;

    loop {
        let event = reader.read_event()?;
        let (name, empty) = match &event {
            Event::Start(e) => (local_name(e)?, false),
            Event::Empty(e) => (local_name(e)?, true),
            Event::End(_) => {
                let Some(frame) = stack.last_mut() else {
                    continue; // </icalendar>
                };
                if frame.section == Section::Open {
                    if let Some(done) = stack.pop() {
                        attach(&mut stack, &mut components, done.component);
                    }
                } else {
                    frame.section = Section::Open;
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        if !seen_root {
            if name != XCAL_ICALENDAR {
                return Err(XCalError::InvalidDocument(format!(
                    "root element is <{name}>, expected <{XCAL_ICALENDAR}>"
                )));
            }
            seen_root = true;
            continue;
        }

        match stack.last().map(|frame| frame.section) {
            Some(Section::Properties) => {
                let element = if empty {
                    XmlElement::new(name)
                } else {
                    read_element(&mut reader, name)?
                };
                let property = read_property(element, index, &mut ctx);
                if let (Some(property), Some(frame)) = (property, stack.last_mut()) {
                    frame.component.properties.push(property);
                }
            }
            Some(Section::Open) if name == XCAL_PROPERTIES || name == XCAL_COMPONENTS => {
                if let (false, Some(frame)) = (empty, stack.last_mut()) {
                    frame.section = if name == XCAL_PROPERTIES {
                        Section::Properties
                    } else {
                        Section::Components
                    };
                }
            }
            Some(Section::Open) => {
                if !empty {
                    read_element(&mut reader, name.clone())?;
                }
                ctx.property = None;
                ctx.warn(Warning::message(format!(
                    "ignoring unexpected element <{name}> in a component"
                )));
            }
            None | Some(Section::Components) => {
                let component = Component::new(name.to_ascii_uppercase());
                if empty {
                    attach(&mut stack, &mut components, component);
                } else {
                    stack.push(Frame {
                        component,
                        section: Section::Open,
                    });
                }
            }
        }
    }

    while let Some(frame) = stack.pop() {
        ctx.property = None;
        ctx.warn(WarningKind::UnclosedComponent {
            name: frame.component.name.clone(),
        });
        attach(&mut stack, &mut components, frame.component);
    }

    Ok(Document {
        components,
        warnings: ctx.take_warnings(),
    })
}

fn attach(stack: &mut [Frame], components: &mut Vec<Component>, done: Component) {
    match stack.last_mut() {
        Some(parent) => parent.component.components.push(done),
        None => components.push(done),
    }
}

fn read_property(
    mut element: XmlElement,
    index: &ScribeIndex,
    ctx: &mut ParseContext,
) -> Option<Property> {
    let name = element.name.to_ascii_uppercase();
    ctx.line = None;
    ctx.property = Some(name.clone());

    let parameters = match element.children.iter().position(|c| c.name == XCAL_PARAMETERS) {
        Some(i) => read_parameters(&element.children.remove(i)),
        None => Parameters::new(),
    };

    let scribe = index.scribe_for(&name);
    let result = scribe.parse_xml(&element, &parameters, ctx);
    let raw_value = || raw_from_element(&element);
    finish_property(name, parameters, result, raw_value, ctx)
}

fn read_parameters(element: &XmlElement) -> Parameters {
    let mut parameters = Parameters::new();
    for param in &element.children {
        if !param.children.is_empty() {
            for value in &param.children {
                parameters.put(&param.name, value.text.as_str());
            }
        } else if param.text.is_empty() {
            parameters.put_valueless(&param.name);
        } else {
            parameters.put(&param.name, param.text.as_str());
        }
    }
    parameters
}

fn raw_from_element(element: &XmlElement) -> PropertyValue {
    let data_type = element
        .children
        .first()
        .and_then(|child| DataType::from_structured_name(&child.name));
    let value = if element.children.is_empty() {
        element.text.clone()
    } else {
        element
            .children
            .iter()
            .map(|child| child.text.as_str())
            .collect::<Vec<_>>()
            .join(",")
    };
    PropertyValue::Raw { data_type, value }
}

/// Write components as an xCal document with the standard scribes.
///
/// # Errors
/// [`XCalError::Write`] if a component or property name is not a valid
/// iCalendar name.
pub fn write_document(components: &[Component]) -> Result<String, XCalError> {
    write_document_with(components, ScribeIndex::standard())
}

/// Write components as an xCal document with the given scribes.
///
/// Properties whose scribe refuses the value are left out.
///
/// # Errors
/// [`XCalError::Write`] if a component or property name is not a valid
/// iCalendar name.
pub fn write_document_with(
    components: &[Component],
    index: &ScribeIndex,
) -> Result<String, XCalError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    let root = BytesStart::new(XCAL_ICALENDAR).with_attributes([("xmlns", XCAL_NAMESPACE)]);
    writer.write_event(Event::Start(root))?;

    let ctx = WriteContext::new(ICalVersion::V2_0);
    for component in components {
        write_component(&mut writer, component, index, &ctx)?;
    }

    writer.write_event(Event::End(BytesEnd::new(XCAL_ICALENDAR)))?;
    String::from_utf8(writer.into_inner()).map_err(|e| XCalError::Xml(e.to_string()))
}

fn write_component(
    writer: &mut Writer<Vec<u8>>,
    root: &Component,
    index: &ScribeIndex,
    ctx: &WriteContext,
) -> Result<(), XCalError> {
    open_component(writer, root, index, ctx)?;
    let mut stack = vec![(root, 0)];
    while let Some(top) = stack.last_mut() {
        let (current, next) = *top;
        match current.components.get(next) {
            Some(child) => {
                top.1 += 1;
                open_component(writer, child, index, ctx)?;
                stack.push((child, 0));
            }
            None => {
                let name = current.name.to_ascii_lowercase();
                if !current.components.is_empty() {
                    writer.write_event(Event::End(BytesEnd::new(XCAL_COMPONENTS)))?;
                }
                writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                stack.pop();
            }
        }
    }
    Ok(())
}

fn open_component(
    writer: &mut Writer<Vec<u8>>,
    component: &Component,
    index: &ScribeIndex,
    ctx: &WriteContext,
) -> Result<(), XCalError> {
    validate_name("component", &component.name)?;
    let name = component.name.to_ascii_lowercase();
    writer.write_event(Event::Start(BytesStart::new(name.as_str())))?;

    if !component.properties.is_empty() {
        writer.write_event(Event::Start(BytesStart::new(XCAL_PROPERTIES)))?;
        for property in &component.properties {
            if let Some(element) = property_element(property, index, ctx)? {
                write_element(writer, &element)?;
            }
        }
        writer.write_event(Event::End(BytesEnd::new(XCAL_PROPERTIES)))?;
    }
    if !component.components.is_empty() {
        writer.write_event(Event::Start(BytesStart::new(XCAL_COMPONENTS)))?;
    }
    Ok(())
}

fn property_element(
    property: &Property,
    index: &ScribeIndex,
    ctx: &WriteContext,
) -> Result<Option<XmlElement>, XCalError> {
    validate_name("property", &property.name)?;
    let scribe = index.writer_for(&property.name, &property.value);
    let values = match scribe.write_xml(&property.value, ctx) {
        Ok(values) => values,
        Err(err) => {
            tracing::debug!(property = %property.name, %err, "skipping property");
            return Ok(None);
        }
    };

    let mut parameters = scribe.prepare_parameters(property, ctx);
    parameters.remove(KW_VALUE);

    let mut element = XmlElement::new(property.name.to_ascii_lowercase());
    if !parameters.is_empty() {
        element.children.push(parameters_element(&parameters)?);
    }
    element.children.extend(values);
    Ok(Some(element))
}

fn parameters_element(parameters: &Parameters) -> Result<XmlElement, XCalError> {
    let mut element = XmlElement::new(XCAL_PARAMETERS);
    for (name, values) in parameters {
        validate_name("parameter", name)?;
        let value_type = parameter_value_type(name);
        if parameters.is_valueless(name) && !values.is_empty() {
            element.children.push(XmlElement::new(name.to_ascii_lowercase()));
        }
        let mut param = XmlElement::new(name.to_ascii_lowercase());
        param.children = values
            .iter()
            .map(|value| XmlElement::with_text(value_type, value.as_str()))
            .collect();
        element.children.push(param);
    }
    Ok(element)
}

/// Value element name of a parameter, per RFC 6321 section 3.5.
fn parameter_value_type(name: &str) -> &'static str {
    const CAL_ADDRESS: [&str; 4] = [KW_DELEGATED_FROM, KW_DELEGATED_TO, KW_MEMBER, KW_SENT_BY];
    if [KW_ALTREP, KW_DIR].iter().any(|n| n.eq_ignore_ascii_case(name)) {
        "uri"
    } else if CAL_ADDRESS.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        "cal-address"
    } else {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::KW_VCALENDAR;
    use crate::value::{ICalDateTime, RecurrenceFrequency};

    const DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<icalendar xmlns="urn:ietf:params:xml:ns:icalendar-2.0">
  <vcalendar>
    <properties>
      <prodid><text>-//Example//EN</text></prodid>
      <version><text>2.0</text></version>
    </properties>
    <components>
      <vevent>
        <properties>
          <dtstart>
            <parameters><tzid><text>Europe/Berlin</text></tzid></parameters>
            <date-time>2024-01-15T09:00:00</date-time>
          </dtstart>
          <summary><text>Planning &amp; review</text></summary>
          <rrule><recur><freq>WEEKLY</freq><count>4</count></recur></rrule>
          <x-custom><unknown>anything</unknown></x-custom>
        </properties>
      </vevent>
    </components>
  </vcalendar>
</icalendar>"#;

    #[test]
    fn parses_nested_components_and_typed_values() {
        let doc = parse_document(DOC).unwrap();
        assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);
        assert_eq!(doc.components.len(), 1);

        let calendar = &doc.components[0];
        assert_eq!(calendar.name, KW_VCALENDAR);
        assert_eq!(calendar.properties.len(), 2);

        let event = &calendar.components[0];
        assert_eq!(event.name, "VEVENT");
        let dtstart = event.property("DTSTART").unwrap();
        assert_eq!(dtstart.parameters.tzid(), Some("Europe/Berlin"));
        let start = "20240115T090000"
            .parse::<ICalDateTime>()
            .unwrap()
            .with_tzid("Europe/Berlin");
        assert_eq!(dtstart.value.as_date_time(), Some(&start));

        let summary = event.property("SUMMARY").unwrap();
        assert_eq!(summary.value.as_text(), Some("Planning & review"));

        let rrule = event.property("RRULE").unwrap();
        let recur = rrule.value.as_recurrence().unwrap();
        assert_eq!(recur.frequency, Some(RecurrenceFrequency::Weekly));
        assert_eq!(recur.count, Some(4));

        let custom = event.property("X-CUSTOM").unwrap();
        assert_eq!(
            custom.value,
            PropertyValue::Raw {
                data_type: None,
                value: "anything".to_string()
            }
        );
    }

    #[test]
    fn unparseable_value_falls_back_to_raw() {
        let src = r#"<icalendar xmlns="urn:ietf:params:xml:ns:icalendar-2.0">
<vevent><properties><dtstart><date-time>yesterday</date-time></dtstart></properties></vevent>
</icalendar>"#;
        let doc = parse_document(src).unwrap();
        let dtstart = doc.components[0].property("DTSTART").unwrap();
        assert_eq!(
            dtstart.value,
            PropertyValue::Raw {
                data_type: Some(DataType::DateTime),
                value: "yesterday".to_string()
            }
        );
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].code, Some(4));
        assert_eq!(doc.warnings[0].property.as_deref(), Some("DTSTART"));
    }

    #[test]
    fn reads_valueless_and_multi_valued_parameters() {
        let src = r#"<icalendar xmlns="urn:ietf:params:xml:ns:icalendar-2.0"><vevent><properties>
<attendee><parameters>
  <member><cal-address>mailto:a@example.com</cal-address><cal-address>mailto:b@example.com</cal-address></member>
  <x-flag/>
</parameters><cal-address>mailto:c@example.com</cal-address></attendee>
</properties></vevent></icalendar>"#;
        let doc = parse_document(src).unwrap();
        let attendee = doc.components[0].property("ATTENDEE").unwrap();
        assert_eq!(attendee.parameters.get_all("MEMBER").len(), 2);
        assert!(attendee.parameters.is_valueless("X-FLAG"));
    }

    #[test]
    fn valueless_parameter_with_later_value_keeps_both() {
        let src = r#"<icalendar xmlns="urn:ietf:params:xml:ns:icalendar-2.0"><vevent><properties>
<x-data><parameters><x-flag/><x-flag><text>a</text></x-flag></parameters><unknown>v</unknown></x-data>
</properties></vevent></icalendar>"#;
        let doc = parse_document(src).unwrap();
        let property = doc.components[0].property("X-DATA").unwrap();
        assert!(property.parameters.is_valueless("X-FLAG"));
        assert_eq!(property.parameters.get_all("X-FLAG"), ["a"]);

        let xml = write_document(&doc.components).unwrap();
        assert!(xml.contains("<parameters><x-flag/><x-flag><text>a</text></x-flag></parameters>"), "{xml}");
        assert_eq!(parse_document(&xml).unwrap().components, doc.components);
    }

    #[test]
    fn rejects_foreign_root() {
        let err = parse_document("<html><body/></html>").unwrap_err();
        assert!(matches!(err, XCalError::InvalidDocument(_)));
    }

    #[test]
    fn rejects_malformed_xml() {
        let err = parse_document("<icalendar><vevent></vtodo></icalendar>").unwrap_err();
        assert!(matches!(err, XCalError::Xml(_)));
    }

    #[test]
    fn unexpected_component_child_is_reported() {
        let src = r#"<icalendar><vevent><notes><text>x</text></notes></vevent></icalendar>"#;
        let doc = parse_document(src).unwrap();
        assert_eq!(doc.components[0].name, "VEVENT");
        assert_eq!(doc.warnings.len(), 1);
    }

    #[test]
    fn writes_and_reads_back() {
        let doc = parse_document(DOC).unwrap();
        let xml = write_document(&doc.components).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<icalendar xmlns=\"urn:ietf:params:xml:ns:icalendar-2.0\">"));
        assert!(xml.contains(
            "<dtstart><parameters><tzid><text>Europe/Berlin</text></tzid></parameters><date-time>2024-01-15T09:00:00</date-time></dtstart>"
        ));
        assert!(xml.contains("<summary><text>Planning &amp; review</text></summary>"));

        let again = parse_document(&xml).unwrap();
        assert_eq!(again.components, doc.components);
    }

    #[test]
    fn parameter_value_types() {
        let event = Component::new("VEVENT").with_property(
            Property::new("ATTENDEE", PropertyValue::Uri("mailto:a@example.com".to_string()))
                .with_parameter("SENT-BY", "mailto:b@example.com")
                .with_parameter("DIR", "ldap://example.com")
                .with_parameter("CN", "A"),
        );
        let xml = write_document(&[event]).unwrap();
        assert!(xml.contains("<sent-by><cal-address>mailto:b@example.com</cal-address></sent-by>"));
        assert!(xml.contains("<dir><uri>ldap://example.com</uri></dir>"));
        assert!(xml.contains("<cn><text>A</text></cn>"));
    }

    #[test]
    fn invalid_names_are_refused() {
        let err = write_document(&[Component::new("V EVENT")]).unwrap_err();
        assert!(matches!(err, XCalError::Write(WriteError::InvalidName { .. })));
    }

    #[test]
    fn deep_nesting() {
        const DEPTH: usize = 10_000;
        let mut src = String::from("<icalendar>");
        for _ in 0..DEPTH {
            src.push_str("<x-deep><components>");
        }
        for _ in 0..DEPTH {
            src.push_str("</components></x-deep>");
        }
        src.push_str("</icalendar>");

        let doc = parse_document(&src).unwrap();
        let xml = write_document(&doc.components).unwrap();
        assert_eq!(xml.matches("<x-deep>").count(), DEPTH);
    }
}
