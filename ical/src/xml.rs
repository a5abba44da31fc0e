// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Small XML element tree used for xCal property values.
//!
//! Only property-sized subtrees are materialized; components are streamed by
//! the xCal reader and writer. Both directions use an explicit stack.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::xcal::XCalError;

/// An XML element with its text content and child elements.
///
/// Names are local names; namespaces are handled by the xCal layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Local name.
    pub name: String,
    /// Text content; empty for elements that have children.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Create an element holding only text.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// First child with the given local name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first child with the given local name.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Local name of a start tag.
pub(crate) fn local_name(start: &BytesStart<'_>) -> Result<String, XCalError> {
    let name = start.local_name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_string)
        .map_err(|e| XCalError::Xml(e.to_string()))
}

/// Read the rest of an element whose start tag `name` was just consumed.
pub(crate) fn read_element(reader: &mut Reader<&[u8]>, name: String) -> Result<XmlElement, XCalError> {
    let mut stack = vec![XmlElement::new(name)];
    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(e) => stack.push(XmlElement::new(local_name(&e)?)),
            Event::Empty(e) => {
                let leaf = XmlElement::new(local_name(&e)?);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(leaf);
                }
            }
            Event::End(_) => {
                let Some(mut done) = stack.pop() else {
                    return Err(XCalError::Xml("unbalanced end tag".to_string()));
                };
                if !done.children.is_empty() {
                    done.text.clear();
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => return Ok(done),
                }
            }
            Event::Text(e) => {
                let text = decode_text(reader, &e)?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(&e).map_err(|e| XCalError::Xml(e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text);
                }
            }
            Event::GeneralRef(e) => {
                let name = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|e| XCalError::Xml(e.to_string()))?;
                let resolved = resolve_reference(&name)?;
                if let Some(top) = stack.last_mut() {
                    top.text.push(resolved);
                }
            }
            Event::Eof => return Err(XCalError::Xml("unexpected end of document".to_string())),
            _ => {}
        }
    }
}

/// Decode a text event, resolving any entity references left in it.
pub(crate) fn decode_text<'a>(
    reader: &Reader<&[u8]>,
    text: &'a BytesText<'a>,
) -> Result<Cow<'a, str>, XCalError> {
    let decoded = reader
        .decoder()
        .decode(text)
        .map_err(|e| XCalError::Xml(e.to_string()))?;
    if !decoded.contains('&') {
        return Ok(decoded);
    }
    let unescaped = quick_xml::escape::unescape(&decoded)
        .map_err(|e| XCalError::Xml(e.to_string()))?
        .into_owned();
    Ok(Cow::Owned(unescaped))
}

/// Resolve a predefined entity or character reference name, e.g. `amp` or `#x26`.
pub(crate) fn resolve_reference(name: &str) -> Result<char, XCalError> {
    let invalid = || XCalError::Xml(format!("unsupported entity reference &{name};"));
    let resolved = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "apos" => '\'',
        "quot" => '"',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).map_err(|_| invalid())?
            } else if let Some(dec) = name.strip_prefix('#') {
                lexical::parse::<u32, _>(dec).map_err(|_| invalid())?
            } else {
                return Err(invalid());
            };
            char::from_u32(code).ok_or_else(invalid)?
        }
    };
    Ok(resolved)
}

enum Step<'a> {
    Open(&'a XmlElement),
    Close(&'a str),
}

/// Write an element and its subtree.
pub(crate) fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
) -> Result<(), XCalError> {
    let mut steps = vec![Step::Open(element)];
    while let Some(step) = steps.pop() {
        match step {
            Step::Open(el) if el.children.is_empty() => write_leaf(writer, &el.name, &el.text)?,
            Step::Open(el) => {
                writer.write_event(Event::Start(BytesStart::new(el.name.as_str())))?;
                steps.push(Step::Close(&el.name));
                steps.extend(el.children.iter().rev().map(Step::Open));
            }
            Step::Close(name) => writer.write_event(Event::End(BytesEnd::new(name)))?,
        }
    }
    Ok(())
}

fn write_leaf<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), XCalError> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(src: &str) -> XmlElement {
        let mut reader = Reader::from_str(src);
        loop {
            if let Event::Start(e) = reader.read_event().unwrap() {
                let name = local_name(&e).unwrap();
                return read_element(&mut reader, name).unwrap();
            }
        }
    }

    fn write(element: &XmlElement) -> String {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, element).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn reads_nested_elements_with_text() {
        let el = read(
            "<x:geo xmlns:x=\"urn:x\">\n  <x:latitude>1.5</x:latitude>\n  <x:longitude>-2</x:longitude>\n</x:geo>",
        );
        assert_eq!(el.name, "geo");
        assert_eq!(el.text, "");
        assert_eq!(el.child_text("latitude"), Some("1.5"));
        assert_eq!(el.child_text("longitude"), Some("-2"));
    }

    #[test]
    fn resolves_entities_and_keeps_whitespace_in_leaves() {
        let el = read("<text> a &amp; b &#x41;&lt; </text>");
        assert_eq!(el.text, " a & b A< ");
    }

    #[test]
    fn writes_escaped_text_and_empty_leaves() {
        let el = XmlElement::new("summary")
            .with_child(XmlElement::with_text("text", "a < b & c"))
            .with_child(XmlElement::new("empty"));
        assert_eq!(
            write(&el),
            "<summary><text>a &lt; b &amp; c</text><empty/></summary>"
        );
    }

    #[test]
    fn write_then_read_preserves_tree() {
        let el = XmlElement::new("recur")
            .with_child(XmlElement::with_text("freq", "WEEKLY"))
            .with_child(XmlElement::with_text("byday", "1MO"));
        assert_eq!(read(&write(&el)), el);
    }

    #[test]
    fn entity_names() {
        assert_eq!(resolve_reference("quot").unwrap(), '"');
        assert_eq!(resolve_reference("#65").unwrap(), 'A');
        assert!(resolve_reference("nbsp").is_err());
    }
}
