// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests checking that the text, xCal and jCal forms agree.

use wirecal_ical::{Component, ICalReader, ICalWriter, PropertyValue, WriterOptions, jcal, xcal};

const CALENDAR: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//Example Corp.//Cal Client 1.0//EN\r
BEGIN:VEVENT\r
UID:12345@example.com\r
DTSTAMP:20250110T120000Z\r
DTSTART;TZID=Europe/Berlin:20250110T140000\r
DURATION:PT1H\r
SUMMARY:Review\\, planning\r
DESCRIPTION:Line one\\nLine two\r
CATEGORIES:WORK,MEETING\r
GEO:37.386013;-122.082932\r
PRIORITY:2\r
RRULE:FREQ=WEEKLY;UNTIL=20250331T000000Z;BYDAY=MO,WE\r
EXDATE;VALUE=DATE:20250113\r
ATTENDEE;CN=Jane;ROLE=REQ-PARTICIPANT:mailto:jane@example.com\r
X-CUSTOM;X-FLAG=yes:anything goes\r
BEGIN:VALARM\r
ACTION:DISPLAY\r
TRIGGER;RELATED=START:-PT15M\r
END:VALARM\r
END:VEVENT\r
END:VCALENDAR\r
";

fn read_text() -> Component {
    let mut reader = ICalReader::new(CALENDAR.as_bytes());
    let calendar = reader.read_next().unwrap().unwrap();
    assert!(reader.warnings().is_empty(), "{:?}", reader.warnings());
    calendar
}

#[test]
fn xcal_agrees_with_text() {
    let calendar = read_text();
    let xml = xcal::write_document(std::slice::from_ref(&calendar)).unwrap();
    let doc = xcal::parse_document(&xml).unwrap();

    assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);
    assert_eq!(doc.components, vec![calendar]);
}

#[test]
fn jcal_agrees_with_text() {
    let calendar = read_text();
    let json = jcal::write_document(std::slice::from_ref(&calendar)).unwrap();
    let doc = jcal::parse_document(&json).unwrap();

    assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);
    assert_eq!(doc.components, vec![calendar]);
}

#[test]
fn structured_forms_write_back_the_same_text() {
    let calendar = read_text();
    let xml = xcal::write_document(std::slice::from_ref(&calendar)).unwrap();
    let from_xml = xcal::parse_document(&xml).unwrap();
    let json = jcal::write_document(&from_xml.components).unwrap();
    let from_json = jcal::parse_document(&json).unwrap();

    let mut writer = ICalWriter::new(Vec::new(), WriterOptions::default());
    writer.write(&from_json.components[0]).unwrap();
    let text = String::from_utf8(writer.into_writer()).unwrap();
    assert_eq!(text, CALENDAR);
}

#[test]
fn recurrence_shapes() {
    let calendar = read_text();
    let event = std::slice::from_ref(&calendar.components[0]);
    let xml = xcal::write_document(event).unwrap();
    assert!(xml.contains(
        "<rrule><recur><freq>WEEKLY</freq><until>2025-03-31T00:00:00Z</until><byday>MO</byday><byday>WE</byday></recur></rrule>"
    ));

    let json = jcal::write_document(event).unwrap();
    assert!(json.contains(
        r#"["rrule",{},"recur",{"byday":["MO","WE"],"freq":"WEEKLY","until":"2025-03-31T00:00:00Z"}]"#
    ));
}

#[test]
fn date_values_keep_their_type() {
    let calendar = read_text();
    let event = &calendar.components[0];
    let PropertyValue::DateTimes(dates) = &event.property("EXDATE").unwrap().value else {
        panic!("EXDATE should be a date list");
    };
    assert!(!dates[0].has_time());

    let json = jcal::write_document(std::slice::from_ref(event)).unwrap();
    assert!(json.contains(r#"["exdate",{},"date","2025-01-13"]"#));
}
