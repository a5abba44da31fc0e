// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scribes for DATE, DATE-TIME and PERIOD values.
//!
//! A `TZID` parameter ties floating date-times to a named zone; writing a
//! value with a named zone sets `TZID` from the value.

use serde_json::Value;

use crate::keyword::{KW_FREEBUSY, KW_TZID};
use crate::parameter::{DataType, Parameters};
use crate::property::{Property, PropertyValue};
use crate::scribe::{
    ParseContext, Scribe, ScribeError, WriteContext, check_data_type, set_value_parameter,
};
use crate::value::{DateFormat, ICalDateTime, Period, PeriodEnd, Zone, parse_date_time, parse_period};
use crate::version::ICalVersion;
use crate::xml::XmlElement;

const START: &str = "start";
const END: &str = "end";
const DURATION: &str = "duration";

fn parse_value(value: &str, parameters: &Parameters) -> Result<ICalDateTime, ScribeError> {
    let dt = parse_date_time(value).map_err(ScribeError::cannot_parse)?;
    Ok(match parameters.tzid() {
        Some(tzid) => dt.with_tzid(tzid),
        None => dt,
    })
}

fn parse_period_value(value: &str, parameters: &Parameters) -> Result<Period, ScribeError> {
    let mut period = parse_period(value).map_err(ScribeError::cannot_parse)?;
    if let Some(tzid) = parameters.tzid() {
        period.start = period.start.with_tzid(tzid);
        if let PeriodEnd::DateTime(end) = period.end {
            period.end = PeriodEnd::DateTime(end.with_tzid(tzid));
        }
    }
    Ok(period)
}

fn date_type(dt: &ICalDateTime) -> DataType {
    if dt.has_time() {
        DataType::DateTime
    } else {
        DataType::Date
    }
}

/// Keep `TZID` in step with the zone of a date-time value.
fn sync_tzid(parameters: &mut Parameters, dt: Option<&ICalDateTime>) {
    let Some(dt) = dt.filter(|dt| dt.has_time()) else {
        return;
    };
    match &dt.zone {
        Zone::Named(tzid) => parameters.replace(KW_TZID, tzid.as_str()),
        zone => {
            if let Some(dropped) = parameters.remove(KW_TZID) {
                tracing::debug!(tzid = ?dropped, ?zone, "dropping TZID of a value without a named zone");
            }
        }
    }
}

fn date_element(dt: &ICalDateTime) -> XmlElement {
    XmlElement::with_text(date_type(dt).structured_name(), dt.format(DateFormat::Extended))
}

fn period_element(period: &Period) -> XmlElement {
    let end = match &period.end {
        PeriodEnd::DateTime(end) => XmlElement::with_text(END, end.format(DateFormat::Extended)),
        PeriodEnd::Duration(duration) => XmlElement::with_text(DURATION, duration.to_string()),
    };
    XmlElement::new(DataType::Period.structured_name())
        .with_child(XmlElement::with_text(START, period.start.format(DateFormat::Extended)))
        .with_child(end)
}

fn period_from_element(element: &XmlElement, parameters: &Parameters) -> Result<Period, ScribeError> {
    let start = element.child_text(START);
    let end = element.child_text(END).or_else(|| element.child_text(DURATION));
    match (start, end) {
        (Some(start), Some(end)) => parse_period_value(&format!("{start}/{end}"), parameters),
        _ => parse_period_value(&element.text, parameters),
    }
}

fn join_formatted<T>(items: &[T], format: impl Fn(&T) -> String) -> String {
    items.iter().map(format).collect::<Vec<_>>().join(",")
}

/// Single DATE-TIME properties, normally in UTC: DTSTAMP, CREATED,
/// LAST-MODIFIED and COMPLETED.
#[derive(Debug, Clone, Copy)]
pub struct DateTimeScribe {
    name: &'static str,
}

impl DateTimeScribe {
    /// Scribe for the named property.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Scribe for DateTimeScribe {
    fn name(&self) -> &str {
        self.name
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::DateTime
    }

    fn data_type(&self, value: &PropertyValue, version: ICalVersion) -> DataType {
        match value {
            PropertyValue::DateTime(dt) => date_type(dt),
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
        sync_tzid(&mut parameters, property.value.as_date_time());
        parameters
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::DateTime(dt) => Ok(dt.format(DateFormat::Basic)),
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
        check_data_type(data_type, &[DataType::DateTime])?;
        parse_value(value, parameters).map(PropertyValue::DateTime)
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        _ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        match value {
            PropertyValue::DateTime(dt) => Ok(vec![date_element(dt)]),
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn write_json(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        match value {
            PropertyValue::DateTime(dt) => Ok(vec![Value::String(dt.format(DateFormat::Extended))]),
            other => Err(ScribeError::unexpected(other)),
        }
    }
}

/// Properties holding a DATE or a DATE-TIME: DTSTART, DTEND, DUE and
/// RECURRENCE-ID.
///
/// DATE values are written with `VALUE=DATE`; on input the shape of the value
/// decides, so a missing `VALUE=DATE` is tolerated.
#[derive(Debug, Clone, Copy)]
pub struct DateOrDateTimeScribe {
    inner: DateTimeScribe,
}

impl DateOrDateTimeScribe {
    /// Scribe for the named property.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            inner: DateTimeScribe::new(name),
        }
    }
}

impl Scribe for DateOrDateTimeScribe {
    fn name(&self) -> &str {
        self.inner.name
    }

    fn default_data_type(&self, version: ICalVersion) -> DataType {
        self.inner.default_data_type(version)
    }

    fn data_type(&self, value: &PropertyValue, version: ICalVersion) -> DataType {
        self.inner.data_type(value, version)
    }

    fn prepare_parameters(&self, property: &Property, ctx: &WriteContext) -> Parameters {
        self.inner.prepare_parameters(property, ctx)
    }

    fn write_text(&self, value: &PropertyValue, ctx: &WriteContext) -> Result<String, ScribeError> {
        self.inner.write_text(value, ctx)
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&DataType>,
        parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        check_data_type(data_type, &[DataType::DateTime, DataType::Date])?;
        parse_value(value, parameters).map(PropertyValue::DateTime)
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        self.inner.write_xml(value, ctx)
    }

    fn write_json(&self, value: &PropertyValue, ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        self.inner.write_json(value, ctx)
    }
}

/// Comma separated DATE or DATE-TIME lists: EXDATE, and RDATE which may also
/// hold periods.
#[derive(Debug, Clone, Copy)]
pub struct DateListScribe {
    name: &'static str,
    periods: bool,
}

impl DateListScribe {
    /// Date and date-time lists, e.g. EXDATE.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            periods: false,
        }
    }

    /// Lists that may also be periods, e.g. RDATE.
    #[must_use]
    pub const fn with_periods(name: &'static str) -> Self {
        Self {
            name,
            periods: true,
        }
    }
}

impl Scribe for DateListScribe {
    fn name(&self) -> &str {
        self.name
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::DateTime
    }

    fn data_type(&self, value: &PropertyValue, version: ICalVersion) -> DataType {
        match value {
            PropertyValue::DateTimes(dates) => dates
                .first()
                .map_or_else(|| self.default_data_type(version), date_type),
            PropertyValue::Periods(_) => DataType::Period,
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
            PropertyValue::DateTimes(dates) => sync_tzid(&mut parameters, dates.first()),
            PropertyValue::Periods(periods) => {
                sync_tzid(&mut parameters, periods.first().map(|p| &p.start));
            }
            _ => {}
        }
        parameters
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::DateTimes(dates) => {
                Ok(join_formatted(dates, |dt| dt.format(DateFormat::Basic)))
            }
            PropertyValue::Periods(periods) if self.periods => {
                Ok(join_formatted(periods, |p| p.format(DateFormat::Basic)))
            }
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
        if self.periods {
            check_data_type(data_type, &[DataType::DateTime, DataType::Date, DataType::Period])?;
        } else {
            check_data_type(data_type, &[DataType::DateTime, DataType::Date])?;
        }

        let is_period = data_type == Some(&DataType::Period) || (self.periods && value.contains('/'));
        if is_period {
            value
                .split(',')
                .map(|p| parse_period_value(p, parameters))
                .collect::<Result<_, _>>()
                .map(PropertyValue::Periods)
        } else {
            value
                .split(',')
                .map(|dt| parse_value(dt, parameters))
                .collect::<Result<_, _>>()
                .map(PropertyValue::DateTimes)
        }
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        _ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        match value {
            PropertyValue::DateTimes(dates) => Ok(dates.iter().map(date_element).collect()),
            PropertyValue::Periods(periods) if self.periods => {
                Ok(periods.iter().map(period_element).collect())
            }
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        let period_name = DataType::Period.structured_name();
        if self.periods && element.children.iter().any(|c| c.name == period_name) {
            return element
                .children_named(&period_name)
                .map(|c| period_from_element(c, parameters))
                .collect::<Result<_, _>>()
                .map(PropertyValue::Periods);
        }
        element
            .children
            .iter()
            .map(|c| parse_value(&c.text, parameters))
            .collect::<Result<_, _>>()
            .map(PropertyValue::DateTimes)
    }

    fn write_json(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        match value {
            PropertyValue::DateTimes(dates) => Ok(dates
                .iter()
                .map(|dt| Value::String(dt.format(DateFormat::Extended)))
                .collect()),
            PropertyValue::Periods(periods) if self.periods => Ok(periods
                .iter()
                .map(|p| Value::String(p.format(DateFormat::Extended)))
                .collect()),
            other => Err(ScribeError::unexpected(other)),
        }
    }
}

/// FREEBUSY, a comma separated PERIOD list.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodListScribe;

impl Scribe for PeriodListScribe {
    fn name(&self) -> &str {
        KW_FREEBUSY
    }

    fn default_data_type(&self, _version: ICalVersion) -> DataType {
        DataType::Period
    }

    fn write_text(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<String, ScribeError> {
        match value {
            PropertyValue::Periods(periods) => {
                Ok(join_formatted(periods, |p| p.format(DateFormat::Basic)))
            }
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
        check_data_type(data_type, &[DataType::Period])?;
        value
            .split(',')
            .map(|p| parse_period_value(p, parameters))
            .collect::<Result<_, _>>()
            .map(PropertyValue::Periods)
    }

    fn write_xml(
        &self,
        value: &PropertyValue,
        _ctx: &WriteContext,
    ) -> Result<Vec<XmlElement>, ScribeError> {
        match value {
            PropertyValue::Periods(periods) => Ok(periods.iter().map(period_element).collect()),
            other => Err(ScribeError::unexpected(other)),
        }
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        parameters: &Parameters,
        _ctx: &mut ParseContext,
    ) -> Result<PropertyValue, ScribeError> {
        element
            .children
            .iter()
            .map(|c| period_from_element(c, parameters))
            .collect::<Result<_, _>>()
            .map(PropertyValue::Periods)
    }

    fn write_json(&self, value: &PropertyValue, _ctx: &WriteContext) -> Result<Vec<Value>, ScribeError> {
        match value {
            PropertyValue::Periods(periods) => Ok(periods
                .iter()
                .map(|p| Value::String(p.format(DateFormat::Extended)))
                .collect()),
            other => Err(ScribeError::unexpected(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;
    use crate::keyword::{KW_DTSTART, KW_RDATE, KW_VALUE};

    fn parse(scribe: &dyn Scribe, value: &str, parameters: &Parameters) -> PropertyValue {
        let mut ctx = ParseContext::default();
        scribe
            .parse_text(value, parameters.value_type().as_ref(), parameters, &mut ctx)
            .unwrap()
    }

    #[test]
    fn date_only_value_gets_value_date() {
        let scribe = DateOrDateTimeScribe::new(KW_DTSTART);
        let value = parse(&scribe, "20240315", &Parameters::new());
        assert_eq!(value, PropertyValue::DateTime(ICalDateTime::date(date(2024, 3, 15))));

        let property = Property::new(KW_DTSTART, value);
        let ctx = WriteContext::default();
        let parameters = scribe.prepare_parameters(&property, &ctx);
        assert_eq!(parameters.get(KW_VALUE), Some("DATE"));
        assert_eq!(scribe.write_text(&property.value, &ctx).unwrap(), "20240315");
    }

    #[test]
    fn date_time_value_drops_stale_value_parameter() {
        let scribe = DateOrDateTimeScribe::new(KW_DTSTART);
        let value = parse(&scribe, "20240315T093000Z", &Parameters::new());
        let property = Property::new(KW_DTSTART, value).with_parameter(KW_VALUE, "DATE");
        let parameters = scribe.prepare_parameters(&property, &WriteContext::default());
        assert!(!parameters.contains(KW_VALUE));
        assert_eq!(property.parameters.get(KW_VALUE), Some("DATE"), "original is untouched");
    }

    #[test]
    fn tzid_ties_value_to_named_zone() {
        let scribe = DateOrDateTimeScribe::new(KW_DTSTART);
        let params: Parameters = [(KW_TZID, "Europe/Berlin")].into_iter().collect();
        let value = parse(&scribe, "20240315T093000", &params);
        let PropertyValue::DateTime(dt) = &value else {
            panic!("expected date-time, got {value:?}");
        };
        assert_eq!(dt.tzid(), Some("Europe/Berlin"));

        let mut utc = dt.clone();
        utc.zone = Zone::Utc;
        let property = Property {
            name: KW_DTSTART.to_string(),
            parameters: params,
            value: PropertyValue::DateTime(utc),
        };
        let prepared = scribe.prepare_parameters(&property, &WriteContext::default());
        assert!(!prepared.contains(KW_TZID));
    }

    #[test]
    fn date_time_scribe_rejects_value_date() {
        let scribe = DateTimeScribe::new("DTSTAMP");
        let mut ctx = ParseContext::default();
        let result = scribe.parse_text("20240315", Some(&DataType::Date), &Parameters::new(), &mut ctx);
        assert!(matches!(result, Err(ScribeError::CannotParse(_))));
        let result = scribe.parse_text("yesterday", None, &Parameters::new(), &mut ctx);
        assert!(matches!(result, Err(ScribeError::CannotParse(_))));
    }

    #[test]
    fn rdate_accepts_dates_and_periods() {
        let scribe = DateListScribe::with_periods(KW_RDATE);
        let dates = parse(&scribe, "20240101T000000Z,20240102T000000Z", &Parameters::new());
        assert!(matches!(&dates, PropertyValue::DateTimes(d) if d.len() == 2));

        let params: Parameters = [(KW_VALUE, "PERIOD")].into_iter().collect();
        let periods = parse(&scribe, "19970101T180000Z/PT5H30M", &params);
        let property = Property::new(KW_RDATE, periods.clone());
        let prepared = scribe.prepare_parameters(&property, &WriteContext::default());
        assert_eq!(prepared.get(KW_VALUE), Some("PERIOD"));
        assert_eq!(
            scribe.write_text(&periods, &WriteContext::default()).unwrap(),
            "19970101T180000Z/PT5H30M"
        );
    }

    #[test]
    fn exdate_does_not_take_periods() {
        let scribe = DateListScribe::new("EXDATE");
        let mut ctx = ParseContext::default();
        let result = scribe.parse_text(
            "19970101T180000Z/PT1H",
            Some(&DataType::Period),
            &Parameters::new(),
            &mut ctx,
        );
        assert!(result.is_err());
    }

    #[test]
    fn periods_in_xml() {
        let scribe = PeriodListScribe;
        let value = parse(&scribe, "19970308T160000Z/PT8H30M", &Parameters::new());
        let children = scribe.write_xml(&value, &WriteContext::default()).unwrap();
        assert_eq!(children[0].name, "period");
        assert_eq!(children[0].child_text("start"), Some("1997-03-08T16:00:00Z"));
        assert_eq!(children[0].child_text("duration"), Some("PT8H30M"));

        let element = XmlElement {
            name: "freebusy".to_string(),
            text: String::new(),
            children,
        };
        let mut ctx = ParseContext::default();
        assert_eq!(scribe.parse_xml(&element, &Parameters::new(), &mut ctx).unwrap(), value);
    }
}
