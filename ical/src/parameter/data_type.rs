// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use crate::keyword::{
    KW_BINARY, KW_BOOLEAN, KW_CAL_ADDRESS, KW_CONTENT_ID, KW_DATE, KW_DATETIME, KW_DURATION_TYPE,
    KW_FLOAT, KW_INTEGER, KW_PERIOD, KW_RECUR, KW_TEXT, KW_TIME, KW_URI, KW_URL_TYPE,
    KW_UTC_OFFSET, XCAL_UNKNOWN,
};
use crate::version::ICalVersion;

macro_rules! impl_data_type_mapping {
    (
        $(#[$attr:meta])*
        enum $ty:ident {
            $(
                $(#[$vattr:meta])*
                $variant:ident => $kw:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $ty {
            $(
                $(#[$vattr])*
                $variant,
            )+
            /// Any other value type, name as written.
            Other(String),
        }

        impl $ty {
            /// Returns the canonical name keyword of the data type
            #[must_use]
            pub fn name(&self) -> &str {
                match self {
                    $(
                        Self::$variant => $kw,
                    )+
                    Self::Other(name) => name,
                }
            }
        }

        impl FromStr for $ty {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($kw) {
                        return Ok(Self::$variant);
                    }
                )+
                Ok(Self::Other(s.to_string()))
            }
        }
    };
}

impl_data_type_mapping! {
    /// Value data types (RFC 5545 Section 3.3, plus vCalendar 1.0 names).
    enum DataType {
        /// BINARY
        Binary => KW_BINARY,
        /// BOOLEAN
        Boolean => KW_BOOLEAN,
        /// CAL-ADDRESS
        CalAddress => KW_CAL_ADDRESS,
        /// DATE
        Date => KW_DATE,
        /// DATE-TIME
        DateTime => KW_DATETIME,
        /// DURATION
        Duration => KW_DURATION_TYPE,
        /// FLOAT
        Float => KW_FLOAT,
        /// INTEGER
        Integer => KW_INTEGER,
        /// PERIOD
        Period => KW_PERIOD,
        /// RECUR
        Recur => KW_RECUR,
        /// TEXT
        Text => KW_TEXT,
        /// TIME
        Time => KW_TIME,
        /// URI
        Uri => KW_URI,
        /// UTC-OFFSET
        UtcOffset => KW_UTC_OFFSET,
        /// vCalendar 1.0 URL
        Url => KW_URL_TYPE,
        /// vCalendar 1.0 CONTENT-ID
        ContentId => KW_CONTENT_ID,
    }
}

impl DataType {
    /// The name used for this data type in the text syntax of `version`.
    #[must_use]
    pub fn text_name(&self, version: ICalVersion) -> &str {
        match (self, version) {
            (Self::Uri, ICalVersion::V1_0) => KW_URL_TYPE,
            (Self::Url, ICalVersion::V2_0 | ICalVersion::V2_0Deprecated) => KW_URI,
            _ => self.name(),
        }
    }

    /// The lower-case name used as xCal element name and jCal type string.
    #[must_use]
    pub fn structured_name(&self) -> String {
        match self {
            Self::Other(_) | Self::ContentId => XCAL_UNKNOWN.to_string(),
            Self::Url => KW_URI.to_ascii_lowercase(),
            _ => self.name().to_ascii_lowercase(),
        }
    }

    /// Look up a data type by its xCal/jCal name; `unknown` yields `None`.
    #[must_use]
    pub fn from_structured_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case(XCAL_UNKNOWN) {
            return None;
        }
        name.parse().ok()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("date-time".parse(), Ok(DataType::DateTime));
        assert_eq!("Utc-Offset".parse(), Ok(DataType::UtcOffset));
        assert_eq!(
            "X-CUSTOM".parse(),
            Ok(DataType::Other("X-CUSTOM".to_string()))
        );
    }

    #[test]
    fn names_depend_on_version_and_syntax() {
        assert_eq!(DataType::Uri.text_name(ICalVersion::V1_0), "URL");
        assert_eq!(DataType::Uri.text_name(ICalVersion::V2_0), "URI");
        assert_eq!(DataType::Url.text_name(ICalVersion::V2_0), "URI");
        assert_eq!(DataType::CalAddress.structured_name(), "cal-address");
        assert_eq!(DataType::Other("X".into()).structured_name(), "unknown");
        assert_eq!(DataType::from_structured_name("unknown"), None);
        assert_eq!(
            DataType::from_structured_name("recur"),
            Some(DataType::Recur)
        );
    }
}
