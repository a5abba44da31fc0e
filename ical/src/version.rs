// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar format versions.

use std::fmt::{self, Display};
use std::str::FromStr;

/// The format version a piece of iCalendar data follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ICalVersion {
    /// vCalendar 1.0
    V1_0,
    /// RFC 2445, written as `2.0` like RFC 5545
    V2_0Deprecated,
    /// RFC 5545
    #[default]
    V2_0,
}

impl ICalVersion {
    /// The `VERSION` property value of this version.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V2_0Deprecated | Self::V2_0 => "2.0",
        }
    }

    /// Whether RFC 6868 caret encoding applies to this version.
    #[must_use]
    pub const fn supports_caret_encoding(self) -> bool {
        !matches!(self, Self::V1_0)
    }
}

impl Display for ICalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ICalVersion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.0" => Ok(Self::V1_0),
            "2.0" => Ok(Self::V2_0),
            _ => Err(()),
        }
    }
}
