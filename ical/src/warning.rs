// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Non-fatal problems found while reading or marshalling iCalendar data.

use std::fmt::{self, Display};

/// Catalog of warnings, each with a stable numeric code and a message template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WarningKind {
    /// A line that is neither a component boundary nor a property.
    #[error("skipping malformed line: {text}")]
    InvalidLine {
        /// The offending logical line.
        text: String,
    },

    /// An `END` whose name differs from the innermost open component.
    #[error("END:{found} does not match the open component {expected}")]
    UnmatchedEnd {
        /// Name found on the END line.
        found: String,
        /// Name of the innermost open component, if any.
        expected: String,
    },

    /// A parameter written without `=value`.
    #[error("parameter {parameter} has no value")]
    ValuelessParameter {
        /// Parameter name.
        parameter: String,
    },

    /// The property value could not be parsed; it is kept verbatim.
    #[error("could not parse property value: {reason}")]
    UnparseableValue {
        /// Why parsing failed.
        reason: String,
    },

    /// The property was dropped.
    #[error("property skipped: {reason}")]
    SkippedProperty {
        /// Why the property was dropped.
        reason: String,
    },

    /// A recurrence rule part without `name=value` shape.
    #[error("ignoring malformed recurrence rule part \"{part}\"")]
    InvalidRecurPart {
        /// The malformed part.
        part: String,
    },

    /// A recurrence rule without the required `FREQ` part.
    #[error("recurrence rule has no FREQ part")]
    MissingFrequency,

    /// A recurrence rule value that does not fit its part.
    #[error("ignoring invalid {name} value \"{value}\"")]
    InvalidRecurValue {
        /// Part name.
        name: String,
        /// Rejected value.
        value: String,
    },

    /// A `VERSION` property whose value is not a known version.
    #[error("unrecognized iCalendar version \"{value}\"")]
    UnknownVersion {
        /// The version text.
        value: String,
    },

    /// End of input reached while a component was still open.
    #[error("component {name} was never closed")]
    UnclosedComponent {
        /// Name of the open component.
        name: String,
    },

    /// A single-valued parameter or rule part given more than one value;
    /// only the first is kept.
    #[error("{name} takes one value, ignoring \"{ignored}\"")]
    ExtraValues {
        /// Parameter or rule part name.
        name: String,
        /// The ignored values, comma-joined.
        ignored: String,
    },
}

impl WarningKind {
    /// Stable numeric code of this warning.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::InvalidLine { .. } => 1,
            Self::UnmatchedEnd { .. } => 2,
            Self::ValuelessParameter { .. } => 3,
            Self::UnparseableValue { .. } => 4,
            Self::SkippedProperty { .. } => 5,
            Self::InvalidRecurPart { .. } => 6,
            Self::MissingFrequency => 7,
            Self::InvalidRecurValue { .. } => 8,
            Self::UnknownVersion { .. } => 9,
            Self::UnclosedComponent { .. } => 10,
            Self::ExtraValues { .. } => 11,
        }
    }
}

/// A warning with optional location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Catalog code, `None` for free-form messages.
    pub code: Option<u32>,
    /// Human-readable message.
    pub message: String,
    /// Line number of the logical line the warning refers to.
    pub line: Option<usize>,
    /// Name of the property the warning refers to.
    pub property: Option<String>,
}

impl Warning {
    /// Free-form warning without a catalog code.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            line: None,
            property: None,
        }
    }

    /// Attach a line number.
    #[must_use]
    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    /// Attach a property name.
    #[must_use]
    pub fn for_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }
}

impl From<WarningKind> for Warning {
    fn from(kind: WarningKind) -> Self {
        Self {
            code: Some(kind.code()),
            message: kind.to_string(),
            line: None,
            property: None,
        }
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {line}: ")?;
        }
        if let Some(property) = &self.property {
            write!(f, "{property}: ")?;
        }
        if let Some(code) = self.code {
            write!(f, "(#{code}) ")?;
        }
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_from_kind_carries_code_and_message() {
        let warning = Warning::from(WarningKind::MissingFrequency);
        assert_eq!(warning.code, Some(7));
        assert_eq!(warning.message, "recurrence rule has no FREQ part");
    }

    #[test]
    fn warning_display_includes_location() {
        let warning = Warning::from(WarningKind::InvalidLine {
            text: "bad-line".to_string(),
        })
        .at_line(Some(3));
        assert_eq!(
            warning.to_string(),
            "line 3: (#1) skipping malformed line: bad-line"
        );

        let warning = Warning::message("odd").for_property("SUMMARY");
        assert_eq!(warning.to_string(), "SUMMARY: odd");
    }
}
