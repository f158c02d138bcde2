//! Rule kind enum for dispatching a definition to its typed check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported rule kinds. Closed set: a definition naming anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Boolean,
    EnumMembership,
    NumberRange,
    FileRequired,
    CompoundRequired,
    CalculatedEquality,
    FileOrForm,
}

impl RuleKind {
    /// Canonical names, in declaration order.
    pub const NAMES: &'static [&'static str] = &[
        "boolean",
        "enum_membership",
        "number_range",
        "file_required",
        "compound_required",
        "calculated_equality",
        "file_or_form",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Boolean => "boolean",
            RuleKind::EnumMembership => "enum_membership",
            RuleKind::NumberRange => "number_range",
            RuleKind::FileRequired => "file_required",
            RuleKind::CompoundRequired => "compound_required",
            RuleKind::CalculatedEquality => "calculated_equality",
            RuleKind::FileOrForm => "file_or_form",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = String;

    /// Accepts the canonical names plus the legacy `enum_in` / `calc_equal`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(RuleKind::Boolean),
            "enum_membership" | "enum_in" => Ok(RuleKind::EnumMembership),
            "number_range" => Ok(RuleKind::NumberRange),
            "file_required" => Ok(RuleKind::FileRequired),
            "compound_required" => Ok(RuleKind::CompoundRequired),
            "calculated_equality" | "calc_equal" => Ok(RuleKind::CalculatedEquality),
            "file_or_form" => Ok(RuleKind::FileOrForm),
            other => Err(format!("unknown rule kind: '{}'", other)),
        }
    }
}
