//! Raw rule definitions as authored in the subsidy `validation` block.
//!
//! These mirror the YAML/JSON shape one-to-one. Nothing here is checked
//! beyond what serde enforces; [`crate::RuleSet::parse`] turns them into
//! typed [`crate::Rule`]s and rejects anything malformed.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::Severity;

/// A `validation` block: three ordered lists of rule definitions.
///
/// The categories are an authoring convenience only. Parsing flattens them
/// in the order eligibility, scope, attachments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSetDefinition {
    #[serde(default)]
    pub eligibility: Vec<RuleDefinition>,
    #[serde(default)]
    pub scope: Vec<RuleDefinition>,
    #[serde(default)]
    pub attachments: Vec<RuleDefinition>,
}

impl RuleSetDefinition {
    /// All definitions in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.eligibility
            .iter()
            .chain(self.scope.iter())
            .chain(self.attachments.iter())
    }

    pub fn len(&self) -> usize {
        self.eligibility.len() + self.scope.len() + self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One rule as written by the author.
///
/// `kind` stays a string here so an unknown value can be reported with a
/// suggestion instead of a bare serde variant error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default, alias = "desc")]
    pub description: String,
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default, alias = "params")]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub quote: String,
}

// ── Typed parameter payloads ────────────────────────────────────────

/// Parameters of `enum_membership`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnumParams {
    pub allowed: Vec<Value>,
}

/// Parameters of `number_range`. Either bound may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RangeParams {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Parameters of `calculated_equality`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CalcParams {
    #[serde(deserialize_with = "expression_text")]
    pub lhs: String,
    #[serde(deserialize_with = "expression_text")]
    pub rhs: String,
    #[serde(default)]
    pub tolerance: Option<f64>,
}

/// Expression source as text. A bare YAML/JSON number is a literal.
fn expression_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Parameters of kinds that take none.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NoParams {}
