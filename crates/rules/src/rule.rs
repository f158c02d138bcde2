//! Typed rules and the immutable [`RuleSet`] built from definitions.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shinsei_core::RulesConfig;
use tracing::{debug, warn};

use crate::error::{Result, RuleError};
use crate::evaluator::RuleEvaluator;
use crate::expr::Operand;
use crate::fuzzy::suggest;
use crate::path::FieldPath;
use crate::result::ValidationResult;
use crate::schema::{
    CalcParams, EnumParams, NoParams, RangeParams, RuleDefinition, RuleKind, RuleSetDefinition,
    Severity,
};

/// Where a rule comes from: the regulation or guideline that justifies it.
///
/// Not used by evaluation; kept for audit trails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    pub source_id: String,
    pub quote: String,
}

/// The check a rule performs, with its parameters validated up front.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleCheck {
    /// Field value is truthy.
    Boolean { field: FieldPath },
    /// Field value equals one of `allowed`.
    EnumMembership { field: FieldPath, allowed: Vec<Value> },
    /// Field value, as a number, lies in the inclusive range.
    NumberRange {
        field: FieldPath,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Presence flag for an uploaded file.
    FileRequired { field: FieldPath },
    /// Every path is truthy. An empty list never passes.
    CompoundRequired {
        fields: Vec<FieldPath>,
        anchor: Option<FieldPath>,
    },
    /// `|lhs - rhs| <= tolerance`.
    CalculatedEquality {
        lhs: Operand,
        rhs: Operand,
        tolerance: f64,
        anchor: Option<FieldPath>,
    },
    /// Same check as `FileRequired`; the UI offers an upload or a form.
    FileOrForm { field: FieldPath },
}

impl RuleCheck {
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleCheck::Boolean { .. } => RuleKind::Boolean,
            RuleCheck::EnumMembership { .. } => RuleKind::EnumMembership,
            RuleCheck::NumberRange { .. } => RuleKind::NumberRange,
            RuleCheck::FileRequired { .. } => RuleKind::FileRequired,
            RuleCheck::CompoundRequired { .. } => RuleKind::CompoundRequired,
            RuleCheck::CalculatedEquality { .. } => RuleKind::CalculatedEquality,
            RuleCheck::FileOrForm { .. } => RuleKind::FileOrForm,
        }
    }

    /// The field a finding for this rule points at, if any.
    pub fn field(&self) -> Option<&FieldPath> {
        match self {
            RuleCheck::Boolean { field }
            | RuleCheck::EnumMembership { field, .. }
            | RuleCheck::NumberRange { field, .. }
            | RuleCheck::FileRequired { field }
            | RuleCheck::FileOrForm { field } => Some(field),
            RuleCheck::CompoundRequired { anchor, .. }
            | RuleCheck::CalculatedEquality { anchor, .. } => anchor.as_ref(),
        }
    }
}

/// A single parsed rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    pub check: RuleCheck,
    pub provenance: Provenance,
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        self.check.kind()
    }

    /// Build a typed rule from its definition.
    ///
    /// `position` is only used to identify a rule with an empty id.
    pub fn from_definition(
        def: &RuleDefinition,
        position: usize,
        config: &RulesConfig,
    ) -> Result<Self> {
        let id = def.id.trim();
        if id.is_empty() {
            return Err(RuleError::EmptyId(position));
        }

        let kind: RuleKind = def.kind.trim().parse().map_err(|_| RuleError::UnknownKind {
            rule_id: id.to_string(),
            kind: def.kind.clone(),
            suggestion: suggest(&def.kind, RuleKind::NAMES).map(str::to_string),
        })?;

        let field = def
            .field
            .as_deref()
            .map(FieldPath::parse)
            .transpose()
            .map_err(|e| definition_error(id, format!("invalid `field`: {e}")))?;

        if def.fields.is_some() && kind != RuleKind::CompoundRequired {
            return Err(definition_error(
                id,
                format!("`fields` is only valid for compound_required, not {kind}"),
            ));
        }

        let required_field = |field: Option<FieldPath>| {
            field.ok_or_else(|| definition_error(id, format!("`field` is required for {kind} rules")))
        };

        let check = match kind {
            RuleKind::Boolean => {
                parameters::<NoParams>(id, kind, &def.parameters)?;
                RuleCheck::Boolean {
                    field: required_field(field)?,
                }
            }
            RuleKind::EnumMembership => {
                let p: EnumParams = parameters(id, kind, &def.parameters)?;
                if p.allowed.is_empty() {
                    return Err(definition_error(id, "`allowed` must not be empty".to_string()));
                }
                RuleCheck::EnumMembership {
                    field: required_field(field)?,
                    allowed: p.allowed,
                }
            }
            RuleKind::NumberRange => {
                let p: RangeParams = parameters(id, kind, &def.parameters)?;
                for bound in [p.min, p.max].into_iter().flatten() {
                    if !bound.is_finite() {
                        return Err(definition_error(id, "range bounds must be finite".to_string()));
                    }
                }
                if let (Some(min), Some(max)) = (p.min, p.max) {
                    if min > max {
                        return Err(definition_error(
                            id,
                            format!("`min` ({min}) is greater than `max` ({max})"),
                        ));
                    }
                }
                RuleCheck::NumberRange {
                    field: required_field(field)?,
                    min: p.min,
                    max: p.max,
                }
            }
            RuleKind::FileRequired => {
                parameters::<NoParams>(id, kind, &def.parameters)?;
                RuleCheck::FileRequired {
                    field: required_field(field)?,
                }
            }
            RuleKind::FileOrForm => {
                parameters::<NoParams>(id, kind, &def.parameters)?;
                RuleCheck::FileOrForm {
                    field: required_field(field)?,
                }
            }
            RuleKind::CompoundRequired => {
                parameters::<NoParams>(id, kind, &def.parameters)?;
                let fields = def
                    .fields
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|f| FieldPath::parse(f))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| definition_error(id, format!("invalid entry in `fields`: {e}")))?;
                if fields.is_empty() {
                    warn!(rule_id = %id, "compound_required rule has no fields and will always fail");
                }
                RuleCheck::CompoundRequired {
                    fields,
                    anchor: field,
                }
            }
            RuleKind::CalculatedEquality => {
                let p: CalcParams = parameters(id, kind, &def.parameters)?;
                let tolerance = p.tolerance.unwrap_or(config.default_tolerance);
                if !tolerance.is_finite() || tolerance < 0.0 {
                    return Err(definition_error(
                        id,
                        format!("`tolerance` must be a non-negative number, got {tolerance}"),
                    ));
                }
                let lhs = Operand::new(p.lhs);
                let rhs = Operand::new(p.rhs);
                for (side, operand) in [("lhs", &lhs), ("rhs", &rhs)] {
                    if let Err(e) = operand.expr() {
                        warn!(
                            rule_id = %id,
                            side,
                            expression = operand.source(),
                            error = %e,
                            "unparseable expression; rule will report an evaluation error"
                        );
                    }
                }
                RuleCheck::CalculatedEquality {
                    lhs,
                    rhs,
                    tolerance,
                    anchor: field,
                }
            }
        };

        Ok(Self {
            id: id.to_string(),
            description: def.description.clone(),
            severity: def.severity,
            check,
            provenance: Provenance {
                source_id: def.source_id.clone(),
                quote: def.quote.clone(),
            },
        })
    }
}

fn definition_error(rule_id: &str, message: String) -> RuleError {
    RuleError::Definition {
        rule_id: rule_id.to_string(),
        message,
    }
}

/// Deserialize the free-form parameter map into the kind's typed payload.
fn parameters<T: DeserializeOwned>(
    rule_id: &str,
    kind: RuleKind,
    params: &Map<String, Value>,
) -> Result<T> {
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| definition_error(rule_id, format!("invalid parameters for {kind}: {e}")))
}

// ── Rule set ────────────────────────────────────────────────────────

/// An ordered, immutable collection of rules.
///
/// Parse once, then share freely: evaluation only reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Parse with the default configuration.
    pub fn parse(definition: &RuleSetDefinition) -> Result<Self> {
        Self::parse_with(definition, &RulesConfig::default())
    }

    /// Parse every definition in eligibility → scope → attachments order.
    ///
    /// The first malformed definition rejects the whole set.
    pub fn parse_with(definition: &RuleSetDefinition, config: &RulesConfig) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(definition.len());

        for (position, def) in definition.iter().enumerate() {
            let rule = Rule::from_definition(def, position, config)?;
            if !seen.insert(rule.id.clone()) {
                return Err(RuleError::DuplicateId(rule.id));
            }
            rules.push(rule);
        }

        debug!(
            rules = rules.len(),
            eligibility = definition.eligibility.len(),
            scope = definition.scope.len(),
            attachments = definition.attachments.len(),
            "parsed rule set"
        );
        Ok(Self { rules })
    }

    /// Parse a `validation` block written as YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let definition: RuleSetDefinition = serde_yaml::from_str(yaml)?;
        Self::parse(&definition)
    }

    /// Parse a `validation` block already decoded as JSON.
    pub fn from_json_value(value: Value) -> Result<Self> {
        let definition: RuleSetDefinition = serde_json::from_value(value)?;
        Self::parse(&definition)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against `data`. See [`RuleEvaluator::evaluate`].
    pub fn validate(&self, data: &Value) -> ValidationResult {
        RuleEvaluator::evaluate(self, data)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
