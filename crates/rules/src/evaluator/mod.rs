//! Rule evaluation against one application-data tree.
//!
//! Rules run in definition order. A rule whose check fails yields a
//! violation finding with the rule's severity. A rule that cannot be
//! evaluated (the data tree has the wrong shape, an expression did not
//! parse, a range value is not numeric) yields a `warn` evaluation-error
//! finding instead, and evaluation continues with the next rule.

pub(crate) mod checks;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::expr::ExprError;
use crate::path::{FieldPath, ResolveError};
use crate::result::{Finding, ValidationResult};
use crate::rule::{Rule, RuleSet};

/// Why a single rule could not be evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckError {
    #[error("field resolution failed: {0}")]
    Resolution(#[from] ResolveError),

    #[error("invalid expression: {0}")]
    Expression(#[from] ExprError),

    #[error("'{path}' is a {found}, not a number")]
    NotNumeric { path: String, found: &'static str },
}

/// Outcome of a check that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict<'r> {
    Pass,
    /// `field` is what the finding should point at.
    Fail { field: Option<&'r FieldPath> },
}

impl<'r> Verdict<'r> {
    fn from_pass(pass: bool, field: Option<&'r FieldPath>) -> Self {
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail { field }
        }
    }
}

// ── Rule evaluator ──────────────────────────────────────────────────

/// Evaluates rule sets against application data.
///
/// Stateless: the same inputs always produce the same result, and any
/// number of threads may evaluate the same [`RuleSet`] at once.
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// Run every rule and collect findings in rule order.
    pub fn evaluate(rules: &RuleSet, data: &Value) -> ValidationResult {
        let findings: Vec<Finding> = rules
            .iter()
            .filter_map(|rule| Self::finding_for(rule, data))
            .collect();

        let result = ValidationResult::new(findings);
        debug!(
            rules = rules.len(),
            blocks = result.blocks().count(),
            warnings = result.warnings().count(),
            submit_ready = result.submit_ready(),
            "validation complete"
        );
        result
    }

    /// Run a single rule's check.
    pub fn check<'r>(rule: &'r Rule, data: &Value) -> Result<Verdict<'r>, CheckError> {
        checks::run(&rule.check, data)
    }

    fn finding_for(rule: &Rule, data: &Value) -> Option<Finding> {
        match Self::check(rule, data) {
            Ok(Verdict::Pass) => None,
            Ok(Verdict::Fail { field }) => {
                info!(rule_id = %rule.id, severity = %rule.severity, "validation failed: {}", rule.description);
                Some(Finding::violation(rule, field))
            }
            Err(e) => {
                warn!(rule_id = %rule.id, kind = %rule.kind(), error = %e, "rule could not be evaluated");
                Some(Finding::evaluation_error(rule, &e))
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
