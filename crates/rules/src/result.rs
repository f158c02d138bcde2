//! Findings and the aggregate result of one validation run.

use serde::{Deserialize, Serialize};

use crate::evaluator::CheckError;
use crate::path::FieldPath;
use crate::rule::Rule;
use crate::schema::Severity;

/// Whether a finding records a failed check or a rule that could not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Violation,
    EvaluationError,
}

/// One failed (or unevaluable) rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub kind: FindingKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Finding {
    pub(crate) fn violation(rule: &Rule, field: Option<&FieldPath>) -> Self {
        let message = if rule.description.is_empty() {
            format!("rule '{}' failed", rule.id)
        } else {
            rule.description.clone()
        };
        Self {
            rule_id: rule.id.clone(),
            severity: rule.severity,
            kind: FindingKind::Violation,
            message,
            field: field.map(|f| f.to_string()),
        }
    }

    /// Always `Warn`: a broken rule is reported but never blocks submission.
    pub(crate) fn evaluation_error(rule: &Rule, error: &CheckError) -> Self {
        let subject = if rule.description.is_empty() {
            &rule.id
        } else {
            &rule.description
        };
        Self {
            rule_id: rule.id.clone(),
            severity: Severity::Warn,
            kind: FindingKind::EvaluationError,
            message: format!("could not evaluate: {subject} ({error})"),
            field: rule.check.field().map(|f| f.to_string()),
        }
    }

    pub fn is_block(&self) -> bool {
        self.severity == Severity::Block
    }
}

/// All findings of a run, in rule order.
///
/// `submit_ready` is true exactly when no finding has `Block` severity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    submit_ready: bool,
    findings: Vec<Finding>,
}

impl ValidationResult {
    pub fn new(findings: Vec<Finding>) -> Self {
        let submit_ready = !findings.iter().any(Finding::is_block);
        Self {
            submit_ready,
            findings,
        }
    }

    pub fn submit_ready(&self) -> bool {
        self.submit_ready
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Block)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warn)
    }

    pub fn evaluation_errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.kind == FindingKind::EvaluationError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn finding(id: &str, severity: Severity) -> Finding {
        Finding {
            rule_id: id.to_string(),
            severity,
            kind: FindingKind::Violation,
            message: String::new(),
            field: None,
        }
    }

    #[test]
    fn submit_ready_iff_no_block() {
        assert!(ValidationResult::new(vec![]).submit_ready());
        assert!(ValidationResult::new(vec![finding("w", Severity::Warn)]).submit_ready());
        let mixed = ValidationResult::new(vec![
            finding("w", Severity::Warn),
            finding("b", Severity::Block),
        ]);
        assert!(!mixed.submit_ready());
        assert_eq!(mixed.blocks().count(), 1);
        assert_eq!(mixed.warnings().count(), 1);
    }

    #[test]
    fn serializes_for_http_layer() {
        let result = ValidationResult::new(vec![Finding {
            rule_id: "a-01-quote".into(),
            severity: Severity::Block,
            kind: FindingKind::Violation,
            message: "見積書が必須".into(),
            field: Some("files.quote".into()),
        }]);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "submit_ready": false,
                "findings": [{
                    "rule_id": "a-01-quote",
                    "severity": "block",
                    "kind": "violation",
                    "message": "見積書が必須",
                    "field": "files.quote"
                }]
            })
        );
    }
}
