//! Arithmetic expressions used by `calculated_equality` rules.
//!
//! Three forms, tried in this order:
//! - numeric literal: `50`, `49.6`, `-3`
//! - aggregate: `sum(items[].ex_tax)`, summing `ex_tax` over the list at `items`
//! - field reference: `budget.total_yen`
//!
//! Anything else is an [`ExprError`]. Parse failures never degrade to zero.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::evaluator::checks::as_number;
use crate::evaluator::CheckError;
use crate::path::{type_name, FieldPath, PathError, ResolveError, Resolved};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("expression is empty")]
    Empty,

    #[error("literal '{0}' is not a finite number")]
    NonFinite(String),

    #[error("malformed sum expression '{expr}': {reason}")]
    MalformedSum { expr: String, reason: &'static str },

    #[error("unsupported expression '{expr}': {source}")]
    InvalidPath {
        expr: String,
        #[source]
        source: PathError,
    },
}

/// Parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Field(FieldPath),
    Sum { list: FieldPath, field: String },
}

impl Expr {
    pub fn parse(input: &str) -> Result<Self, ExprError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ExprError::Empty);
        }

        // `inf`, `nan` and friends parse as f64 but are field names here.
        if !s.starts_with(|c: char| c.is_alphabetic()) {
            if let Ok(n) = s.parse::<f64>() {
                return if n.is_finite() {
                    Ok(Expr::Literal(n))
                } else {
                    Err(ExprError::NonFinite(s.to_string()))
                };
            }
        }

        if let Some(rest) = s.strip_prefix("sum(") {
            return parse_sum(s, rest);
        }

        FieldPath::parse(s)
            .map(Expr::Field)
            .map_err(|source| ExprError::InvalidPath {
                expr: s.to_string(),
                source,
            })
    }

    /// Evaluate against application data.
    ///
    /// Absent and non-numeric values count as zero. Only a tree whose shape
    /// contradicts the expression (e.g. `sum` over a string) is an error.
    pub fn evaluate(&self, data: &Value) -> Result<f64, ResolveError> {
        match self {
            Expr::Literal(n) => Ok(*n),
            Expr::Field(path) => Ok(path
                .resolve(data)?
                .value()
                .and_then(as_number)
                .unwrap_or(0.0)),
            Expr::Sum { list, field } => {
                let items = match list.resolve(data)? {
                    Resolved::Absent | Resolved::Present(Value::Null) => return Ok(0.0),
                    Resolved::Present(Value::Array(items)) => items,
                    Resolved::Present(other) => {
                        return Err(ResolveError::NotAList {
                            path: list.to_string(),
                            found: type_name(other),
                        })
                    }
                };
                Ok(items
                    .iter()
                    .filter_map(Value::as_object)
                    .filter_map(|item| item.get(field))
                    .filter_map(as_number)
                    .sum())
            }
        }
    }
}

fn parse_sum(expr: &str, rest: &str) -> Result<Expr, ExprError> {
    let malformed = |reason| ExprError::MalformedSum {
        expr: expr.to_string(),
        reason,
    };

    let inner = rest
        .strip_suffix(')')
        .ok_or_else(|| malformed("missing closing ')'"))?;
    let (list, field) = inner
        .split_once("[].")
        .ok_or_else(|| malformed("expected '<list>[].<field>'"))?;

    let list = FieldPath::parse(list).map_err(|source| ExprError::InvalidPath {
        expr: expr.to_string(),
        source,
    })?;
    let field_path = FieldPath::parse(field).map_err(|source| ExprError::InvalidPath {
        expr: expr.to_string(),
        source,
    })?;
    if field_path.segments().len() != 1 {
        return Err(malformed("summed field must be a single key"));
    }

    Ok(Expr::Sum {
        list,
        field: field_path.as_str().to_string(),
    })
}

impl FromStr for Expr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(n) => write!(f, "{}", n),
            Expr::Field(path) => write!(f, "{}", path),
            Expr::Sum { list, field } => write!(f, "sum({}[].{})", list, field),
        }
    }
}

/// One side of a `calculated_equality` rule.
///
/// Keeps the authored text and the parse outcome. A parse failure does not
/// reject the rule set; it is reported each time the rule is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    source: String,
    parsed: Result<Expr, ExprError>,
}

impl Operand {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let parsed = Expr::parse(&source);
        Self { source, parsed }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> Result<&Expr, &ExprError> {
        self.parsed.as_ref()
    }

    pub fn evaluate(&self, data: &Value) -> Result<f64, CheckError> {
        let expr = self.parsed.as_ref().map_err(|e| CheckError::Expression(e.clone()))?;
        Ok(expr.evaluate(data)?)
    }
}
