//! Declarative eligibility / scope / attachment rules for subsidy applications.
//!
//! This crate provides:
//! - YAML/JSON rule definitions with serde deserialization (`schema`)
//! - Parsing into an immutable, typed [`RuleSet`] that rejects malformed rules
//! - Dotted field-path resolution over the application-data tree (`path`)
//! - A tiny arithmetic expression language for `calculated_equality` (`expr`)
//! - Per-kind checks and the [`RuleEvaluator`] producing a [`ValidationResult`]
//! - Rule lookup inside a subsidy catalog (`catalog`)

pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod path;
pub mod result;
pub mod rule;
pub mod schema;

mod fuzzy;

pub use error::{Result, RuleError};
pub use evaluator::{CheckError, RuleEvaluator, Verdict};
pub use expr::{Expr, ExprError, Operand};
pub use path::{FieldPath, PathError, ResolveError, Resolved};
pub use result::{Finding, FindingKind, ValidationResult};
pub use rule::{Provenance, Rule, RuleCheck, RuleSet};
pub use schema::{RuleDefinition, RuleKind, RuleSetDefinition, Severity};
