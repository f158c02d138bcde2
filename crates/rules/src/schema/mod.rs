//! Rule definition schema with serde deserialization.
//!
//! - `RuleSetDefinition` / `RuleDefinition`: the authored shape, including
//!   the legacy key aliases (`type`, `desc`, `params`)
//! - `RuleKind`: the closed set of check kinds
//! - `Severity`: block / warn
//! - per-kind parameter payloads (`EnumParams`, `RangeParams`, `CalcParams`)

mod definition;
mod kind;
mod severity;

pub use definition::*;
pub use kind::*;
pub use severity::*;
