//! Finding severity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `Block` prevents submission; `Warn` is advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Block,
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Block => write!(f, "block"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}
