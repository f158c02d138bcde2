//! Rule-set level errors. Any of these rejects the whole rule set.

/// Errors raised while turning rule definitions into a [`crate::RuleSet`].
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON deserialization error.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule '{rule_id}': unknown kind '{kind}'{}", did_you_mean(.suggestion))]
    UnknownKind {
        rule_id: String,
        kind: String,
        suggestion: Option<String>,
    },

    /// Missing or malformed `field`, `fields` or `parameters`.
    #[error("rule '{rule_id}': {message}")]
    Definition { rule_id: String, message: String },

    #[error("duplicate rule id '{0}'")]
    DuplicateId(String),

    /// Position is the zero-based index in evaluation order.
    #[error("rule at position {0} has an empty id")]
    EmptyId(usize),

    /// The subsidy catalog does not have the expected shape.
    #[error("catalog error: {0}")]
    Catalog(String),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

/// Result alias for rule-set operations.
pub type Result<T> = std::result::Result<T, RuleError>;
