//! Dotted field paths into the application-data tree.
//!
//! `applicant.sme_class_ok` addresses `data["applicant"]["sme_class_ok"]`.
//! A missing key is a normal condition (the applicant has not answered yet)
//! and resolves to [`Resolved::Absent`]. Walking *through* a value that is
//! not a mapping is a schema violation and yields a [`ResolveError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Characters that may not appear inside a path segment.
const RESERVED: &[char] = &['(', ')', '[', ']', ',', '+', '*', '/', '='];

/// Errors in the text of a path. Raised while parsing rule definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("field path is empty")]
    Empty,

    #[error("field path '{path}' has an empty segment")]
    EmptySegment { path: String },

    #[error("field path '{path}' contains invalid character '{ch}'")]
    InvalidChar { path: String, ch: char },
}

/// A resolution failure: the data tree does not have the shape the path expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("'{path}' cannot be resolved: '{at}' is a {found}, not a mapping")]
    NotAMapping {
        path: String,
        at: String,
        found: &'static str,
    },

    #[error("'{path}' is a {found}, not a list")]
    NotAList { path: String, found: &'static str },
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    Present(&'a Value),
    Absent,
}

impl<'a> Resolved<'a> {
    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Resolved::Present(v) => Some(v),
            Resolved::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }
}

/// A validated dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path. Surrounding whitespace is trimmed.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: raw.to_string(),
                });
            }
            if let Some(ch) = segment
                .chars()
                .find(|c| c.is_whitespace() || RESERVED.contains(c))
            {
                return Err(PathError::InvalidChar {
                    path: raw.to_string(),
                    ch,
                });
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk `data` along this path.
    ///
    /// - missing key at any depth → `Absent`
    /// - `null` in an intermediate position → `Absent`
    /// - any other non-mapping in an intermediate position → `NotAMapping`
    pub fn resolve<'a>(&self, data: &'a Value) -> Result<Resolved<'a>, ResolveError> {
        let mut current = data;
        for (i, segment) in self.segments.iter().enumerate() {
            current = match current {
                Value::Object(map) => match map.get(segment) {
                    Some(v) => v,
                    None => return Ok(Resolved::Absent),
                },
                Value::Null if i > 0 => return Ok(Resolved::Absent),
                other => {
                    return Err(ResolveError::NotAMapping {
                        path: self.raw.clone(),
                        at: if i == 0 {
                            "<root>".to_string()
                        } else {
                            self.segments[..i].join(".")
                        },
                        found: type_name(other),
                    })
                }
            };
        }
        Ok(Resolved::Present(current))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// JSON type name for diagnostics.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn parse_splits_segments() {
        let p = path(" applicant.sme_class_ok ");
        assert_eq!(p.as_str(), "applicant.sme_class_ok");
        assert_eq!(p.segments(), &["applicant", "sme_class_ok"]);
        assert_eq!(path("total").segments().len(), 1);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(FieldPath::parse("  "), Err(PathError::Empty));
        assert!(matches!(
            FieldPath::parse("a..b"),
            Err(PathError::EmptySegment { .. })
        ));
        assert!(matches!(
            FieldPath::parse(".a"),
            Err(PathError::EmptySegment { .. })
        ));
        assert!(matches!(
            FieldPath::parse("items[].x"),
            Err(PathError::InvalidChar { ch: '[', .. })
        ));
        assert!(matches!(
            FieldPath::parse("a b"),
            Err(PathError::InvalidChar { ch: ' ', .. })
        ));
    }

    #[test]
    fn resolve_present_and_absent() {
        let data = json!({"applicant": {"sme_class_ok": true, "name": null}});
        assert_eq!(
            path("applicant.sme_class_ok").resolve(&data).unwrap(),
            Resolved::Present(&json!(true))
        );
        assert_eq!(
            path("applicant.name").resolve(&data).unwrap(),
            Resolved::Present(&Value::Null)
        );
        assert!(path("applicant.missing").resolve(&data).unwrap().is_absent());
        assert!(path("budget.total").resolve(&data).unwrap().is_absent());
        assert!(path("applicant.name.kana").resolve(&data).unwrap().is_absent());
    }

    #[test]
    fn resolve_through_scalar_is_error() {
        let data = json!({"applicant": {"name": "山田商店"}, "items": [{"x": 1}]});
        let err = path("applicant.name.kana").resolve(&data).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotAMapping {
                path: "applicant.name.kana".into(),
                at: "applicant.name".into(),
                found: "string",
            }
        );
        assert!(path("items.x").resolve(&data).is_err());
    }

    #[test]
    fn resolve_against_non_mapping_root() {
        let err = path("a").resolve(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("<root>"));
    }

    #[test]
    fn deserialize_validates() {
        let p: FieldPath = serde_json::from_value(json!("files.quote")).unwrap();
        assert_eq!(p.to_string(), "files.quote");
        assert!(serde_json::from_value::<FieldPath>(json!("files..quote")).is_err());
    }
}
