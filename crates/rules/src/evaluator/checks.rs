//! Per-kind check implementations and the value coercions they share.

use serde_json::Value;

use crate::path::{type_name, FieldPath, Resolved};
use crate::rule::RuleCheck;

use super::{CheckError, Verdict};

// ── Coercions ───────────────────────────────────────────────────────

/// Truthiness of a resolved value.
///
/// Absent, `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Numeric view of a value: numbers, numeric strings, and booleans as 1/0.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Equality used for enum membership: numbers compare by value, so `1`
/// matches `1.0`, and booleans equal 1/0 when compared with a number.
/// Strings never equal numbers.
pub(crate) fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Bool(_), Value::Number(_)) | (Value::Number(_), Value::Bool(_)) => {
            as_number(a) == as_number(b)
        }
        _ => a == b,
    }
}

/// Number for range checks. Absent, `null` and blank strings count as 0;
/// anything else that is not numeric is an error.
fn range_value(path: &FieldPath, resolved: Resolved<'_>) -> Result<f64, CheckError> {
    match resolved {
        Resolved::Absent | Resolved::Present(Value::Null) => Ok(0.0),
        Resolved::Present(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Resolved::Present(v) => as_number(v).ok_or_else(|| CheckError::NotNumeric {
            path: path.to_string(),
            found: type_name(v),
        }),
    }
}

// ── Dispatch ────────────────────────────────────────────────────────

/// Run one check against the data.
pub(crate) fn run<'r>(check: &'r RuleCheck, data: &Value) -> Result<Verdict<'r>, CheckError> {
    match check {
        RuleCheck::Boolean { field }
        | RuleCheck::FileRequired { field }
        | RuleCheck::FileOrForm { field } => {
            let value = field.resolve(data)?.value();
            Ok(Verdict::from_pass(truthy(value), Some(field)))
        }
        RuleCheck::EnumMembership { field, allowed } => {
            let value = field.resolve(data)?.value().unwrap_or(&Value::Null);
            let member = allowed.iter().any(|a| loose_eq(a, value));
            Ok(Verdict::from_pass(member, Some(field)))
        }
        RuleCheck::NumberRange { field, min, max } => {
            let value = range_value(field, field.resolve(data)?)?;
            let min_ok = min.map_or(true, |m| value >= m);
            let max_ok = max.map_or(true, |m| value <= m);
            Ok(Verdict::from_pass(min_ok && max_ok, Some(field)))
        }
        RuleCheck::CompoundRequired { fields, anchor } => {
            if fields.is_empty() {
                return Ok(Verdict::Fail {
                    field: anchor.as_ref(),
                });
            }
            for field in fields {
                if !truthy(field.resolve(data)?.value()) {
                    return Ok(Verdict::Fail { field: Some(field) });
                }
            }
            Ok(Verdict::Pass)
        }
        RuleCheck::CalculatedEquality {
            lhs,
            rhs,
            tolerance,
            anchor,
        } => {
            let l = lhs.evaluate(data)?;
            let r = rhs.evaluate(data)?;
            Ok(Verdict::from_pass((l - r).abs() <= *tolerance, anchor.as_ref()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Operand;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    fn passes(check: &RuleCheck, data: &Value) -> bool {
        matches!(run(check, data).unwrap(), Verdict::Pass)
    }

    #[test]
    fn truthiness() {
        assert!(!truthy(None));
        assert!(!truthy(Some(&json!(null))));
        assert!(!truthy(Some(&json!(false))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(0.0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(Some(&json!([]))));
        assert!(!truthy(Some(&json!({}))));
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!(-1))));
        assert!(truthy(Some(&json!("見積書.pdf"))));
        assert!(truthy(Some(&json!(["a"]))));
    }

    #[test]
    fn number_range_bounds() {
        let check = RuleCheck::NumberRange {
            field: path("budget.total_million"),
            min: Some(1.0),
            max: Some(100.0),
        };
        let at = |v: Value| passes(&check, &json!({"budget": {"total_million": v}}));
        assert!(!at(json!(0)));
        assert!(at(json!(1)));
        assert!(at(json!(100)));
        assert!(!at(json!(101)));
        assert!(at(json!("50")));
        assert!(!at(json!("")));
        assert!(!passes(&check, &json!({})));
    }

    #[test]
    fn number_range_open_bounds() {
        let check = RuleCheck::NumberRange {
            field: path("employees"),
            min: None,
            max: Some(20.0),
        };
        assert!(passes(&check, &json!({"employees": -5})));
        assert!(passes(&check, &json!({})));
        assert!(!passes(&check, &json!({"employees": 21})));
    }

    #[test]
    fn number_range_non_numeric_is_error() {
        let check = RuleCheck::NumberRange {
            field: path("budget"),
            min: Some(1.0),
            max: None,
        };
        let err = run(&check, &json!({"budget": "多め"})).unwrap_err();
        assert_eq!(
            err,
            CheckError::NotNumeric {
                path: "budget".into(),
                found: "string",
            }
        );
    }

    #[test]
    fn enum_membership() {
        let check = RuleCheck::EnumMembership {
            field: path("applicant.industry"),
            allowed: vec![json!("manufacturing"), json!("retail"), json!(3)],
        };
        assert!(passes(&check, &json!({"applicant": {"industry": "retail"}})));
        assert!(passes(&check, &json!({"applicant": {"industry": 3.0}})));
        assert!(!passes(&check, &json!({"applicant": {"industry": "finance"}})));
        assert!(!passes(&check, &json!({})));
    }

    #[test]
    fn enum_membership_bools_equal_one_and_zero() {
        let check = RuleCheck::EnumMembership {
            field: path("employees_class"),
            allowed: vec![json!(1), json!(2.0)],
        };
        assert!(passes(&check, &json!({"employees_class": true})));
        assert!(!passes(&check, &json!({"employees_class": false})));
        assert!(!passes(&check, &json!({"employees_class": "1"})));

        let flags = RuleCheck::EnumMembership {
            field: path("flag"),
            allowed: vec![json!(false)],
        };
        assert!(passes(&flags, &json!({"flag": 0})));
        assert!(passes(&flags, &json!({"flag": 0.0})));
        assert!(!passes(&flags, &json!({"flag": 1})));
    }

    #[test]
    fn compound_reports_first_missing_field() {
        let check = RuleCheck::CompoundRequired {
            fields: vec![path("plan.summary"), path("plan.schedule"), path("plan.effect")],
            anchor: None,
        };
        let data = json!({"plan": {"summary": "省力化", "schedule": ""}});
        match run(&check, &data).unwrap() {
            Verdict::Fail { field } => assert_eq!(field.unwrap().as_str(), "plan.schedule"),
            Verdict::Pass => panic!("expected failure"),
        }

        let full = json!({"plan": {"summary": "a", "schedule": "b", "effect": "c"}});
        assert!(passes(&check, &full));
    }

    #[test]
    fn compound_with_no_fields_fails() {
        let check = RuleCheck::CompoundRequired {
            fields: vec![],
            anchor: None,
        };
        assert_eq!(run(&check, &json!({})).unwrap(), Verdict::Fail { field: None });
    }

    #[test]
    fn calculated_equality_tolerance() {
        let check = |rhs: &str| RuleCheck::CalculatedEquality {
            lhs: Operand::new("sum(items[].ex_tax)"),
            rhs: Operand::new(rhs),
            tolerance: 0.5,
            anchor: None,
        };
        let data = json!({"items": [{"ex_tax": 30}, {"ex_tax": 19.6}]});
        assert!(passes(&check("50"), &data));
        assert!(!passes(&check("49"), &data));
    }

    #[test]
    fn file_checks_treat_flags_as_truthiness() {
        let data = json!({"files": {"quote": false, "plan": "plan.pdf"}});
        let quote = RuleCheck::FileRequired { field: path("files.quote") };
        let plan = RuleCheck::FileOrForm { field: path("files.plan") };
        assert!(!passes(&quote, &data));
        assert!(passes(&plan, &data));
    }
}
