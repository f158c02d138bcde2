//! Rule lookup inside a subsidy catalog.
//!
//! The catalog is the YAML list of subsidy entries; each entry has an `id`
//! and may carry a `validation` block with `eligibility` / `scope` /
//! `attachments`. Only text is handled here, so reading the file stays
//! with the caller.

use serde_yaml::Value;
use shinsei_core::RulesConfig;
use tracing::{debug, warn};

use crate::error::{Result, RuleError};
use crate::rule::RuleSet;
use crate::schema::RuleSetDefinition;

/// Ids of all subsidies in the catalog, in catalog order.
pub fn subsidy_ids(catalog_yaml: &str) -> Result<Vec<String>> {
    let catalog: Value = serde_yaml::from_str(catalog_yaml)?;
    let ids = entries(&catalog)?
        .filter_map(|entry| entry.transpose())
        .map(|entry| entry.map(|(id, _)| id.to_string()))
        .collect::<Result<Vec<_>>>()?;
    Ok(ids)
}

/// The `validation` block of `subsidy_id`.
///
/// - `Ok(None)`: no subsidy with that id
/// - `Ok(Some(empty))`: the subsidy exists but has no `validation` block
/// - `Err`: the text is not a list of mappings, or the block is malformed
pub fn rules_for_subsidy(catalog_yaml: &str, subsidy_id: &str) -> Result<Option<RuleSetDefinition>> {
    let catalog: Value = serde_yaml::from_str(catalog_yaml)?;

    for entry in entries(&catalog)? {
        let Some((id, map)) = entry? else { continue };
        if id != subsidy_id {
            continue;
        }
        return match map.get("validation") {
            None | Some(Value::Null) => {
                debug!(subsidy_id, "subsidy has no validation block");
                Ok(Some(RuleSetDefinition::default()))
            }
            Some(block) => Ok(Some(serde_yaml::from_value(block.clone())?)),
        };
    }

    warn!(subsidy_id, "subsidy not found in catalog");
    Ok(None)
}

/// Parse the rules of `subsidy_id` straight into a [`RuleSet`].
pub fn rule_set_for_subsidy(
    catalog_yaml: &str,
    subsidy_id: &str,
    config: &RulesConfig,
) -> Result<Option<RuleSet>> {
    rules_for_subsidy(catalog_yaml, subsidy_id)?
        .map(|definition| RuleSet::parse_with(&definition, config))
        .transpose()
}

/// Catalog entries as `(id, mapping)`. Entries without a string `id` yield `None`.
fn entries<'a>(
    catalog: &'a Value,
) -> Result<impl Iterator<Item = Result<Option<(&'a str, &'a serde_yaml::Mapping)>>> + 'a> {
    let list = match catalog {
        Value::Sequence(list) => list,
        Value::Null => return Err(RuleError::Catalog("catalog is empty".to_string())),
        _ => {
            return Err(RuleError::Catalog(
                "expected a list of subsidy entries".to_string(),
            ))
        }
    };

    Ok(list.iter().enumerate().map(|(i, entry)| {
        let map = entry
            .as_mapping()
            .ok_or_else(|| RuleError::Catalog(format!("entry {i} is not a mapping")))?;
        Ok(map.get("id").and_then(Value::as_str).map(|id| (id, map)))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
- id: shoryokuka
  name: 中小企業省力化投資補助金（一般型）
  validation:
    eligibility:
      - id: e-01-sme
        desc: 中小企業者等に該当
        type: boolean
        field: applicant.sme_class_ok
- id: jizokuka
  name: 小規模事業者持続化補助金
- name: entry without id
"#;

    #[test]
    fn finds_validation_block() {
        let def = rules_for_subsidy(CATALOG, "shoryokuka").unwrap().unwrap();
        assert_eq!(def.eligibility.len(), 1);
        assert_eq!(def.eligibility[0].id, "e-01-sme");
    }

    #[test]
    fn missing_block_is_empty_rule_set() {
        let def = rules_for_subsidy(CATALOG, "jizokuka").unwrap().unwrap();
        assert!(def.is_empty());
    }

    #[test]
    fn unknown_subsidy_is_none() {
        assert!(rules_for_subsidy(CATALOG, "it-donyu").unwrap().is_none());
        let set = rule_set_for_subsidy(CATALOG, "it-donyu", &RulesConfig::default()).unwrap();
        assert!(set.is_none());
    }

    #[test]
    fn lists_ids() {
        assert_eq!(subsidy_ids(CATALOG).unwrap(), vec!["shoryokuka", "jizokuka"]);
    }

    #[test]
    fn ids_stop_at_malformed_entry() {
        let err = subsidy_ids("- id: a\n- 42\n- id: b").unwrap_err();
        assert!(matches!(err, RuleError::Catalog(msg) if msg == "entry 1 is not a mapping"));
        assert!(subsidy_ids("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_list_catalog() {
        let err = rules_for_subsidy("id: shoryokuka", "shoryokuka").unwrap_err();
        assert!(matches!(err, RuleError::Catalog(_)));
        assert!(matches!(
            rules_for_subsidy("- plain string", "x").unwrap_err(),
            RuleError::Catalog(_)
        ));
    }

    #[test]
    fn parses_into_rule_set() {
        let set = rule_set_for_subsidy(CATALOG, "shoryokuka", &RulesConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(set.len(), 1);
    }
}
