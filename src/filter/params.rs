use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Copy only allow-listed query keys with non-empty values into a condition
/// map. Unknown keys are ignored rather than rejected.
pub fn allowed_filters(params: &HashMap<String, String>, allowed: &[&str]) -> Map<String, Value> {
    let mut out = Map::new();
    for key in allowed {
        if let Some(v) = params.get(*key) {
            if !v.trim().is_empty() {
                out.insert((*key).to_string(), Value::String(v.clone()));
            }
        }
    }
    out
}

/// Drop null and empty-string entries from a condition map.
pub fn compact_filters(filters: Map<String, Value>) -> Map<String, Value> {
    filters
        .into_iter()
        .filter(|(_, v)| match v {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
        .collect()
}

/// Case-insensitive substring match over any of the given fields, expressed
/// as a `$or` of `$ilike` branches. An empty or whitespace-only term yields
/// an empty condition (matches everything).
pub fn search_condition(term: &str, fields: &[&str]) -> Map<String, Value> {
    let term = term.trim();
    let mut out = Map::new();
    if term.is_empty() || fields.is_empty() {
        return out;
    }

    let pattern = format!("%{}%", term);
    let branches: Vec<Value> = fields
        .iter()
        .map(|field| json!({ *field: { "$ilike": pattern } }))
        .collect();
    out.insert("$or".to_string(), Value::Array(branches));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_filters_keeps_only_allow_listed_keys() {
        let mut params = HashMap::new();
        params.insert("status".to_string(), "ACTIVE".to_string());
        params.insert("role".to_string(), "ADMIN".to_string());
        params.insert("page".to_string(), "3".to_string());

        let out = allowed_filters(&params, &["status", "policy_type"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out["status"], json!("ACTIVE"));
    }

    #[test]
    fn allowed_filters_drops_empty_values() {
        let mut params = HashMap::new();
        params.insert("status".to_string(), "  ".to_string());
        let out = allowed_filters(&params, &["status"]);
        assert!(out.is_empty());
    }

    #[test]
    fn compact_filters_drops_null_and_empty() {
        let mut map = Map::new();
        map.insert("a".to_string(), json!(""));
        map.insert("b".to_string(), Value::Null);
        map.insert("d".to_string(), json!("x"));

        let out = compact_filters(map);
        assert_eq!(out.len(), 1);
        assert_eq!(out["d"], json!("x"));
    }

    #[test]
    fn empty_search_yields_empty_condition() {
        assert!(search_condition("", &["a", "b"]).is_empty());
        assert!(search_condition("   ", &["a", "b"]).is_empty());
    }

    #[test]
    fn search_builds_or_of_ilike_branches() {
        let out = search_condition("storm", &["policy_number", "description"]);
        let branches = out["$or"].as_array().unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0]["policy_number"]["$ilike"], json!("%storm%"));
        assert_eq!(branches[1]["description"]["$ilike"], json!("%storm%"));
    }
}
