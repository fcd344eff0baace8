use serde_json::Value;

use super::error::FilterError;
use super::types::{validate_column, FilterOp};

/// Renders a JSON condition tree into a parameterized WHERE clause.
///
/// Field keys become `"column" OP $n` conditions joined with AND; `$and`,
/// `$or` and `$not` keys nest sub-trees. An empty tree renders to an empty
/// clause (matches everything).
pub struct FilterWhere {
    param_values: Vec<Value>,
    starting_param_index: usize,
}

impl FilterWhere {
    pub fn generate(
        where_data: &Value,
        starting_param_index: usize,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self {
            param_values: vec![],
            starting_param_index,
        };
        let clause = filter_where.render(where_data)?;
        Ok((clause, filter_where.param_values))
    }

    fn render(&mut self, where_data: &Value) -> Result<String, FilterError> {
        match where_data {
            Value::Null => Ok(String::new()),
            Value::Object(obj) => {
                let mut parts = Vec::new();
                for (key, value) in obj {
                    if key.starts_with('$') {
                        let clause = self.render_logical(key, value)?;
                        if !clause.is_empty() {
                            parts.push(clause);
                        }
                    } else {
                        parts.extend(self.render_field(key, value)?);
                    }
                }
                Ok(parts.join(" AND "))
            }
            _ => Err(FilterError::InvalidWhereClause(
                "WHERE must be an object".to_string(),
            )),
        }
    }

    fn render_logical(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value.as_array().ok_or_else(|| {
                    FilterError::InvalidOperatorData(format!("{} requires an array", op))
                })?;
                let mut sub: Vec<String> = Vec::new();
                for v in arr {
                    let clause = self.render(v)?;
                    if !clause.is_empty() {
                        sub.push(format!("({})", clause));
                    }
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                // Wrap multi-branch groups so OR never leaks into an
                // enclosing AND context unparenthesized.
                match sub.len() {
                    0 => Ok(String::new()),
                    1 => Ok(sub.remove(0)),
                    _ => Ok(format!("({})", sub.join(joiner))),
                }
            }
            "$not" => {
                let clause = self.render(value)?;
                if clause.is_empty() {
                    Ok(String::new())
                } else {
                    Ok(format!("NOT ({})", clause))
                }
            }
            other => Err(FilterError::UnsupportedOperator(other.to_string())),
        }
    }

    fn render_field(&mut self, field: &str, value: &Value) -> Result<Vec<String>, FilterError> {
        validate_column(field)?;

        if let Value::Object(ops) = value {
            let mut parts = Vec::new();
            for (op_key, op_val) in ops {
                let operator = Self::map_operator(op_key)?;
                parts.push(self.render_condition(field, operator, op_val)?);
            }
            Ok(parts)
        } else {
            // Implicit equality: { field: value }
            Ok(vec![self.render_condition(field, FilterOp::Eq, value)?])
        }
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn render_condition(
        &mut self,
        column: &str,
        operator: FilterOp,
        data: &Value,
    ) -> Result<String, FilterError> {
        let quoted = format!("\"{}\"", column);
        Ok(match operator {
            FilterOp::Eq => {
                if data.is_null() {
                    format!("{} IS NULL", quoted)
                } else {
                    format!("{} = {}", quoted, self.param(data.clone()))
                }
            }
            FilterOp::Ne => {
                if data.is_null() {
                    format!("{} IS NOT NULL", quoted)
                } else {
                    format!("{} <> {}", quoted, self.param(data.clone()))
                }
            }
            FilterOp::Gt => format!("{} > {}", quoted, self.param(data.clone())),
            FilterOp::Gte => format!("{} >= {}", quoted, self.param(data.clone())),
            FilterOp::Lt => format!("{} < {}", quoted, self.param(data.clone())),
            FilterOp::Lte => format!("{} <= {}", quoted, self.param(data.clone())),
            FilterOp::Like => format!("{} LIKE {}", quoted, self.param(data.clone())),
            FilterOp::ILike => format!("{} ILIKE {}", quoted, self.param(data.clone())),
            FilterOp::In => {
                let values = data.as_array().ok_or_else(|| {
                    FilterError::InvalidOperatorData("$in requires an array".to_string())
                })?;
                if values.is_empty() {
                    // IN () is invalid SQL; an empty set matches nothing
                    "1=0".to_string()
                } else {
                    let params: Vec<String> =
                        values.iter().map(|v| self.param(v.clone())).collect();
                    format!("{} IN ({})", quoted, params.join(", "))
                }
            }
        })
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        format!("${}", self.starting_param_index + self.param_values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_renders_empty_clause() {
        let (clause, params) = FilterWhere::generate(&json!({}), 0).unwrap();
        assert_eq!(clause, "");
        assert!(params.is_empty());
    }

    #[test]
    fn implicit_equality() {
        let (clause, params) = FilterWhere::generate(&json!({"status": "ACTIVE"}), 0).unwrap();
        assert_eq!(clause, "\"status\" = $1");
        assert_eq!(params, vec![json!("ACTIVE")]);
    }

    #[test]
    fn or_of_ilike_branches() {
        let where_data = json!({
            "$or": [
                { "policy_number": { "$ilike": "%abc%" } },
                { "description": { "$ilike": "%abc%" } }
            ]
        });
        let (clause, params) = FilterWhere::generate(&where_data, 0).unwrap();
        assert_eq!(
            clause,
            "((\"policy_number\" ILIKE $1) OR (\"description\" ILIKE $2))"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn fields_and_logical_combine_with_and() {
        let where_data = json!({
            "status": "SUBMITTED",
            "$or": [ { "a": 1 }, { "b": 2 } ]
        });
        let (clause, params) = FilterWhere::generate(&where_data, 0).unwrap();
        // serde_json::Map iterates keys in sorted order, so $or renders first
        assert_eq!(
            clause,
            "((\"a\" = $1) OR (\"b\" = $2)) AND \"status\" = $3"
        );
        assert_eq!(params, vec![json!(1), json!(2), json!("SUBMITTED")]);
    }

    #[test]
    fn null_equality_renders_is_null() {
        let (clause, params) = FilterWhere::generate(&json!({"paid_at": null}), 0).unwrap();
        assert_eq!(clause, "\"paid_at\" IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn empty_in_matches_nothing() {
        let (clause, _) = FilterWhere::generate(&json!({"id": {"$in": []}}), 0).unwrap();
        assert_eq!(clause, "1=0");
    }

    #[test]
    fn quoted_column_injection_is_rejected() {
        let err = FilterWhere::generate(&json!({"id\" OR 1=1 --": 5}), 0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidColumn(_)));
    }

    #[test]
    fn starting_index_offsets_placeholders() {
        let (clause, _) = FilterWhere::generate(&json!({"status": "ACTIVE"}), 2).unwrap();
        assert_eq!(clause, "\"status\" = $3");
    }
}
