//! Metadata filter predicate expression tree.
//!
//! Vector indices accept an optional boolean predicate restricting the
//! candidate set to chunks whose metadata satisfies it, evaluated before
//! ranking. The predicate is a typed expression tree rather than the untyped
//! nested mapping used by document-database filter syntaxes, with lossless
//! conversion to and from the JSON mini-language consumed by those engines:
//!
//! - leaf: `{"field": {"$eq": literal}}`
//! - nodes: `{"$and": [predicates]}` / `{"$or": [predicates]}`
//!
//! # Same-field `$and` footgun
//!
//! Composing `And` over predicates on the SAME field always yields an empty
//! result set: a field cannot equal two different literals simultaneously.
//! Use `Or` for "match any of these values" semantics. The evaluator executes
//! such predicates as written and silently returns no matches; it does not
//! reject them statically.

use crate::chunk::Metadata;
use crate::error::RetrievalError;
use serde_json::Value;

/// A boolean predicate over a chunk's metadata mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Field equals literal.
    Eq {
        /// Metadata key to test.
        field: String,
        /// Literal the field must equal.
        value: Value,
    },
    /// All child predicates must match.
    And(Vec<FilterExpr>),
    /// At least one child predicate must match.
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Equality leaf: `field == value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Conjunction of predicates.
    pub fn and(children: Vec<FilterExpr>) -> Self {
        FilterExpr::And(children)
    }

    /// Disjunction of predicates.
    pub fn or(children: Vec<FilterExpr>) -> Self {
        FilterExpr::Or(children)
    }

    /// Evaluates this predicate against a chunk's metadata.
    ///
    /// A missing field never equals any literal. Empty `And` is vacuously
    /// true; empty `Or` is false.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            FilterExpr::Eq { field, value } => metadata.get(field) == Some(value),
            FilterExpr::And(children) => children.iter().all(|c| c.matches(metadata)),
            FilterExpr::Or(children) => children.iter().any(|c| c.matches(metadata)),
        }
    }

    /// Serializes to the JSON mini-language form.
    pub fn to_value(&self) -> Value {
        match self {
            FilterExpr::Eq { field, value } => {
                serde_json::json!({ field: { "$eq": value } })
            }
            FilterExpr::And(children) => {
                serde_json::json!({ "$and": children.iter().map(Self::to_value).collect::<Vec<_>>() })
            }
            FilterExpr::Or(children) => {
                serde_json::json!({ "$or": children.iter().map(Self::to_value).collect::<Vec<_>>() })
            }
        }
    }

    /// Parses the JSON mini-language form.
    ///
    /// Returns [`RetrievalError::Configuration`] for anything outside the
    /// supported `$eq` / `$and` / `$or` shape.
    pub fn from_value(value: &Value) -> Result<Self, RetrievalError> {
        let object = value.as_object().ok_or_else(|| {
            RetrievalError::Configuration(format!("filter must be a JSON object, got: {value}"))
        })?;
        if object.len() != 1 {
            return Err(RetrievalError::Configuration(format!(
                "filter object must have exactly one key, got {}",
                object.len()
            )));
        }
        // Single-entry object: either an operator node or an equality leaf.
        let (key, inner) = object.iter().next().ok_or_else(|| {
            RetrievalError::Configuration("empty filter object".to_string())
        })?;
        match key.as_str() {
            "$and" | "$or" => {
                let items = inner.as_array().ok_or_else(|| {
                    RetrievalError::Configuration(format!("{key} expects an array of predicates"))
                })?;
                let children = items
                    .iter()
                    .map(Self::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                if key == "$and" {
                    Ok(FilterExpr::And(children))
                } else {
                    Ok(FilterExpr::Or(children))
                }
            }
            field => {
                let condition = inner.as_object().ok_or_else(|| {
                    RetrievalError::Configuration(format!(
                        "condition for field {field:?} must be an object like {{\"$eq\": literal}}"
                    ))
                })?;
                let literal = condition.get("$eq").ok_or_else(|| {
                    RetrievalError::Configuration(format!(
                        "unsupported condition for field {field:?}: only $eq is supported"
                    ))
                })?;
                Ok(FilterExpr::Eq {
                    field: field.to_string(),
                    value: literal.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(pairs: &[(&str, &str)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_eq_matches_present_field() {
        let filter = FilterExpr::eq("source_file", "a.pdf");
        assert!(filter.matches(&metadata(&[("source_file", "a.pdf")])));
        assert!(!filter.matches(&metadata(&[("source_file", "b.pdf")])));
        assert!(!filter.matches(&Metadata::new()));
    }

    #[test]
    fn test_or_matches_any_value() {
        let filter = FilterExpr::or(vec![
            FilterExpr::eq("source_file", "a.pdf"),
            FilterExpr::eq("source_file", "b.pdf"),
        ]);
        assert!(filter.matches(&metadata(&[("source_file", "a.pdf")])));
        assert!(filter.matches(&metadata(&[("source_file", "b.pdf")])));
        assert!(!filter.matches(&metadata(&[("source_file", "c.pdf")])));
    }

    #[test]
    fn test_same_field_and_never_matches() {
        // A field cannot equal two different literals simultaneously.
        let filter = FilterExpr::and(vec![
            FilterExpr::eq("source_file", "a.pdf"),
            FilterExpr::eq("source_file", "b.pdf"),
        ]);
        assert!(!filter.matches(&metadata(&[("source_file", "a.pdf")])));
        assert!(!filter.matches(&metadata(&[("source_file", "b.pdf")])));
    }

    #[test]
    fn test_and_across_fields() {
        let filter = FilterExpr::and(vec![
            FilterExpr::eq("source_file", "a.pdf"),
            FilterExpr::eq("mime_type", "text/markdown"),
        ]);
        assert!(filter.matches(&metadata(&[
            ("source_file", "a.pdf"),
            ("mime_type", "text/markdown")
        ])));
        assert!(!filter.matches(&metadata(&[("source_file", "a.pdf")])));
    }

    #[test]
    fn test_json_round_trip() {
        let filter = FilterExpr::or(vec![
            FilterExpr::eq("source_file", "a.pdf"),
            FilterExpr::and(vec![
                FilterExpr::eq("doc_title", "EPD"),
                FilterExpr::eq("mime_type", "text/plain"),
            ]),
        ]);
        let parsed = FilterExpr::from_value(&filter.to_value()).unwrap();
        assert_eq!(parsed, filter);
    }

    #[test]
    fn test_parse_leaf_json_form() {
        let value = json!({"source_file": {"$eq": "EPD_tesa.pdf"}});
        let parsed = FilterExpr::from_value(&value).unwrap();
        assert_eq!(parsed, FilterExpr::eq("source_file", "EPD_tesa.pdf"));
    }

    #[test]
    fn test_parse_rejects_unknown_operator() {
        let value = json!({"source_file": {"$gt": 3}});
        assert!(matches!(
            FilterExpr::from_value(&value),
            Err(RetrievalError::Configuration(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(FilterExpr::from_value(&json!("source_file")).is_err());
        assert!(FilterExpr::from_value(&json!({"a": {"$eq": 1}, "b": {"$eq": 2}})).is_err());
    }
}
