use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Comparison operator applied to a single record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Equality.
    Eq,
    /// Greater than or equal, the inclusive lower bound of an interval.
    Gte,
    /// Strictly less than, the exclusive upper bound of an interval.
    Lt,
}

/// Backend-neutral predicate tree over record fields.
///
/// Intervals are always half-open: a range over `[lower, upper)` is the
/// conjunction of a `Gte` and an `Lt` comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Compares one field against a scalar value.
    Compare {
        /// Record field path.
        field: String,
        /// Comparison operator.
        op: CompareOp,
        /// Comparison operand.
        value: Value,
    },
    /// Case-insensitive substring match on a text field.
    Contains {
        /// Record field path.
        field: String,
        /// Needle to search for.
        text: String,
    },
    /// Conjunction of all child predicates.
    All(Vec<Predicate>),
    /// Disjunction of the child predicates.
    Any(Vec<Predicate>),
}

/// Builds backend-specific predicates from normalized filter values.
///
/// The translator stays backend-neutral by going through this trait;
/// each store supplies a builder producing its native clause shape.
pub trait PredicateBuilder {
    /// Backend-native predicate type.
    type Predicate: Clone + std::fmt::Debug + Send + Sync;

    /// Exact equality on one field.
    fn exact(&self, field: &str, value: Value) -> Self::Predicate;

    /// Half-open interval `[lower, upper)`; at least one bound is set.
    fn range(&self, field: &str, lower: Option<Value>, upper: Option<Value>) -> Self::Predicate;

    /// Free-text match on one field.
    fn text_match(&self, field: &str, text: &str) -> Self::Predicate;

    /// Conjunction of clauses.
    fn all_of(&self, clauses: Vec<Self::Predicate>) -> Self::Predicate;

    /// Disjunction of clauses.
    fn any_of(&self, clauses: Vec<Self::Predicate>) -> Self::Predicate;
}

/// Builder producing the backend-neutral [`Predicate`] tree consumed by
/// relational and in-memory record stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationalPredicateBuilder;

impl PredicateBuilder for RelationalPredicateBuilder {
    type Predicate = Predicate;

    fn exact(&self, field: &str, value: Value) -> Predicate {
        Predicate::Compare {
            field: field.to_owned(),
            op: CompareOp::Eq,
            value,
        }
    }

    fn range(&self, field: &str, lower: Option<Value>, upper: Option<Value>) -> Predicate {
        let mut bounds = Vec::new();
        if let Some(lower) = lower {
            bounds.push(Predicate::Compare {
                field: field.to_owned(),
                op: CompareOp::Gte,
                value: lower,
            });
        }
        if let Some(upper) = upper {
            bounds.push(Predicate::Compare {
                field: field.to_owned(),
                op: CompareOp::Lt,
                value: upper,
            });
        }

        if bounds.len() == 1 {
            bounds.remove(0)
        } else {
            Predicate::All(bounds)
        }
    }

    fn text_match(&self, field: &str, text: &str) -> Predicate {
        Predicate::Contains {
            field: field.to_owned(),
            text: text.to_owned(),
        }
    }

    fn all_of(&self, clauses: Vec<Predicate>) -> Predicate {
        Predicate::All(clauses)
    }

    fn any_of(&self, clauses: Vec<Predicate>) -> Predicate {
        Predicate::Any(clauses)
    }
}

/// Builder producing search-index query clauses as JSON documents in
/// the `term` / `range` / `match` / `bool` dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchQueryBuilder;

impl PredicateBuilder for SearchQueryBuilder {
    type Predicate = Value;

    fn exact(&self, field: &str, value: Value) -> Value {
        json!({ "term": { field: value } })
    }

    fn range(&self, field: &str, lower: Option<Value>, upper: Option<Value>) -> Value {
        let mut bounds = Map::new();
        if let Some(lower) = lower {
            bounds.insert("gte".to_owned(), lower);
        }
        if let Some(upper) = upper {
            bounds.insert("lt".to_owned(), upper);
        }

        json!({ "range": { field: bounds } })
    }

    fn text_match(&self, field: &str, text: &str) -> Value {
        json!({ "match": { field: text } })
    }

    fn all_of(&self, clauses: Vec<Value>) -> Value {
        json!({ "bool": { "must": clauses } })
    }

    fn any_of(&self, clauses: Vec<Value>) -> Value {
        json!({ "bool": { "should": clauses, "minimum_should_match": 1 } })
    }
}
