use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use restmeta_application::{CompareOp, PageRequest, Predicate, RecordStore, SortSpec};
use restmeta_core::{AppError, AppResult};
use restmeta_domain::ChoiceOption;
use serde_json::Value;
use tokio::sync::RwLock;

/// Record store backed by process memory, for tests and local runs.
///
/// Records keep insertion order per resource.
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, Vec<Value>>>,
    enumerations: RwLock<HashMap<String, Vec<ChoiceOption>>>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            enumerations: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts one record; it must be an object with a non-null `id`.
    pub async fn insert(&self, resource: &str, record: Value) -> AppResult<()> {
        if !record.is_object() {
            return Err(AppError::Validation(
                "record must be a JSON object".to_owned(),
            ));
        }
        if record.get("id").map(Value::is_null).unwrap_or(true) {
            return Err(AppError::Validation(
                "record must carry a non-null 'id'".to_owned(),
            ));
        }

        self.records
            .write()
            .await
            .entry(resource.to_owned())
            .or_default()
            .push(record);
        Ok(())
    }

    /// Registers a named choice enumeration.
    pub async fn register_enumeration(&self, name: &str, choices: Vec<ChoiceOption>) {
        self.enumerations
            .write()
            .await
            .insert(name.to_owned(), choices);
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list(
        &self,
        resource: &str,
        predicate: Option<&Predicate>,
        order: Option<&SortSpec>,
        page: PageRequest,
    ) -> AppResult<Vec<Value>> {
        let records = self.records.read().await;
        let mut listed: Vec<Value> = records
            .get(resource)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|record| predicate.map(|p| evaluate(p, record)).unwrap_or(true))
            .cloned()
            .collect();

        if let Some(order) = order {
            listed.sort_by(|left, right| {
                compare_for_sort(
                    resolve_path(left, &order.field),
                    resolve_path(right, &order.field),
                    order.descending,
                )
            });
        }

        Ok(listed
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .collect())
    }

    async fn find_by_id(&self, resource: &str, id: &str) -> AppResult<Option<Value>> {
        let records = self.records.read().await;
        Ok(records
            .get(resource)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .find(|record| record.get("id").map(|value| id_matches(value, id)).unwrap_or(false))
            .cloned())
    }

    async fn resolve_enumeration(&self, name: &str) -> AppResult<Option<Vec<ChoiceOption>>> {
        Ok(self.enumerations.read().await.get(name).cloned())
    }
}

fn id_matches(value: &Value, id: &str) -> bool {
    match value {
        Value::String(text) => text == id,
        other => other.to_string() == id,
    }
}

/// Looks a dotted path up inside a record.
fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |current, segment| current.get(segment))
}

fn evaluate(predicate: &Predicate, record: &Value) -> bool {
    match predicate {
        Predicate::Compare { field, op, value } => resolve_path(record, field)
            .map(|stored| compare(stored, *op, value))
            .unwrap_or(false),
        Predicate::Contains { field, text } => resolve_path(record, field)
            .map(|stored| contains(stored, text))
            .unwrap_or(false),
        Predicate::All(children) => children.iter().all(|child| evaluate(child, record)),
        Predicate::Any(children) => children.iter().any(|child| evaluate(child, record)),
    }
}

fn compare(stored: &Value, op: CompareOp, operand: &Value) -> bool {
    match op {
        CompareOp::Eq => scalar_eq(stored, operand),
        CompareOp::Gte | CompareOp::Lt => {
            let ordering = match (stored.as_f64(), operand.as_f64()) {
                (Some(left), Some(right)) => left.partial_cmp(&right),
                _ => match (stored.as_str(), operand.as_str()) {
                    (Some(left), Some(right)) => Some(left.cmp(right)),
                    _ => None,
                },
            };

            match (ordering, op) {
                (Some(ordering), CompareOp::Gte) => ordering.is_ge(),
                (Some(ordering), CompareOp::Lt) => ordering.is_lt(),
                _ => false,
            }
        }
    }
}

/// Equality with numeric widening, so a stored `100` matches a coerced
/// `100.0` operand.
fn scalar_eq(stored: &Value, operand: &Value) -> bool {
    if stored == operand {
        return true;
    }
    match (stored.as_f64(), operand.as_f64()) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Missing values sort last regardless of direction.
fn compare_for_sort(left: Option<&Value>, right: Option<&Value>, descending: bool) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => {
            let ordering = match (left.as_f64(), right.as_f64()) {
                (Some(left), Some(right)) => {
                    left.partial_cmp(&right).unwrap_or(Ordering::Equal)
                }
                _ => value_text(left).cmp(&value_text(right)),
            };
            if descending { ordering.reverse() } else { ordering }
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn contains(stored: &Value, needle: &str) -> bool {
    let haystack = match stored {
        Value::String(text) => text.clone(),
        Value::Null => return false,
        other => other.to_string(),
    };
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
