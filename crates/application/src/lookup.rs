use restmeta_core::{AppError, AppResult};
use restmeta_domain::LookupResult;
use serde_json::{Value, json};

use crate::ports::{PageRequest, RecordStore};
use crate::predicate::{PredicateBuilder, RelationalPredicateBuilder};
use crate::registry::ResourceDefinition;

/// Page size of autocomplete listings.
pub const AUTOCOMPLETE_PAGE_SIZE: usize = 10;

/// Resolves autocomplete suggestions and precise record lookups.
#[derive(Debug, Clone, Copy)]
pub struct LookupResolver {
    page_size: usize,
}

impl Default for LookupResolver {
    fn default() -> Self {
        Self {
            page_size: AUTOCOMPLETE_PAGE_SIZE,
        }
    }
}

impl LookupResolver {
    /// Creates a resolver with a custom autocomplete page size.
    pub fn new(page_size: usize) -> AppResult<Self> {
        if page_size == 0 {
            return Err(AppError::Configuration(
                "autocomplete page size must be at least one".to_owned(),
            ));
        }

        Ok(Self { page_size })
    }

    /// Returns up to one page of `(value, label)` suggestions matching
    /// the query text on any configured autocomplete field.
    ///
    /// An empty query browses: it returns the first page unfiltered so
    /// clients can render initial suggestions.
    pub async fn autocomplete(
        &self,
        resource: &ResourceDefinition,
        store: &dyn RecordStore,
        query: &str,
    ) -> AppResult<Vec<LookupResult>> {
        let fields = resource.autocomplete_fields();
        if fields.is_empty() {
            return Err(AppError::Configuration(format!(
                "resource '{}' declares no autocomplete fields",
                resource.name().as_str()
            )));
        }

        let builder = RelationalPredicateBuilder;
        let query = query.trim();
        let predicate = if query.is_empty() {
            None
        } else {
            Some(builder.any_of(
                fields
                    .iter()
                    .map(|field| builder.text_match(field, query))
                    .collect(),
            ))
        };

        let records = store
            .list(
                resource.name().as_str(),
                predicate.as_ref(),
                None,
                PageRequest::first(self.page_size)?,
            )
            .await?;

        let mut results = Vec::with_capacity(records.len());
        for record in &records {
            match suggestion(record, fields) {
                Some(result) => results.push(result?),
                None => {
                    tracing::warn!(
                        resource = resource.name().as_str(),
                        "skipped autocomplete record without an id"
                    );
                }
            }
        }

        Ok(results)
    }

    /// Resolves exactly one record whose lookup fields match the given
    /// value.
    ///
    /// No match is a not-found error; more than one match is an
    /// ambiguity error, never a silent pick.
    pub async fn lookup(
        &self,
        resource: &ResourceDefinition,
        store: &dyn RecordStore,
        lookup_data: &str,
    ) -> AppResult<LookupResult> {
        let fields = resource.lookup_fields();
        if fields.is_empty() {
            return Err(AppError::Configuration(format!(
                "resource '{}' declares no lookup fields",
                resource.name().as_str()
            )));
        }

        let lookup_data = lookup_data.trim();
        if lookup_data.is_empty() {
            return Err(AppError::Validation(
                "lookup data must not be empty".to_owned(),
            ));
        }

        let builder = RelationalPredicateBuilder;
        let mut candidates = vec![Value::String(lookup_data.to_owned())];
        if let Ok(int) = lookup_data.parse::<i64>() {
            candidates.push(json!(int));
        }

        let alternatives = fields
            .iter()
            .flat_map(|field| {
                candidates
                    .iter()
                    .map(move |value| builder.exact(field, value.clone()))
            })
            .collect();
        let predicate = builder.any_of(alternatives);

        // Two is enough to tell "one" from "more than one".
        let mut matches = store
            .list(
                resource.name().as_str(),
                Some(&predicate),
                None,
                PageRequest::first(2)?,
            )
            .await?;

        match matches.len() {
            0 => Err(AppError::NotFound(format!(
                "no '{}' record matches '{lookup_data}'",
                resource.name().as_str()
            ))),
            1 => {
                let record = matches.remove(0);
                let label_fields = if resource.autocomplete_fields().is_empty() {
                    fields
                } else {
                    resource.autocomplete_fields()
                };
                suggestion(&record, label_fields).ok_or_else(|| {
                    AppError::Internal(format!(
                        "matched '{}' record has no id",
                        resource.name().as_str()
                    ))
                })?
            }
            _ => Err(AppError::AmbiguousLookup(format!(
                "multiple '{}' records match '{lookup_data}'",
                resource.name().as_str()
            ))),
        }
    }
}

/// Shapes one record into a `(value, label)` pair; `None` when the
/// record carries no usable id.
fn suggestion(record: &Value, label_fields: &[String]) -> Option<AppResult<LookupResult>> {
    let id = record.get("id").filter(|id| !id.is_null())?.clone();

    let label = label_fields
        .iter()
        .find_map(|field| record.get(field).map(display_text).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| display_text(&id));

    Some(LookupResult::new(id, label))
}

fn display_text(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_owned(),
        None if value.is_null() => String::new(),
        None => value.to_string(),
    }
}
