use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use restmeta_application::TranslationMode;
use restmeta_core::AppError;
use restmeta_infrastructure::InMemoryRecordStore;
use serde_json::json;

use crate::dev_seed;
use crate::dto::LookupRequest;
use crate::error::ApiError;
use crate::resources;
use crate::state::AppState;

use super::filters::filtering_data_handler;
use super::forms::{form_schema_handler, record_form_schema_handler};
use super::lookups::{AutocompleteQuery, autocomplete_handler, object_lookup_handler};
use super::overview::overview_handler;
use super::records::list_records_handler;

async fn state_with_mode(mode: TranslationMode) -> AppState {
    let registry = Arc::new(resources::build_registry().unwrap_or_else(|_| unreachable!()));
    let store = InMemoryRecordStore::new();
    dev_seed::run(&store).await.unwrap_or_else(|_| unreachable!());
    AppState::new(registry, Arc::new(store), mode)
}

async fn seeded_state() -> AppState {
    state_with_mode(TranslationMode::Lenient).await
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

#[tokio::test]
async fn filtering_data_expands_choices_and_derived_filters() {
    let state = seeded_state().await;
    let Json(data) = filtering_data_handler(State(state), Path("invoices".to_owned()))
        .await
        .unwrap_or_else(|_| unreachable!());

    let names: Vec<_> = data.filters.iter().map(|filter| filter.name.as_str()).collect();
    assert!(names.contains(&"status"));
    assert!(names.contains(&"number"));
    assert!(names.contains(&"created_at"));

    let status = data
        .filters
        .iter()
        .find(|filter| filter.name == "status")
        .unwrap_or_else(|| unreachable!());
    assert_eq!(status.filter_type, "select_multiple");
    assert_eq!(status.data["choices"][0]["label"], json!("All"));

    assert!(data.ordering.contains(&"-amount".to_owned()));
}

#[tokio::test]
async fn unknown_resource_is_not_found() {
    let state = seeded_state().await;
    let result = filtering_data_handler(State(state), Path("payments".to_owned())).await;
    assert!(matches!(result, Err(ApiError(AppError::NotFound(_)))));
}

#[tokio::test]
async fn boolean_filter_narrows_the_listing() {
    let state = seeded_state().await;
    let Json(page) = list_records_handler(
        State(state),
        Path("invoices".to_owned()),
        Query(params(&[("paid", "true")])),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(page.count, 1);
    assert_eq!(page.results[0]["number"], json!("INV-2026-001"));
}

#[tokio::test]
async fn amount_range_filters_in_major_units() {
    let state = seeded_state().await;
    let Json(page) = list_records_handler(
        State(state),
        Path("invoices".to_owned()),
        Query(params(&[("amount_min", "100"), ("amount_max", "500")])),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(page.count, 1);
    assert_eq!(page.results[0]["number"], json!("INV-2026-002"));
}

#[tokio::test]
async fn malformed_filter_values_are_ignored_in_lenient_mode() {
    let state = seeded_state().await;
    let Json(page) = list_records_handler(
        State(state),
        Path("invoices".to_owned()),
        Query(params(&[("due_date_from", "whenever")])),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(page.count, 3);
}

#[tokio::test]
async fn malformed_limit_falls_back_in_lenient_mode() {
    let state = seeded_state().await;
    let Json(page) = list_records_handler(
        State(state),
        Path("invoices".to_owned()),
        Query(params(&[("limit", "lots")])),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(page.count, 3);
}

#[tokio::test]
async fn malformed_limit_is_rejected_in_strict_mode() {
    let state = state_with_mode(TranslationMode::Strict).await;
    let result = list_records_handler(
        State(state),
        Path("invoices".to_owned()),
        Query(params(&[("limit", "lots")])),
    )
    .await;
    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn unknown_ordering_field_is_rejected() {
    let state = seeded_state().await;
    let result = list_records_handler(
        State(state),
        Path("invoices".to_owned()),
        Query(params(&[("ordering", "notes")])),
    )
    .await;
    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn descending_ordering_is_applied() {
    let state = seeded_state().await;
    let Json(page) = list_records_handler(
        State(state),
        Path("invoices".to_owned()),
        Query(params(&[("ordering", "-amount")])),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(page.results[0]["number"], json!("INV-2026-001"));
}

#[tokio::test]
async fn list_form_uses_the_list_serializer() {
    let state = seeded_state().await;
    let Json(schema) = form_schema_handler(
        State(state),
        Path(("invoices".to_owned(), "list".to_owned())),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(schema.fields().len(), 3);
    assert!(schema.fields().iter().all(|field| field.current_value().is_none()));
}

#[tokio::test]
async fn custom_form_falls_back_to_the_default_serializer() {
    let state = seeded_state().await;
    let Json(schema) = form_schema_handler(
        State(state),
        Path(("invoices".to_owned(), "side_panel".to_owned())),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(schema.fields().len(), 8);
}

#[tokio::test]
async fn record_form_carries_current_values() {
    let state = seeded_state().await;
    let Json(found) = object_lookup_handler(
        State(state.clone()),
        Path("invoices".to_owned()),
        Json(LookupRequest {
            lookup_data: "INV-2026-001".to_owned(),
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    let id = found
        .value()
        .as_str()
        .unwrap_or_else(|| unreachable!())
        .to_owned();
    let Json(schema) = record_form_schema_handler(
        State(state),
        Path(("invoices".to_owned(), id, "update".to_owned())),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    let number = schema
        .fields()
        .iter()
        .find(|field| field.name().as_str() == "number")
        .unwrap_or_else(|| unreachable!());
    assert_eq!(number.current_value(), Some(&json!("INV-2026-001")));
}

#[tokio::test]
async fn autocomplete_searches_client_names() {
    let state = seeded_state().await;
    let Json(results) = autocomplete_handler(
        State(state),
        Path("clients".to_owned()),
        Query(AutocompleteQuery {
            query: "zenith".to_owned(),
        }),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label(), "Zenith Labs");
}

#[tokio::test]
async fn lookup_without_match_is_not_found() {
    let state = seeded_state().await;
    let result = object_lookup_handler(
        State(state),
        Path("invoices".to_owned()),
        Json(LookupRequest {
            lookup_data: "INV-9999".to_owned(),
        }),
    )
    .await;
    assert!(matches!(result, Err(ApiError(AppError::NotFound(_)))));
}

#[tokio::test]
async fn overview_reports_normalized_metrics() {
    let state = seeded_state().await;
    let Json(metrics) = overview_handler(State(state), Path("invoices".to_owned()))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(metrics.len(), 3);
    let volume = metrics
        .iter()
        .find(|metric| metric.title == "Total volume")
        .unwrap_or_else(|| unreachable!());
    assert_eq!(volume.value, json!("1829.00"));
    assert_eq!(volume.metric_type, "amount");
}
