use axum::Json;
use axum::extract::{Path, Query, State};
use restmeta_domain::LookupResult;
use serde::Deserialize;

use crate::dto::LookupRequest;
use crate::error::ApiResult;
use crate::state::AppState;

/// Autocomplete query string.
#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    /// Search text; empty browses the first page.
    #[serde(default)]
    pub query: String,
}

/// Returns one page of `(value, label)` suggestions.
pub async fn autocomplete_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<AutocompleteQuery>,
) -> ApiResult<Json<Vec<LookupResult>>> {
    let resource = state.registry.get(&resource)?;
    let results = state
        .resolver
        .autocomplete(&resource, state.store.as_ref(), &params.query)
        .await?;
    Ok(Json(results))
}

/// Resolves exactly one record from a submitted lookup value.
pub async fn object_lookup_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Json(request): Json<LookupRequest>,
) -> ApiResult<Json<LookupResult>> {
    let resource = state.registry.get(&resource)?;
    let result = state
        .resolver
        .lookup(&resource, state.store.as_ref(), &request.lookup_data)
        .await?;
    Ok(Json(result))
}
