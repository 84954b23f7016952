use axum::Json;
use axum::extract::{Path, State};

use crate::dto::MetricDto;
use crate::error::ApiResult;
use crate::state::AppState;

/// Returns the normalized overview cards for one resource.
pub async fn overview_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> ApiResult<Json<Vec<MetricDto>>> {
    let resource = state.registry.get(&resource)?;
    let metrics = state
        .aggregator
        .compute(&resource, state.store.as_ref())
        .await?;
    Ok(Json(metrics.iter().map(MetricDto::from).collect()))
}
