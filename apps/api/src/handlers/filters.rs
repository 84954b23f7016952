use axum::Json;
use axum::extract::{Path, State};

use crate::dto::{FilteringDataDto, filtering_data_dto};
use crate::error::ApiResult;
use crate::state::AppState;

/// Returns the filtering metadata for one resource: the available
/// filters with their expanded choices, and the accepted ordering
/// values.
pub async fn filtering_data_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> ApiResult<Json<FilteringDataDto>> {
    let resource = state.registry.get(&resource)?;
    Ok(Json(
        filtering_data_dto(&resource, state.store.as_ref()).await?,
    ))
}
