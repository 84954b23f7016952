use axum::Json;
use axum::extract::{Path, State};
use restmeta_domain::{FormName, FormSchema};

use crate::error::ApiResult;
use crate::state::AppState;

/// Returns the blank form schema for one form of a resource.
pub async fn form_schema_handler(
    State(state): State<AppState>,
    Path((resource, form)): Path<(String, String)>,
) -> ApiResult<Json<FormSchema>> {
    let resource = state.registry.get(&resource)?;
    Ok(Json(
        state.assembler.build(&resource, FormName::parse(&form)),
    ))
}

/// Returns the form schema pre-filled from one stored record.
pub async fn record_form_schema_handler(
    State(state): State<AppState>,
    Path((resource, id, form)): Path<(String, String, String)>,
) -> ApiResult<Json<FormSchema>> {
    let resource = state.registry.get(&resource)?;
    let schema = state
        .assembler
        .build_for_instance(
            &resource,
            FormName::parse(&form),
            state.store.as_ref(),
            &id,
        )
        .await?;
    Ok(Json(schema))
}
