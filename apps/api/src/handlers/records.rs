use axum::Json;
use axum::extract::{Path, Query, State};
use restmeta_application::{PageRequest, QueryParams, SortSpec, TranslationMode};
use restmeta_core::AppError;

use crate::dto::RecordPageDto;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_PAGE_LIMIT: usize = 50;
const MAX_PAGE_LIMIT: usize = 200;

/// Lists records of one resource, filtered by the resource's filter
/// list, optionally ordered, and paginated with `limit`/`offset`.
pub async fn list_records_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<RecordPageDto>> {
    let resource = state.registry.get(&resource)?;

    let clauses = state.translator.translate(resource.filter_specs(), &params)?;
    let predicate = state.translator.combined(clauses);

    let order = match params.get("ordering").map(String::as_str) {
        None | Some("") => None,
        Some(raw) => {
            let order = SortSpec::parse(raw);
            if !resource
                .ordering_fields()
                .iter()
                .any(|field| field == &order.field)
            {
                return Err(AppError::Validation(format!(
                    "'{}' is not an orderable field of resource '{}'",
                    order.field,
                    resource.name().as_str()
                ))
                .into());
            }
            Some(order)
        }
    };

    let mode = state.translator.mode();
    let limit = page_param(&params, "limit", mode)?
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);
    let offset = page_param(&params, "offset", mode)?.unwrap_or(0);

    let records = state
        .store
        .list(
            resource.name().as_str(),
            predicate.as_ref(),
            order.as_ref(),
            PageRequest::new(limit, offset)?,
        )
        .await?;

    Ok(Json(RecordPageDto {
        count: records.len(),
        results: records,
    }))
}

/// Parses a pagination parameter under the same policy as filter
/// values: lenient falls back to the default, strict rejects.
fn page_param(
    params: &QueryParams,
    name: &str,
    mode: TranslationMode,
) -> Result<Option<usize>, ApiError> {
    let Some(raw) = params.get(name).filter(|raw| !raw.trim().is_empty()) else {
        return Ok(None);
    };

    match raw.trim().parse::<usize>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => match mode {
            TranslationMode::Lenient => {
                tracing::debug!(parameter = name, value = raw.as_str(), "dropped pagination value");
                Ok(None)
            }
            TranslationMode::Strict => Err(AppError::Validation(format!(
                "parameter '{name}' rejected value '{raw}': expected a non-negative integer"
            ))
            .into()),
        },
    }
}
