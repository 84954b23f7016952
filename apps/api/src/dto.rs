use restmeta_application::{RecordStore, ResourceDefinition, resolve_select_choices};
use restmeta_core::AppResult;
use restmeta_domain::{FilterKind, FilterSpec, OverviewMetric};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One filter as the client renders it: a stable `type` tag plus a
/// kind-specific `data` document.
#[derive(Debug, Serialize)]
pub struct FilterDto {
    /// Human-readable title.
    pub title: String,
    /// Query parameter name.
    pub name: String,
    /// Wire name of the filter kind.
    #[serde(rename = "type")]
    pub filter_type: String,
    /// Kind-specific options.
    pub data: Value,
}

/// Filtering metadata for one resource.
#[derive(Debug, Serialize)]
pub struct FilteringDataDto {
    /// Available filters in derivation order.
    pub filters: Vec<FilterDto>,
    /// Accepted `ordering` values, each field ascending and descending.
    pub ordering: Vec<String>,
}

/// One overview card.
#[derive(Debug, Serialize)]
pub struct MetricDto {
    /// Card title.
    pub title: String,
    /// Normalized value.
    pub value: Value,
    /// Wire name of the metric type.
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Presentation style tag.
    pub style: String,
}

/// Precise lookup request body.
#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    /// Value to match against the resource's lookup fields.
    pub lookup_data: String,
}

/// One page of filtered records.
#[derive(Debug, Serialize)]
pub struct RecordPageDto {
    /// Number of records in this page.
    pub count: usize,
    /// The records themselves.
    pub results: Vec<Value>,
}

/// Shapes one filter spec, expanding select choice sources against the
/// store.
pub async fn filter_dto(spec: &FilterSpec, store: &dyn RecordStore) -> AppResult<FilterDto> {
    let data = match spec.kind() {
        FilterKind::Select { source, multiple } => {
            let choices = resolve_select_choices(spec.name().as_str(), source, store).await?;
            json!({ "choices": choices, "multiple": multiple })
        }
        FilterKind::Autocomplete { lookup_url } => {
            json!({ "lookup_url": lookup_url.as_str() })
        }
        FilterKind::Boolean | FilterKind::Date | FilterKind::DateRange => json!({}),
        FilterKind::AmountRange { subunit_scale } => {
            json!({ "subunit_scale": subunit_scale })
        }
        FilterKind::NumericRange { min, max, step } => {
            json!({ "min": min, "max": max, "step": step })
        }
        FilterKind::FormValue { field_type } => {
            json!({ "field_type": field_type.as_str() })
        }
    };

    Ok(FilterDto {
        title: spec.title().as_str().to_owned(),
        name: spec.name().as_str().to_owned(),
        filter_type: spec.kind().type_name().to_owned(),
        data,
    })
}

/// Shapes the full filtering metadata for one resource.
pub async fn filtering_data_dto(
    resource: &ResourceDefinition,
    store: &dyn RecordStore,
) -> AppResult<FilteringDataDto> {
    let mut filters = Vec::with_capacity(resource.filter_specs().len());
    for spec in resource.filter_specs() {
        filters.push(filter_dto(spec, store).await?);
    }

    let mut ordering = Vec::with_capacity(resource.ordering_fields().len() * 2);
    for field in resource.ordering_fields() {
        ordering.push(field.clone());
        ordering.push(format!("-{field}"));
    }

    Ok(FilteringDataDto { filters, ordering })
}

impl From<&OverviewMetric> for MetricDto {
    fn from(metric: &OverviewMetric) -> Self {
        Self {
            title: metric.title().as_str().to_owned(),
            value: metric.value().clone(),
            metric_type: metric.metric_type().as_str().to_owned(),
            style: metric.style_tag().as_str().to_owned(),
        }
    }
}
