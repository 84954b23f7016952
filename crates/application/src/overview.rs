use async_trait::async_trait;
use restmeta_core::{AppError, AppResult};
use restmeta_domain::{MetricType, OverviewMetric, StyleTag};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ports::RecordStore;
use crate::registry::ResourceDefinition;

/// Most metrics an overview may publish; the client renders them as a
/// single card row.
pub const MAX_OVERVIEW_METRICS: usize = 4;

/// One unvalidated statistic produced by an overview source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetric {
    /// Card title.
    pub title: String,
    /// Raw computed value.
    pub value: Value,
    /// Declared value semantics.
    pub metric_type: MetricType,
    /// Presentation style hint.
    pub style_tag: StyleTag,
}

/// Computes a resource's raw overview statistics against a store.
#[async_trait]
pub trait OverviewSource: Send + Sync {
    /// Computes the raw metrics, in display order.
    async fn raw_metrics(&self, store: &dyn RecordStore) -> AppResult<Vec<RawMetric>>;
}

/// Normalizes raw overview statistics into validated metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverviewAggregator;

impl OverviewAggregator {
    /// Computes and normalizes the overview for one resource.
    ///
    /// A resource without an overview source and a source producing
    /// more than [`MAX_OVERVIEW_METRICS`] are configuration errors.
    /// A metric whose value does not fit its declared type is dropped
    /// and logged instead of failing the whole overview.
    pub async fn compute(
        &self,
        resource: &ResourceDefinition,
        store: &dyn RecordStore,
    ) -> AppResult<Vec<OverviewMetric>> {
        let source = resource.overview().ok_or_else(|| {
            AppError::Configuration(format!(
                "resource '{}' declares no overview source",
                resource.name().as_str()
            ))
        })?;

        let raw = source.raw_metrics(store).await?;
        if raw.len() > MAX_OVERVIEW_METRICS {
            return Err(AppError::Configuration(format!(
                "resource '{}' overview produced {} metrics, at most {MAX_OVERVIEW_METRICS} are allowed",
                resource.name().as_str(),
                raw.len()
            )));
        }

        let mut metrics = Vec::with_capacity(raw.len());
        for metric in raw {
            let Some(value) = normalize_value(&metric) else {
                tracing::warn!(
                    resource = resource.name().as_str(),
                    metric = metric.title,
                    metric_type = metric.metric_type.as_str(),
                    "dropped overview metric with unusable value"
                );
                continue;
            };

            match OverviewMetric::new(metric.title, value, metric.metric_type, metric.style_tag)
            {
                Ok(normalized) => metrics.push(normalized),
                Err(error) => {
                    tracing::warn!(
                        resource = resource.name().as_str(),
                        %error,
                        "dropped invalid overview metric"
                    );
                }
            }
        }

        Ok(metrics)
    }
}

/// Coerces a raw value into the wire shape of its metric type; `None`
/// when the value cannot be represented.
fn normalize_value(metric: &RawMetric) -> Option<Value> {
    match metric.metric_type {
        MetricType::Number => metric.value.is_number().then(|| metric.value.clone()),
        MetricType::Amount => {
            let amount = metric
                .value
                .as_f64()
                .or_else(|| metric.value.as_str().and_then(|text| text.parse().ok()))?;
            Some(Value::String(format!("{amount:.2}")))
        }
        MetricType::Percent => {
            let percent = metric.value.as_f64()?;
            (0.0..=100.0)
                .contains(&percent)
                .then(|| metric.value.clone())
        }
        MetricType::Text => match &metric.value {
            Value::String(text) => Some(Value::String(text.clone())),
            Value::Null => None,
            other => Some(Value::String(other.to_string())),
        },
    }
}
