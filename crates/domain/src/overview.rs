use std::str::FromStr;

use restmeta_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value semantics of one overview statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    /// Plain numeric value.
    Number,
    /// Monetary value rendered with a fixed decimal policy.
    Amount,
    /// Percentage bounded to `0..=100`.
    Percent,
    /// Free text value.
    Text,
}

impl MetricType {
    /// Returns the stable wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Amount => "amount",
            Self::Percent => "percent",
            Self::Text => "text",
        }
    }
}

impl FromStr for MetricType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "number" => Ok(Self::Number),
            "amount" => Ok(Self::Amount),
            "percent" => Ok(Self::Percent),
            "text" => Ok(Self::Text),
            _ => Err(AppError::Validation(format!(
                "unknown metric type '{value}'"
            ))),
        }
    }
}

/// Presentation style hint for overview cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleTag {
    /// Primary emphasis.
    Primary,
    /// Informational emphasis.
    Info,
    /// Secondary emphasis.
    Secondary,
    /// Warning emphasis.
    Warning,
    /// Success emphasis.
    Success,
    /// Danger emphasis.
    Danger,
}

impl StyleTag {
    /// Returns the stable wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Info => "info",
            Self::Secondary => "secondary",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }
}

/// One normalized dashboard summary statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetric {
    title: NonEmptyString,
    value: Value,
    metric_type: MetricType,
    style_tag: StyleTag,
}

impl OverviewMetric {
    /// Creates a validated overview metric.
    ///
    /// `number` and `percent` values must be numeric and percentages
    /// bounded to `0..=100`; `amount` accepts a number or an already
    /// formatted numeric string.
    pub fn new(
        title: impl Into<String>,
        value: Value,
        metric_type: MetricType,
        style_tag: StyleTag,
    ) -> AppResult<Self> {
        let title = NonEmptyString::new(title)?;

        match metric_type {
            MetricType::Number => {
                if !value.is_number() {
                    return Err(AppError::Validation(format!(
                        "metric '{}' of type 'number' requires a numeric value",
                        title.as_str()
                    )));
                }
            }
            MetricType::Amount => {
                let is_numeric_string = value
                    .as_str()
                    .map(|text| text.parse::<f64>().is_ok())
                    .unwrap_or(false);
                if !value.is_number() && !is_numeric_string {
                    return Err(AppError::Validation(format!(
                        "metric '{}' of type 'amount' requires a numeric value",
                        title.as_str()
                    )));
                }
            }
            MetricType::Percent => {
                let in_bounds = value
                    .as_f64()
                    .map(|percent| (0.0..=100.0).contains(&percent))
                    .unwrap_or(false);
                if !in_bounds {
                    return Err(AppError::Validation(format!(
                        "metric '{}' of type 'percent' requires a value between 0 and 100",
                        title.as_str()
                    )));
                }
            }
            MetricType::Text => {}
        }

        Ok(Self {
            title,
            value,
            metric_type,
            style_tag,
        })
    }

    /// Returns the metric title.
    #[must_use]
    pub fn title(&self) -> &NonEmptyString {
        &self.title
    }

    /// Returns the normalized metric value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the metric type.
    #[must_use]
    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    /// Returns the presentation style tag.
    #[must_use]
    pub fn style_tag(&self) -> StyleTag {
        self.style_tag
    }
}
