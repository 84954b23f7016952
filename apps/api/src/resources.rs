//! Demo resource catalog: a small invoicing domain exercising every
//! filter kind, nested forms, lookups, and an overview.

use std::sync::Arc;

use async_trait::async_trait;
use restmeta_application::{
    OverviewSource, PageRequest, RawMetric, RecordStore, ResourceConfig, ResourceDefinition,
    ResourceRegistry,
};
use restmeta_core::AppResult;
use restmeta_domain::{
    ChoiceOption, ChoiceSource, FilterKind, FilterSpec, FormName, MetricType, PrimitiveType,
    SerializerField, SerializerSchema, StyleTag,
};
use serde_json::{Value, json};

/// Enumeration name the invoice status select resolves through the
/// store.
pub const INVOICE_STATUS_ENUMERATION: &str = "invoice_statuses";

/// Builds the registry of demo resources.
pub fn build_registry() -> AppResult<ResourceRegistry> {
    ResourceRegistry::new(vec![invoices()?, clients()?])
}

fn invoices() -> AppResult<ResourceDefinition> {
    let default_serializer = SerializerSchema::new(
        "invoice",
        vec![
            SerializerField::new("number", PrimitiveType::Char, true)?,
            SerializerField::new("amount", PrimitiveType::Decimal, true)?
                .with_label("Amount (cents)")?,
            SerializerField::new("currency", PrimitiveType::Char, true)?.with_choices(vec![
                ChoiceOption::new(json!("eur"), "Euro")?,
                ChoiceOption::new(json!("usd"), "US Dollar")?,
            ])?,
            SerializerField::new("paid", PrimitiveType::Boolean, false)?,
            SerializerField::new("due_date", PrimitiveType::Date, true)?,
            SerializerField::new("client_id", PrimitiveType::Uuid, true)?
                .with_relation("clients")?,
            SerializerField::new("notes", PrimitiveType::Text, false)?,
            SerializerField::new("created_at", PrimitiveType::DateTime, false)?.read_only(),
        ],
    )?;

    let list_serializer = SerializerSchema::new(
        "invoice_list",
        vec![
            SerializerField::new("number", PrimitiveType::Char, true)?,
            SerializerField::new("amount", PrimitiveType::Decimal, true)?,
            SerializerField::new("paid", PrimitiveType::Boolean, false)?,
        ],
    )?;

    let filter_specs = vec![
        FilterSpec::new(
            "Status",
            "status",
            FilterKind::Select {
                source: ChoiceSource::Enumeration(
                    restmeta_core::NonEmptyString::new(INVOICE_STATUS_ENUMERATION)?,
                ),
                multiple: true,
            },
        )?,
        FilterSpec::new(
            "Client",
            "client_id",
            FilterKind::Autocomplete {
                lookup_url: restmeta_core::NonEmptyString::new(
                    "/api/resources/clients/autocomplete",
                )?,
            },
        )?,
        FilterSpec::new("Paid", "paid", FilterKind::Boolean)?,
        FilterSpec::new("Due date", "due_date", FilterKind::DateRange)?,
        FilterSpec::new("Amount", "amount", FilterKind::AmountRange { subunit_scale: 2 })?,
        FilterSpec::new(
            "Quantity",
            "quantity",
            FilterKind::NumericRange {
                min: Some(0.0),
                max: Some(100.0),
                step: Some(1.0),
            },
        )?,
    ];

    let mut config = ResourceConfig::new("invoices", default_serializer);
    config.form_serializers.insert(FormName::List, list_serializer);
    config.filter_specs = filter_specs;
    config.filter_fields = vec!["number".to_owned()];
    config.created_at_filter = true;
    config.ordering_fields = vec![
        "number".to_owned(),
        "amount".to_owned(),
        "due_date".to_owned(),
        "created_at".to_owned(),
    ];
    config.lookup_fields = vec!["number".to_owned()];
    config.autocomplete_fields = vec!["number".to_owned()];
    config.overview = Some(Arc::new(InvoiceOverview));
    ResourceDefinition::new(config)
}

fn clients() -> AppResult<ResourceDefinition> {
    let address = SerializerSchema::new(
        "address",
        vec![
            SerializerField::new("city", PrimitiveType::Char, false)?,
            SerializerField::new("country", PrimitiveType::Char, false)?,
        ],
    )?;

    let default_serializer = SerializerSchema::new(
        "client",
        vec![
            SerializerField::new("name", PrimitiveType::Char, true)?,
            SerializerField::new("email", PrimitiveType::Email, false)?,
            SerializerField::new("tax_id", PrimitiveType::Integer, false)?,
            SerializerField::new("address", PrimitiveType::Json, false)?.with_nested(address),
        ],
    )?;

    let mut config = ResourceConfig::new("clients", default_serializer);
    config.filter_fields = vec!["name".to_owned(), "email".to_owned()];
    config.ordering_fields = vec!["name".to_owned()];
    config.lookup_fields = vec!["name".to_owned(), "tax_id".to_owned()];
    config.autocomplete_fields = vec!["name".to_owned()];
    ResourceDefinition::new(config)
}

/// Overview over the invoices resource: count, paid share, and total
/// volume in major units.
struct InvoiceOverview;

#[async_trait]
impl OverviewSource for InvoiceOverview {
    async fn raw_metrics(&self, store: &dyn RecordStore) -> AppResult<Vec<RawMetric>> {
        let invoices = store
            .list("invoices", None, None, PageRequest::first(200)?)
            .await?;

        let count = invoices.len();
        let total_subunits: i64 = invoices
            .iter()
            .filter_map(|invoice| invoice.get("amount").and_then(Value::as_i64))
            .sum();
        let paid = invoices
            .iter()
            .filter(|invoice| {
                invoice.get("paid").and_then(Value::as_bool).unwrap_or(false)
            })
            .count();
        let paid_share = if count == 0 {
            0.0
        } else {
            paid as f64 * 100.0 / count as f64
        };

        Ok(vec![
            RawMetric {
                title: "Invoices".to_owned(),
                value: json!(count),
                metric_type: MetricType::Number,
                style_tag: StyleTag::Primary,
            },
            RawMetric {
                title: "Total volume".to_owned(),
                value: json!(total_subunits as f64 / 100.0),
                metric_type: MetricType::Amount,
                style_tag: StyleTag::Info,
            },
            RawMetric {
                title: "Paid".to_owned(),
                value: json!(paid_share),
                metric_type: MetricType::Percent,
                style_tag: StyleTag::Success,
            },
        ])
    }
}
