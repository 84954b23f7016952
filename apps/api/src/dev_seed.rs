//! Seeds the in-memory store with demo records for local runs.

use restmeta_core::{AppError, AppResult};
use restmeta_domain::ChoiceOption;
use restmeta_infrastructure::InMemoryRecordStore;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::resources::INVOICE_STATUS_ENUMERATION;

const SEED_CLIENT_ACME: &str = "6f1b26a2-4c70-4f83-9be1-111111111111";
const SEED_CLIENT_ZENITH: &str = "6f1b26a2-4c70-4f83-9be1-222222222222";

/// Inserts demo clients, invoices, and the invoice status enumeration.
pub async fn run(store: &InMemoryRecordStore) -> AppResult<()> {
    let acme = parse_uuid_const(SEED_CLIENT_ACME, "SEED_CLIENT_ACME")?;
    let zenith = parse_uuid_const(SEED_CLIENT_ZENITH, "SEED_CLIENT_ZENITH")?;

    store
        .register_enumeration(
            INVOICE_STATUS_ENUMERATION,
            vec![
                ChoiceOption::new(json!("draft"), "Draft")?,
                ChoiceOption::new(json!("sent"), "Sent")?,
                ChoiceOption::new(json!("overdue"), "Overdue")?,
            ],
        )
        .await;

    store
        .insert(
            "clients",
            json!({
                "id": acme,
                "name": "Acme Industrial",
                "email": "billing@acme.example",
                "tax_id": 5501,
                "address": { "city": "Lisbon", "country": "PT" },
            }),
        )
        .await?;
    store
        .insert(
            "clients",
            json!({
                "id": zenith,
                "name": "Zenith Labs",
                "email": "accounts@zenith.example",
                "tax_id": 5502,
                "address": { "city": "Porto", "country": "PT" },
            }),
        )
        .await?;

    let invoices = [
        json!({
            "id": Uuid::new_v4(),
            "number": "INV-2026-001",
            "amount": 125_000,
            "currency": "eur",
            "status": "sent",
            "paid": true,
            "quantity": 3,
            "due_date": "2026-02-15",
            "client_id": acme,
            "created_at": "2026-01-10T09:30:00Z",
        }),
        json!({
            "id": Uuid::new_v4(),
            "number": "INV-2026-002",
            "amount": 48_000,
            "currency": "usd",
            "status": "overdue",
            "paid": false,
            "quantity": 12,
            "due_date": "2026-03-01",
            "client_id": zenith,
            "created_at": "2026-02-02T14:00:00Z",
        }),
        json!({
            "id": Uuid::new_v4(),
            "number": "INV-2026-003",
            "amount": 9_900,
            "currency": "eur",
            "status": "draft",
            "paid": false,
            "quantity": 1,
            "due_date": "2026-04-20",
            "client_id": acme,
            "created_at": "2026-03-18T08:15:00Z",
        }),
    ];
    for invoice in invoices {
        store.insert("invoices", invoice).await?;
    }

    info!("seeded demo clients and invoices");
    Ok(())
}

fn parse_uuid_const(value: &str, name: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|error| AppError::Internal(format!("invalid {name} constant: {error}")))
}
