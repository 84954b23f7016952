use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use restmeta_application::{CompareOp, PageRequest, Predicate, RecordStore, SortSpec};
use restmeta_core::{AppError, AppResult};
use restmeta_domain::ChoiceOption;
use serde_json::Value;
use sqlx::postgres::PgPool;
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

/// Record store backed by a Postgres `records` table with a JSONB
/// `data` column.
pub struct PostgresRecordStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct RecordRow {
    id: Uuid,
    data: Value,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct EnumerationRow {
    value: Value,
    label: String,
}

impl PostgresRecordStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Merges the row columns into the record object handed to callers:
/// `id` as text and `created_at` as an RFC 3339 timestamp.
fn record_from_row(row: RecordRow) -> AppResult<Value> {
    let Value::Object(mut object) = row.data else {
        return Err(AppError::Internal(format!(
            "record '{}' carries non-object data",
            row.id
        )));
    };

    object.insert("id".to_owned(), Value::String(row.id.to_string()));
    object.insert(
        "created_at".to_owned(),
        Value::String(row.created_at.to_rfc3339()),
    );
    Ok(Value::Object(object))
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn list(
        &self,
        resource: &str,
        predicate: Option<&Predicate>,
        order: Option<&SortSpec>,
        page: PageRequest,
    ) -> AppResult<Vec<Value>> {
        let limit = i64::try_from(page.limit()).map_err(|error| {
            AppError::Validation(format!("invalid record page limit: {error}"))
        })?;
        let offset = i64::try_from(page.offset()).map_err(|error| {
            AppError::Validation(format!("invalid record page offset: {error}"))
        })?;

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT id, data, created_at FROM records WHERE resource = ");
        builder.push_bind(resource.to_owned());

        if let Some(predicate) = predicate {
            builder.push(" AND ");
            push_predicate(&mut builder, predicate)?;
        }

        if let Some(order) = order {
            builder.push(" ORDER BY ");
            if order.field == "created_at" {
                builder.push("created_at");
            } else {
                push_field_text(&mut builder, &order.field);
            }
            builder.push(if order.descending {
                " DESC NULLS LAST, "
            } else {
                " ASC NULLS LAST, "
            });
            builder.push("created_at ASC, id ASC LIMIT ");
        } else {
            builder.push(" ORDER BY created_at ASC, id ASC LIMIT ");
        }
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build_query_as::<RecordRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to list '{resource}' records: {error}"
                ))
            })?;

        rows.into_iter().map(record_from_row).collect()
    }

    async fn find_by_id(&self, resource: &str, id: &str) -> AppResult<Option<Value>> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, data, created_at FROM records WHERE resource = $1 AND id = $2",
        )
        .bind(resource)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load '{resource}' record '{id}': {error}"
            ))
        })?;

        row.map(record_from_row).transpose()
    }

    async fn resolve_enumeration(&self, name: &str) -> AppResult<Option<Vec<ChoiceOption>>> {
        let rows = sqlx::query_as::<_, EnumerationRow>(
            "SELECT value, label FROM enumerations WHERE name = $1 ORDER BY position ASC",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve enumeration '{name}': {error}"))
        })?;

        if rows.is_empty() {
            return Ok(None);
        }

        let choices = rows
            .into_iter()
            .map(|row| ChoiceOption::new(row.value, row.label))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Some(choices))
    }
}

/// Renders a predicate as a parenthesized SQL condition over the JSONB
/// `data` column; `created_at` addresses the row column instead.
fn push_predicate(
    builder: &mut QueryBuilder<'_, Postgres>,
    predicate: &Predicate,
) -> AppResult<()> {
    match predicate {
        Predicate::Compare { field, op, value } => {
            push_comparison(builder, field, *op, value)?;
        }
        Predicate::Contains { field, text } => {
            push_field_text(builder, field);
            builder.push(" ILIKE ");
            builder.push_bind(format!("%{}%", escape_like(text)));
        }
        Predicate::All(children) => push_group(builder, children, " AND ", "TRUE")?,
        Predicate::Any(children) => push_group(builder, children, " OR ", "FALSE")?,
    }

    Ok(())
}

fn push_group(
    builder: &mut QueryBuilder<'_, Postgres>,
    children: &[Predicate],
    joiner: &str,
    empty: &str,
) -> AppResult<()> {
    if children.is_empty() {
        builder.push(empty);
        return Ok(());
    }

    builder.push('(');
    for (index, child) in children.iter().enumerate() {
        if index > 0 {
            builder.push(joiner);
        }
        push_predicate(builder, child)?;
    }
    builder.push(')');
    Ok(())
}

fn push_comparison(
    builder: &mut QueryBuilder<'_, Postgres>,
    field: &str,
    op: CompareOp,
    value: &Value,
) -> AppResult<()> {
    let operator = match op {
        CompareOp::Eq => "=",
        CompareOp::Gte => ">=",
        CompareOp::Lt => "<",
    };

    if field == "created_at" {
        let text = value.as_str().ok_or_else(|| {
            AppError::Validation("created_at bounds must be ISO dates".to_owned())
        })?;
        let day = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|error| {
            AppError::Validation(format!("invalid created_at bound '{text}': {error}"))
        })?;

        builder.push("created_at::date ");
        builder.push(operator);
        builder.push(' ');
        builder.push_bind(day);
        return Ok(());
    }

    match value {
        Value::Number(_) => {
            builder.push('(');
            push_field_text(builder, field);
            builder.push(")::NUMERIC ");
            builder.push(operator);
            builder.push(" (");
            builder.push_bind(value.to_string());
            builder.push(")::NUMERIC");
        }
        Value::Bool(flag) => {
            builder.push('(');
            push_field_text(builder, field);
            builder.push(")::BOOLEAN ");
            builder.push(operator);
            builder.push(' ');
            builder.push_bind(*flag);
        }
        other => {
            push_field_text(builder, field);
            builder.push(' ');
            builder.push(operator);
            builder.push(' ');
            builder.push_bind(other.as_str().map(str::to_owned).unwrap_or_else(|| other.to_string()));
        }
    }

    Ok(())
}

/// Addresses a record member as text; dotted paths descend into the
/// JSONB document.
fn push_field_text(builder: &mut QueryBuilder<'_, Postgres>, field: &str) {
    if field.contains('.') {
        let path: Vec<String> = field.split('.').map(str::to_owned).collect();
        builder.push("data #>> ");
        builder.push_bind(path);
    } else {
        builder.push("data ->> ");
        builder.push_bind(field.to_owned());
    }
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use restmeta_application::{PredicateBuilder, RelationalPredicateBuilder};
    use serde_json::json;
    use sqlx::{Postgres, QueryBuilder};

    use super::push_predicate;

    fn rendered(predicate: &super::Predicate) -> String {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("");
        push_predicate(&mut builder, predicate).unwrap_or_else(|_| unreachable!());
        builder.sql().to_owned()
    }

    #[test]
    fn numeric_comparisons_cast_to_numeric() {
        let builder = RelationalPredicateBuilder;
        let sql = rendered(&builder.range("amount", Some(json!(100)), Some(json!(500))));

        assert!(sql.contains("::NUMERIC >="));
        assert!(sql.contains("::NUMERIC <"));
    }

    #[test]
    fn text_match_renders_as_ilike() {
        let builder = RelationalPredicateBuilder;
        let sql = rendered(&builder.text_match("number", "inv"));
        assert!(sql.contains("ILIKE"));
    }

    #[test]
    fn created_at_addresses_the_row_column() {
        let builder = RelationalPredicateBuilder;
        let sql = rendered(&builder.range(
            "created_at",
            Some(json!("2026-01-01")),
            Some(json!("2026-02-01")),
        ));
        assert!(sql.contains("created_at::date >="));
    }

    #[test]
    fn dotted_paths_descend_into_the_document() {
        let builder = RelationalPredicateBuilder;
        let sql = rendered(&builder.exact("client.name", json!("Acme")));
        assert!(sql.contains("data #>> "));
    }

    #[test]
    fn empty_disjunction_matches_nothing() {
        let builder = RelationalPredicateBuilder;
        let sql = rendered(&builder.any_of(Vec::new()));
        assert_eq!(sql, "FALSE");
    }
}
