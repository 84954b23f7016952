use restmeta_core::{AppError, AppResult};
use restmeta_domain::{FieldDescriptor, FieldKind, FormName, FormSchema};
use serde_json::Value;

use crate::normalizer::normalize_schema;
use crate::ports::RecordStore;
use crate::registry::ResourceDefinition;

/// Builds form schemas from registered serializers, fresh per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormAssembler;

impl FormAssembler {
    /// Builds the blank form schema for a form name.
    ///
    /// A form without its own serializer falls back to the resource's
    /// default serializer.
    #[must_use]
    pub fn build(&self, resource: &ResourceDefinition, form_name: FormName) -> FormSchema {
        let fields = normalize_schema(resource.serializer_for(&form_name));
        FormSchema::new(form_name, fields)
    }

    /// Builds the form schema pre-filled from one stored record.
    pub async fn build_for_instance(
        &self,
        resource: &ResourceDefinition,
        form_name: FormName,
        store: &dyn RecordStore,
        id: &str,
    ) -> AppResult<FormSchema> {
        let record = store
            .find_by_id(resource.name().as_str(), id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no '{}' record with id '{id}'",
                    resource.name().as_str()
                ))
            })?;

        let fields = normalize_schema(resource.serializer_for(&form_name))
            .into_iter()
            .map(|descriptor| populate(descriptor, &record))
            .collect();
        Ok(FormSchema::new(form_name, fields))
    }
}

/// Copies the record member of the same name into the descriptor's
/// current value, descending into nested sub-schemas.
fn populate(descriptor: FieldDescriptor, record: &Value) -> FieldDescriptor {
    let Some(value) = record.get(descriptor.name().as_str()) else {
        return descriptor;
    };

    if descriptor.kind() == FieldKind::Nested && value.is_object() {
        let nested = descriptor
            .nested_schema()
            .iter()
            .cloned()
            .map(|child| populate(child, value))
            .collect();
        return descriptor
            .with_nested_schema(nested)
            .with_current_value(value.clone());
    }

    descriptor.with_current_value(value.clone())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use restmeta_core::AppResult;
    use restmeta_domain::{
        ChoiceOption, FormName, PrimitiveType, SerializerField, SerializerSchema,
    };
    use serde_json::{Value, json};

    use crate::ports::{PageRequest, RecordStore, SortSpec};
    use crate::predicate::Predicate;
    use crate::registry::{ResourceConfig, ResourceDefinition};

    use super::FormAssembler;

    struct FakeStore {
        records: Vec<Value>,
    }

    #[async_trait]
    impl RecordStore for FakeStore {
        async fn list(
            &self,
            _resource: &str,
            _predicate: Option<&Predicate>,
            _order: Option<&SortSpec>,
            page: PageRequest,
        ) -> AppResult<Vec<Value>> {
            Ok(self
                .records
                .iter()
                .skip(page.offset())
                .take(page.limit())
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, _resource: &str, id: &str) -> AppResult<Option<Value>> {
            Ok(self
                .records
                .iter()
                .find(|record| record.get("id").and_then(Value::as_str) == Some(id))
                .cloned())
        }

        async fn resolve_enumeration(
            &self,
            _name: &str,
        ) -> AppResult<Option<Vec<ChoiceOption>>> {
            Ok(None)
        }
    }

    fn client_resource() -> ResourceDefinition {
        let address = SerializerSchema::new(
            "address",
            vec![
                SerializerField::new("city", PrimitiveType::Char, false)
                    .unwrap_or_else(|_| unreachable!()),
            ],
        )
        .unwrap_or_else(|_| unreachable!());

        let serializer = SerializerSchema::new(
            "client",
            vec![
                SerializerField::new("name", PrimitiveType::Char, true)
                    .unwrap_or_else(|_| unreachable!()),
                SerializerField::new("address", PrimitiveType::Json, false)
                    .unwrap_or_else(|_| unreachable!())
                    .with_nested(address),
            ],
        )
        .unwrap_or_else(|_| unreachable!());

        ResourceDefinition::new(ResourceConfig::new("clients", serializer))
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn blank_form_carries_no_current_values() {
        let schema = FormAssembler.build(&client_resource(), FormName::Create);
        assert!(schema
            .fields()
            .iter()
            .all(|field| field.current_value().is_none()));
    }

    #[tokio::test]
    async fn instance_form_populates_nested_values() {
        let store = FakeStore {
            records: vec![json!({
                "id": "c1",
                "name": "Acme",
                "address": { "city": "Lisbon" },
            })],
        };

        let schema = FormAssembler
            .build_for_instance(&client_resource(), FormName::Update, &store, "c1")
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(schema.fields()[0].current_value(), Some(&json!("Acme")));
        let address = &schema.fields()[1];
        assert_eq!(
            address.nested_schema()[0].current_value(),
            Some(&json!("Lisbon"))
        );
    }

    #[tokio::test]
    async fn missing_instance_is_a_not_found_error() {
        let store = FakeStore { records: Vec::new() };
        let result = FormAssembler
            .build_for_instance(&client_resource(), FormName::Update, &store, "nope")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn populate_then_strip_restores_blank_schema() {
        let resource = client_resource();
        let store = FakeStore {
            records: vec![json!({ "id": "c1", "name": "Acme" })],
        };

        let blank = FormAssembler.build(&resource, FormName::Update);
        let stripped = FormAssembler
            .build_for_instance(&resource, FormName::Update, &store, "c1")
            .await
            .unwrap_or_else(|_| unreachable!())
            .without_current_values();

        assert_eq!(blank, stripped);
    }
}
