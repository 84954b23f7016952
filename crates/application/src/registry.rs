use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use restmeta_core::{AppError, AppResult, NonEmptyString};
use serde_json::json;

use restmeta_domain::{
    ChoiceOption, ChoiceSource, FilterKind, FilterSpec, FormName, SerializerSchema,
    ensure_unique_filter_names,
};

use crate::normalizer::{humanize, normalize_field};
use crate::overview::OverviewSource;
use crate::ports::RecordStore;

/// Sentinel choice prepended to every expanded select list; its empty
/// value means "do not filter".
pub const ALL_CHOICE_LABEL: &str = "All";

/// Declarative input for one registered resource.
///
/// All fields are plain data; validation and derivation happen in
/// [`ResourceDefinition::new`].
pub struct ResourceConfig {
    /// Resource name, also the store collection name.
    pub name: String,
    /// Serializer used when no form-specific one is registered.
    pub default_serializer: SerializerSchema,
    /// Form-specific serializer overrides.
    pub form_serializers: HashMap<FormName, SerializerSchema>,
    /// Explicitly declared filters.
    pub filter_specs: Vec<FilterSpec>,
    /// Field names that get a derived free-text filter each, unless a
    /// declared filter already uses the name.
    pub filter_fields: Vec<String>,
    /// Field names clients may order listings by.
    pub ordering_fields: Vec<String>,
    /// Field names precise lookup matches against.
    pub lookup_fields: Vec<String>,
    /// Field names autocomplete searches and labels records by.
    pub autocomplete_fields: Vec<String>,
    /// Whether to derive a `created_at` date filter.
    pub created_at_filter: bool,
    /// Overview statistics source, if the resource has a dashboard.
    pub overview: Option<Arc<dyn OverviewSource>>,
}

impl ResourceConfig {
    /// Creates a minimal config with only a default serializer.
    #[must_use]
    pub fn new(name: impl Into<String>, default_serializer: SerializerSchema) -> Self {
        Self {
            name: name.into(),
            default_serializer,
            form_serializers: HashMap::new(),
            filter_specs: Vec::new(),
            filter_fields: Vec::new(),
            ordering_fields: Vec::new(),
            lookup_fields: Vec::new(),
            autocomplete_fields: Vec::new(),
            created_at_filter: false,
            overview: None,
        }
    }
}

/// One fully validated resource with its derived filter list.
pub struct ResourceDefinition {
    name: NonEmptyString,
    default_serializer: SerializerSchema,
    form_serializers: HashMap<FormName, SerializerSchema>,
    filter_specs: Vec<FilterSpec>,
    ordering_fields: Vec<String>,
    lookup_fields: Vec<String>,
    autocomplete_fields: Vec<String>,
    overview: Option<Arc<dyn OverviewSource>>,
}

impl ResourceDefinition {
    /// Validates a config and derives the effective filter list.
    ///
    /// Declared filters come first, then one free-text filter per
    /// `filter_fields` entry without a declared filter of the same
    /// name, then the derived `created_at` date filter. Duplicate
    /// names in the effective list are a configuration error.
    pub fn new(config: ResourceConfig) -> AppResult<Self> {
        let name = NonEmptyString::new(config.name)?;
        let mut filter_specs = config.filter_specs;

        for field in &config.filter_fields {
            if filter_specs.iter().any(|spec| spec.name().as_str() == field) {
                continue;
            }

            let field_type = config
                .default_serializer
                .fields()
                .iter()
                .find(|declared| declared.name().as_str() == field)
                .map(|declared| normalize_field(declared).kind())
                .unwrap_or(restmeta_domain::FieldKind::Text);
            filter_specs.push(FilterSpec::new(
                humanize(field),
                field.clone(),
                FilterKind::FormValue { field_type },
            )?);
        }

        if config.created_at_filter
            && !filter_specs
                .iter()
                .any(|spec| spec.name().as_str() == "created_at")
        {
            filter_specs.push(FilterSpec::new("Created at", "created_at", FilterKind::Date)?);
        }

        ensure_unique_filter_names(&filter_specs)?;

        Ok(Self {
            name,
            default_serializer: config.default_serializer,
            form_serializers: config.form_serializers,
            filter_specs,
            ordering_fields: config.ordering_fields,
            lookup_fields: config.lookup_fields,
            autocomplete_fields: config.autocomplete_fields,
            overview: config.overview,
        })
    }

    /// Returns the resource name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the serializer registered for the form, falling back to
    /// the default serializer.
    #[must_use]
    pub fn serializer_for(&self, form_name: &FormName) -> &SerializerSchema {
        self.form_serializers
            .get(form_name)
            .unwrap_or(&self.default_serializer)
    }

    /// Returns the effective filter list in derivation order.
    #[must_use]
    pub fn filter_specs(&self) -> &[FilterSpec] {
        &self.filter_specs
    }

    /// Returns the orderable field names.
    #[must_use]
    pub fn ordering_fields(&self) -> &[String] {
        &self.ordering_fields
    }

    /// Returns the precise-lookup field names.
    #[must_use]
    pub fn lookup_fields(&self) -> &[String] {
        &self.lookup_fields
    }

    /// Returns the autocomplete field names.
    #[must_use]
    pub fn autocomplete_fields(&self) -> &[String] {
        &self.autocomplete_fields
    }

    /// Returns the overview source, if the resource declares one.
    #[must_use]
    pub fn overview(&self) -> Option<&Arc<dyn OverviewSource>> {
        self.overview.as_ref()
    }
}

/// Expands a select filter's choice source into a concrete choice
/// list, with the [`ALL_CHOICE_LABEL`] sentinel prepended.
pub async fn resolve_select_choices(
    filter_name: &str,
    source: &ChoiceSource,
    store: &dyn RecordStore,
) -> AppResult<Vec<ChoiceOption>> {
    let resolved = match source {
        ChoiceSource::Inline(choices) => choices.clone(),
        ChoiceSource::Enumeration(enumeration) => store
            .resolve_enumeration(enumeration.as_str())
            .await?
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "filter '{filter_name}' references unknown enumeration '{}'",
                    enumeration.as_str()
                ))
            })?,
    };

    let mut choices = vec![ChoiceOption::new(json!(""), ALL_CHOICE_LABEL)?];
    choices.extend(resolved);
    Ok(choices)
}

/// All registered resources, addressable by name.
pub struct ResourceRegistry {
    resources: BTreeMap<String, Arc<ResourceDefinition>>,
}

impl ResourceRegistry {
    /// Creates a registry; resource names must be unique.
    pub fn new(definitions: Vec<ResourceDefinition>) -> AppResult<Self> {
        let mut resources = BTreeMap::new();
        for definition in definitions {
            let name = definition.name().as_str().to_owned();
            if resources.insert(name.clone(), Arc::new(definition)).is_some() {
                return Err(AppError::Configuration(format!(
                    "duplicate resource name '{name}' in registry"
                )));
            }
        }

        Ok(Self { resources })
    }

    /// Looks a resource up by name.
    pub fn get(&self, name: &str) -> AppResult<Arc<ResourceDefinition>> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("resource '{name}' is not registered")))
    }

    /// Returns all resources in name order.
    pub fn resources(&self) -> impl Iterator<Item = &Arc<ResourceDefinition>> {
        self.resources.values()
    }

    /// Checks that every enumeration-backed select filter resolves to a
    /// non-empty choice list. Run once at startup.
    pub async fn validate_choice_sources(&self, store: &dyn RecordStore) -> AppResult<()> {
        for definition in self.resources.values() {
            for spec in definition.filter_specs() {
                let FilterKind::Select {
                    source: ChoiceSource::Enumeration(enumeration),
                    ..
                } = spec.kind()
                else {
                    continue;
                };

                let resolved = store.resolve_enumeration(enumeration.as_str()).await?;
                if resolved.map(|choices| choices.is_empty()).unwrap_or(true) {
                    return Err(AppError::Configuration(format!(
                        "resource '{}' filter '{}' resolves enumeration '{}' to no choices",
                        definition.name().as_str(),
                        spec.name().as_str(),
                        enumeration.as_str()
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use restmeta_core::{AppError, AppResult, NonEmptyString};
    use restmeta_domain::{
        ChoiceOption, ChoiceSource, FieldKind, FilterKind, FilterSpec, PrimitiveType,
        SerializerField, SerializerSchema,
    };
    use serde_json::{Value, json};

    use crate::ports::{PageRequest, RecordStore, SortSpec};
    use crate::predicate::Predicate;

    use super::{ResourceConfig, ResourceDefinition, ResourceRegistry};

    struct EnumerationStore {
        choices: Option<Vec<ChoiceOption>>,
    }

    #[async_trait]
    impl RecordStore for EnumerationStore {
        async fn list(
            &self,
            _resource: &str,
            _predicate: Option<&Predicate>,
            _order: Option<&SortSpec>,
            _page: PageRequest,
        ) -> AppResult<Vec<Value>> {
            Ok(Vec::new())
        }

        async fn find_by_id(&self, _resource: &str, _id: &str) -> AppResult<Option<Value>> {
            Ok(None)
        }

        async fn resolve_enumeration(
            &self,
            _name: &str,
        ) -> AppResult<Option<Vec<ChoiceOption>>> {
            Ok(self.choices.clone())
        }
    }

    fn registry_with_enumerated_select() -> ResourceRegistry {
        let mut config = ResourceConfig::new("invoices", serializer());
        config.filter_specs = vec![
            FilterSpec::new(
                "Status",
                "status",
                FilterKind::Select {
                    source: ChoiceSource::Enumeration(
                        NonEmptyString::new("invoice_statuses")
                            .unwrap_or_else(|_| unreachable!()),
                    ),
                    multiple: false,
                },
            )
            .unwrap_or_else(|_| unreachable!()),
        ];
        let definition = ResourceDefinition::new(config).unwrap_or_else(|_| unreachable!());
        ResourceRegistry::new(vec![definition]).unwrap_or_else(|_| unreachable!())
    }

    fn serializer() -> SerializerSchema {
        let fields = vec![
            SerializerField::new("number", PrimitiveType::Char, true)
                .unwrap_or_else(|_| unreachable!()),
            SerializerField::new("amount", PrimitiveType::Decimal, true)
                .unwrap_or_else(|_| unreachable!()),
        ];
        SerializerSchema::new("invoice", fields).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn filter_fields_derive_typed_free_text_filters() {
        let mut config = ResourceConfig::new("invoices", serializer());
        config.filter_fields = vec!["amount".to_owned(), "reference".to_owned()];

        let definition = ResourceDefinition::new(config).unwrap_or_else(|_| unreachable!());
        let specs = definition.filter_specs();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name().as_str(), "amount");
        assert_eq!(specs[0].title().as_str(), "Amount");
        assert_eq!(
            specs[0].kind(),
            &FilterKind::FormValue {
                field_type: FieldKind::Number
            }
        );
        assert_eq!(
            specs[1].kind(),
            &FilterKind::FormValue {
                field_type: FieldKind::Text
            }
        );
    }

    #[test]
    fn declared_filter_suppresses_derived_one_of_same_name() {
        let mut config = ResourceConfig::new("invoices", serializer());
        config.filter_specs = vec![
            FilterSpec::new("Paid", "paid", FilterKind::Boolean)
                .unwrap_or_else(|_| unreachable!()),
        ];
        config.filter_fields = vec!["paid".to_owned()];

        let definition = ResourceDefinition::new(config).unwrap_or_else(|_| unreachable!());
        assert_eq!(definition.filter_specs().len(), 1);
        assert_eq!(definition.filter_specs()[0].kind(), &FilterKind::Boolean);
    }

    #[test]
    fn created_at_filter_is_derived_once() {
        let mut config = ResourceConfig::new("invoices", serializer());
        config.created_at_filter = true;

        let definition = ResourceDefinition::new(config).unwrap_or_else(|_| unreachable!());
        assert_eq!(definition.filter_specs().len(), 1);
        assert_eq!(definition.filter_specs()[0].name().as_str(), "created_at");
        assert_eq!(definition.filter_specs()[0].kind(), &FilterKind::Date);
    }

    #[test]
    fn registry_rejects_duplicate_resource_names() {
        let first = ResourceDefinition::new(ResourceConfig::new("invoices", serializer()))
            .unwrap_or_else(|_| unreachable!());
        let second = ResourceDefinition::new(ResourceConfig::new("invoices", serializer()))
            .unwrap_or_else(|_| unreachable!());

        assert!(ResourceRegistry::new(vec![first, second]).is_err());
    }

    #[test]
    fn unknown_resource_is_a_not_found_error() {
        let registry = ResourceRegistry::new(Vec::new()).unwrap_or_else(|_| unreachable!());
        assert!(registry.get("payments").is_err());
    }

    #[tokio::test]
    async fn unresolved_enumeration_fails_startup_validation() {
        let registry = registry_with_enumerated_select();
        let store = EnumerationStore { choices: None };

        let result = registry.validate_choice_sources(&store).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn empty_enumeration_fails_startup_validation() {
        let registry = registry_with_enumerated_select();
        let store = EnumerationStore {
            choices: Some(Vec::new()),
        };

        let result = registry.validate_choice_sources(&store).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn populated_enumeration_passes_startup_validation() {
        let registry = registry_with_enumerated_select();
        let store = EnumerationStore {
            choices: Some(vec![
                ChoiceOption::new(json!("draft"), "Draft").unwrap_or_else(|_| unreachable!()),
            ]),
        };

        assert!(registry.validate_choice_sources(&store).await.is_ok());
    }
}
