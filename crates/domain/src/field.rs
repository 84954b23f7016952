use std::collections::HashSet;
use std::str::FromStr;

use restmeta_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Primitive type carried by a declared serializer field.
///
/// This is the open input side of normalization: new primitive types
/// map onto [`FieldKind::Text`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    /// Short UTF-8 string field.
    Char,
    /// Long UTF-8 text field.
    Text,
    /// Integer field.
    Integer,
    /// Floating point field.
    Float,
    /// Fixed-precision decimal field.
    Decimal,
    /// Boolean field.
    Boolean,
    /// Date-only field.
    Date,
    /// Date-time field.
    DateTime,
    /// Email address field.
    Email,
    /// URL field.
    Url,
    /// UUID field.
    Uuid,
    /// Arbitrary JSON field.
    Json,
    /// File or image upload field.
    File,
    /// Unrecognized primitive type.
    Unknown,
}

impl PrimitiveType {
    /// Returns a stable storage value for the primitive type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Email => "email",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::Json => "json",
            Self::File => "file",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a primitive type, mapping unrecognized values to
    /// [`PrimitiveType::Unknown`] rather than failing.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "char" => Self::Char,
            "text" => Self::Text,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "decimal" => Self::Decimal,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "email" => Self::Email,
            "url" => Self::Url,
            "uuid" => Self::Uuid,
            "json" => Self::Json,
            "file" => Self::File,
            _ => Self::Unknown,
        }
    }
}

/// Canonical field kind in a normalized descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// UTF-8 string field.
    Text,
    /// Numeric field.
    Number,
    /// Boolean field.
    Boolean,
    /// Date-only field.
    Date,
    /// Date-time field.
    DateTime,
    /// Enumerated choice field.
    Choice,
    /// Many-to-one relation field.
    Relation,
    /// Nested sub-schema field.
    Nested,
    /// Computed read-only field.
    Computed,
}

impl FieldKind {
    /// Returns a stable storage value for the field kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Choice => "choice",
            Self::Relation => "relation",
            Self::Nested => "nested",
            Self::Computed => "computed",
        }
    }
}

impl FromStr for FieldKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "datetime" => Ok(Self::DateTime),
            "choice" => Ok(Self::Choice),
            "relation" => Ok(Self::Relation),
            "nested" => Ok(Self::Nested),
            "computed" => Ok(Self::Computed),
            _ => Err(AppError::Validation(format!(
                "unknown field kind '{value}'"
            ))),
        }
    }
}

/// One `(value, label)` pair in an enumerated choice list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    value: Value,
    label: String,
}

impl ChoiceOption {
    /// Creates a validated choice option.
    pub fn new(value: Value, label: impl Into<String>) -> AppResult<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(AppError::Validation(
                "choice option label must not be empty".to_owned(),
            ));
        }

        Ok(Self { value, label })
    }

    /// Returns the choice value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the choice label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }
}

/// A single declared serializer field, registered statically per resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializerField {
    name: NonEmptyString,
    label: Option<String>,
    primitive: PrimitiveType,
    required: bool,
    read_only: bool,
    computed: bool,
    choices: Vec<ChoiceOption>,
    nested: Option<SerializerSchema>,
    relation_target: Option<NonEmptyString>,
}

impl SerializerField {
    /// Creates a declared serializer field with no extras attached.
    pub fn new(
        name: impl Into<String>,
        primitive: PrimitiveType,
        required: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            label: None,
            primitive,
            required,
            read_only: false,
            computed: false,
            choices: Vec::new(),
            nested: None,
            relation_target: None,
        })
    }

    /// Attaches an explicit display label.
    pub fn with_label(mut self, label: impl Into<String>) -> AppResult<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(AppError::Validation(
                "serializer field label must not be empty".to_owned(),
            ));
        }

        self.label = Some(label);
        Ok(self)
    }

    /// Attaches an inline choice enumeration; declaration order is preserved.
    pub fn with_choices(mut self, choices: Vec<ChoiceOption>) -> AppResult<Self> {
        if choices.is_empty() {
            return Err(AppError::Validation(format!(
                "serializer field '{}' requires at least one choice",
                self.name.as_str()
            )));
        }

        self.choices = choices;
        Ok(self)
    }

    /// Attaches a nested sub-serializer.
    #[must_use]
    pub fn with_nested(mut self, nested: SerializerSchema) -> Self {
        self.nested = Some(nested);
        self
    }

    /// Marks the field as a relation to another resource.
    pub fn with_relation(mut self, target_resource: impl Into<String>) -> AppResult<Self> {
        self.relation_target = Some(NonEmptyString::new(target_resource)?);
        Ok(self)
    }

    /// Marks the field as read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Marks the field as computed (derived, never writable).
    #[must_use]
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self.read_only = true;
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the explicit label, if one was declared.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the declared primitive type.
    #[must_use]
    pub fn primitive(&self) -> PrimitiveType {
        self.primitive
    }

    /// Returns whether the field is required on input.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns whether the field is read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns whether the field is computed.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.computed
    }

    /// Returns the inline choice enumeration.
    #[must_use]
    pub fn choices(&self) -> &[ChoiceOption] {
        &self.choices
    }

    /// Returns the nested sub-serializer, if any.
    #[must_use]
    pub fn nested(&self) -> Option<&SerializerSchema> {
        self.nested.as_ref()
    }

    /// Returns the relation target resource, if any.
    #[must_use]
    pub fn relation_target(&self) -> Option<&NonEmptyString> {
        self.relation_target.as_ref()
    }
}

/// An ordered, statically registered serializer definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializerSchema {
    name: NonEmptyString,
    fields: Vec<SerializerField>,
}

impl SerializerSchema {
    /// Creates a validated serializer schema.
    pub fn new(name: impl Into<String>, fields: Vec<SerializerField>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name().as_str().to_owned()) {
                return Err(AppError::Validation(format!(
                    "duplicate field name '{}' in serializer",
                    field.name().as_str()
                )));
            }
        }

        Ok(Self {
            name: NonEmptyString::new(name)?,
            fields,
        })
    }

    /// Returns the serializer name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[SerializerField] {
        &self.fields
    }
}

/// Canonical, store-agnostic description of one form/display field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: NonEmptyString,
    kind: FieldKind,
    label: String,
    required: bool,
    choices: Vec<ChoiceOption>,
    nested_schema: Vec<FieldDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_value: Option<Value>,
}

impl FieldDescriptor {
    /// Creates a validated field descriptor.
    pub fn new(
        name: impl Into<String>,
        kind: FieldKind,
        label: impl Into<String>,
        required: bool,
        choices: Vec<ChoiceOption>,
        nested_schema: Vec<FieldDescriptor>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;

        if kind == FieldKind::Choice && choices.is_empty() {
            return Err(AppError::Validation(format!(
                "choice descriptor '{}' requires a non-empty choice list",
                name.as_str()
            )));
        }

        if kind == FieldKind::Nested && nested_schema.is_empty() {
            return Err(AppError::Validation(format!(
                "nested descriptor '{}' requires a non-empty sub-schema",
                name.as_str()
            )));
        }

        Ok(Self {
            name,
            kind,
            label: label.into(),
            required,
            choices,
            nested_schema,
            current_value: None,
        })
    }

    /// Creates a plain text descriptor.
    ///
    /// Text descriptors have no kind-specific invariants, so this is
    /// the one infallible constructor and the normalization fallback.
    #[must_use]
    pub fn text(name: NonEmptyString, label: impl Into<String>, required: bool) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            label: label.into(),
            required,
            choices: Vec::new(),
            nested_schema: Vec::new(),
            current_value: None,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the canonical kind.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns whether the field is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the choice list in declaration order.
    #[must_use]
    pub fn choices(&self) -> &[ChoiceOption] {
        &self.choices
    }

    /// Returns the label declared for a choice value; first match wins
    /// when the same value was declared twice.
    #[must_use]
    pub fn choice_label(&self, value: &Value) -> Option<&str> {
        self.choices
            .iter()
            .find(|choice| choice.value() == value)
            .map(ChoiceOption::label)
    }

    /// Returns the nested sub-schema.
    #[must_use]
    pub fn nested_schema(&self) -> &[FieldDescriptor] {
        &self.nested_schema
    }

    /// Returns the populated value when built from an instance.
    #[must_use]
    pub fn current_value(&self) -> Option<&Value> {
        self.current_value.as_ref()
    }

    /// Returns a copy carrying the given current value.
    #[must_use]
    pub fn with_current_value(mut self, value: Value) -> Self {
        self.current_value = Some(value);
        self
    }

    /// Returns a copy carrying the given nested sub-schema descriptors.
    ///
    /// Used when populating nested current values; callers must keep the
    /// nested schema non-empty for nested descriptors.
    #[must_use]
    pub fn with_nested_schema(mut self, nested_schema: Vec<FieldDescriptor>) -> Self {
        self.nested_schema = nested_schema;
        self
    }

    /// Returns a copy with the current value (recursively) removed.
    #[must_use]
    pub fn without_current_value(mut self) -> Self {
        self.current_value = None;
        self.nested_schema = self
            .nested_schema
            .into_iter()
            .map(FieldDescriptor::without_current_value)
            .collect();
        self
    }
}
