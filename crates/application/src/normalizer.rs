use restmeta_core::AppResult;
use restmeta_domain::{
    FieldDescriptor, FieldKind, PrimitiveType, SerializerField, SerializerSchema,
};

/// Turns a field name into a display label: underscores become spaces
/// and the first letter is capitalized.
#[must_use]
pub fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

fn primitive_kind(primitive: PrimitiveType) -> FieldKind {
    match primitive {
        PrimitiveType::Integer | PrimitiveType::Float | PrimitiveType::Decimal => {
            FieldKind::Number
        }
        PrimitiveType::Boolean => FieldKind::Boolean,
        PrimitiveType::Date => FieldKind::Date,
        PrimitiveType::DateTime => FieldKind::DateTime,
        PrimitiveType::Char
        | PrimitiveType::Text
        | PrimitiveType::Email
        | PrimitiveType::Url
        | PrimitiveType::Uuid
        | PrimitiveType::Json
        | PrimitiveType::File
        | PrimitiveType::Unknown => FieldKind::Text,
    }
}

fn build_descriptor(
    field: &SerializerField,
    label: &str,
    required: bool,
) -> AppResult<FieldDescriptor> {
    let name = field.name().as_str();

    if !field.choices().is_empty() {
        return FieldDescriptor::new(
            name,
            FieldKind::Choice,
            label,
            required,
            field.choices().to_vec(),
            Vec::new(),
        );
    }

    if let Some(nested) = field.nested() {
        return FieldDescriptor::new(
            name,
            FieldKind::Nested,
            label,
            required,
            Vec::new(),
            normalize_schema(nested),
        );
    }

    if field.relation_target().is_some() {
        return FieldDescriptor::new(
            name,
            FieldKind::Relation,
            label,
            required,
            Vec::new(),
            Vec::new(),
        );
    }

    if field.is_computed() {
        return FieldDescriptor::new(
            name,
            FieldKind::Computed,
            label,
            required,
            Vec::new(),
            Vec::new(),
        );
    }

    FieldDescriptor::new(
        name,
        primitive_kind(field.primitive()),
        label,
        required,
        Vec::new(),
        Vec::new(),
    )
}

/// Normalizes one declared field into a canonical descriptor.
///
/// Kind precedence is choice, then nested, then relation, then
/// computed, then the primitive mapping. Normalization never fails: a
/// descriptor that cannot uphold its kind invariants (for example a
/// nested field whose sub-serializer declares no fields) degrades to a
/// plain text descriptor.
#[must_use]
pub fn normalize_field(field: &SerializerField) -> FieldDescriptor {
    let label = field
        .label()
        .map(str::to_owned)
        .unwrap_or_else(|| humanize(field.name().as_str()));
    let required = field.is_required() && !field.is_read_only();

    match build_descriptor(field, &label, required) {
        Ok(descriptor) => descriptor,
        Err(error) => {
            tracing::warn!(
                field = field.name().as_str(),
                %error,
                "field degraded to text kind during normalization"
            );
            FieldDescriptor::text(field.name().clone(), label, required)
        }
    }
}

/// Normalizes every declared field of a serializer in declaration order.
#[must_use]
pub fn normalize_schema(schema: &SerializerSchema) -> Vec<FieldDescriptor> {
    schema.fields().iter().map(normalize_field).collect()
}
