use serde::{Deserialize, Serialize};

use crate::field::FieldDescriptor;

/// Form variant a serializer is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormName {
    /// Compact list rendering.
    List,
    /// Full single-object rendering.
    Detail,
    /// Creation form.
    Create,
    /// Update form.
    Update,
    /// Resource-specific custom form.
    Custom(String),
}

impl FormName {
    /// Parses a form name; unrecognized values become custom forms.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "list" => Self::List,
            "detail" => Self::Detail,
            "create" => Self::Create,
            "update" => Self::Update,
            other => Self::Custom(other.to_owned()),
        }
    }

    /// Returns the stable wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::List => "list",
            Self::Detail => "detail",
            Self::Create => "create",
            Self::Update => "update",
            Self::Custom(name) => name.as_str(),
        }
    }
}

/// Ordered form field schema built fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    form_name: FormName,
    fields: Vec<FieldDescriptor>,
}

impl FormSchema {
    /// Creates a form schema; field order is declaration order.
    #[must_use]
    pub fn new(form_name: FormName, fields: Vec<FieldDescriptor>) -> Self {
        Self { form_name, fields }
    }

    /// Returns the form name this schema was built for.
    #[must_use]
    pub fn form_name(&self) -> &FormName {
        &self.form_name
    }

    /// Returns ordered field descriptors.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns a copy with every current value (recursively) removed.
    #[must_use]
    pub fn without_current_values(self) -> Self {
        Self {
            form_name: self.form_name,
            fields: self
                .fields
                .into_iter()
                .map(FieldDescriptor::without_current_value)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::FormName;

    #[test]
    fn unknown_form_name_parses_as_custom() {
        assert_eq!(
            FormName::parse("quick_create"),
            FormName::Custom("quick_create".to_owned())
        );
        assert_eq!(FormName::parse("update"), FormName::Update);
    }

    #[test]
    fn form_name_round_trips_wire_value() {
        for value in ["list", "detail", "create", "update", "side_panel"] {
            assert_eq!(FormName::parse(value).as_str(), value);
        }
    }

    proptest! {
        #[test]
        fn any_form_name_survives_a_parse_round_trip(value in "[a-z_]{1,24}") {
            let parsed = FormName::parse(&value);
            prop_assert_eq!(parsed.as_str(), value.as_str());
        }
    }
}
