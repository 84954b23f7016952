use std::collections::HashSet;

use restmeta_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::field::{ChoiceOption, FieldKind};

/// Where a select filter sources its choices from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceSource {
    /// Choices declared inline on the filter spec.
    Inline(Vec<ChoiceOption>),
    /// Choices resolved live from a named store enumeration.
    Enumeration(NonEmptyString),
}

/// Declarative filter kind with kind-specific options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterKind {
    /// Exact-match filter over an enumerated choice list.
    Select {
        /// Choice source expanded at request time.
        source: ChoiceSource,
        /// Whether the client may pick several values.
        multiple: bool,
    },
    /// Exact-match filter applying an id chosen through a lookup UI.
    Autocomplete {
        /// Autocomplete endpoint the client should query.
        lookup_url: NonEmptyString,
    },
    /// Exact-match boolean filter.
    Boolean,
    /// Single-day or interval date filter.
    Date,
    /// Half-open `[from, to)` date interval filter.
    DateRange,
    /// Numeric interval over a monetary field stored in subunits.
    AmountRange {
        /// Decimal digits between the stored subunit and the major unit.
        subunit_scale: u32,
    },
    /// Half-open `[min, max)` numeric interval filter.
    NumericRange {
        /// Smallest value the client should offer.
        min: Option<f64>,
        /// Largest value the client should offer.
        max: Option<f64>,
        /// Slider step hint.
        step: Option<f64>,
    },
    /// Free-text filter matched as substring (relational) or analyzed
    /// full text (search index).
    FormValue {
        /// Input widget hint for the client.
        field_type: FieldKind,
    },
}

impl FilterKind {
    /// Returns the stable wire name for the filter kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Select { multiple: true, .. } => "select_multiple",
            Self::Select { multiple: false, .. } => "select",
            Self::Autocomplete { .. } => "autocomplete",
            Self::Boolean => "bool",
            Self::Date => "date",
            Self::DateRange => "date_range",
            Self::AmountRange { .. } => "amount_range",
            Self::NumericRange { .. } => "numeric_range",
            Self::FormValue { .. } => "form_value",
        }
    }
}

/// Declarative description of one filter a resource supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    title: NonEmptyString,
    name: NonEmptyString,
    kind: FilterKind,
    target_fields: Vec<NonEmptyString>,
}

impl FilterSpec {
    /// Creates a filter spec targeting the store field of the same name.
    ///
    /// Target field paths are not resolved here; a missing path fails
    /// only when the filter is actually applied.
    pub fn new(
        title: impl Into<String>,
        name: impl Into<String>,
        kind: FilterKind,
    ) -> AppResult<Self> {
        if let FilterKind::Select {
            source: ChoiceSource::Inline(choices),
            ..
        } = &kind
            && choices.is_empty()
        {
            return Err(AppError::Configuration(
                "select filters with inline choices require at least one choice".to_owned(),
            ));
        }

        let name = NonEmptyString::new(name)?;
        Ok(Self {
            title: NonEmptyString::new(title)?,
            target_fields: vec![name.clone()],
            name,
            kind,
        })
    }

    /// Replaces the target store field paths.
    pub fn with_target_fields(mut self, target_fields: Vec<String>) -> AppResult<Self> {
        if target_fields.is_empty() {
            return Err(AppError::Configuration(format!(
                "filter '{}' requires at least one target field",
                self.name.as_str()
            )));
        }

        self.target_fields = target_fields
            .into_iter()
            .map(NonEmptyString::new)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(self)
    }

    /// Returns the human-readable filter title.
    #[must_use]
    pub fn title(&self) -> &NonEmptyString {
        &self.title
    }

    /// Returns the filter name used as the query parameter key.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the filter kind and its options.
    #[must_use]
    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// Returns the target store field paths.
    #[must_use]
    pub fn target_fields(&self) -> &[NonEmptyString] {
        &self.target_fields
    }

    /// Returns the primary target field path.
    #[must_use]
    pub fn primary_target_field(&self) -> &str {
        self.target_fields[0].as_str()
    }
}

/// Validates that filter names are unique within one resource.
pub fn ensure_unique_filter_names(specs: &[FilterSpec]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.name().as_str().to_owned()) {
            return Err(AppError::Configuration(format!(
                "duplicate filter name '{}' in resource filter list",
                spec.name().as_str()
            )));
        }
    }

    Ok(())
}
