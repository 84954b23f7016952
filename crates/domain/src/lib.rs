//! Domain value types and invariants for the restmeta schema engine.

#![forbid(unsafe_code)]

mod field;
mod filter;
mod form;
mod lookup;
mod overview;

pub use field::{
    ChoiceOption, FieldDescriptor, FieldKind, PrimitiveType, SerializerField, SerializerSchema,
};
pub use filter::{ChoiceSource, FilterKind, FilterSpec, ensure_unique_filter_names};
pub use form::{FormName, FormSchema};
pub use lookup::LookupResult;
pub use overview::{MetricType, OverviewMetric, StyleTag};
