//! Application services deriving filter metadata, form schemas,
//! lookups, and overview statistics from resource definitions.

#![forbid(unsafe_code)]

pub mod form;
pub mod lookup;
pub mod normalizer;
pub mod overview;
pub mod ports;
pub mod predicate;
pub mod registry;
pub mod translator;

pub use form::FormAssembler;
pub use lookup::{AUTOCOMPLETE_PAGE_SIZE, LookupResolver};
pub use normalizer::{humanize, normalize_field, normalize_schema};
pub use overview::{MAX_OVERVIEW_METRICS, OverviewAggregator, OverviewSource, RawMetric};
pub use ports::{PageRequest, RecordStore, SortSpec};
pub use predicate::{
    CompareOp, Predicate, PredicateBuilder, RelationalPredicateBuilder, SearchQueryBuilder,
};
pub use registry::{
    ALL_CHOICE_LABEL, ResourceConfig, ResourceDefinition, ResourceRegistry,
    resolve_select_choices,
};
pub use translator::{
    AMOUNT_RANGES_PARAM, DATE_RANGES_PARAM, FilterClause, FilterTranslator, QueryParams,
    TranslationMode,
};
