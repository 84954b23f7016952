use std::sync::Arc;

use restmeta_application::{
    FilterTranslator, FormAssembler, LookupResolver, OverviewAggregator, RecordStore,
    RelationalPredicateBuilder, ResourceRegistry, TranslationMode,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Registered resources.
    pub registry: Arc<ResourceRegistry>,
    /// Record store backing every resource.
    pub store: Arc<dyn RecordStore>,
    /// Query parameter translator for the relational backend.
    pub translator: Arc<FilterTranslator<RelationalPredicateBuilder>>,
    /// Form schema assembler.
    pub assembler: FormAssembler,
    /// Autocomplete and precise lookup resolver.
    pub resolver: LookupResolver,
    /// Overview statistics aggregator.
    pub aggregator: OverviewAggregator,
}

impl AppState {
    /// Creates the state from its long-lived parts.
    #[must_use]
    pub fn new(
        registry: Arc<ResourceRegistry>,
        store: Arc<dyn RecordStore>,
        translation_mode: TranslationMode,
    ) -> Self {
        Self {
            registry,
            store,
            translator: Arc::new(FilterTranslator::new(
                RelationalPredicateBuilder,
                translation_mode,
            )),
            assembler: FormAssembler,
            resolver: LookupResolver::default(),
            aggregator: OverviewAggregator,
        }
    }
}
