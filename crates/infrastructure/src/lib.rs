//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_search_gateway;
mod in_memory_record_store;
mod postgres_record_store;

pub use http_search_gateway::HttpSearchGateway;
pub use in_memory_record_store::InMemoryRecordStore;
pub use postgres_record_store::PostgresRecordStore;
