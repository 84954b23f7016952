//! HTTP handlers, grouped by concern.

pub mod filters;
pub mod forms;
pub mod lookups;
pub mod overview;
pub mod records;

#[cfg(test)]
mod tests;
