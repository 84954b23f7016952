use async_trait::async_trait;
use restmeta_core::{AppError, AppResult};
use restmeta_domain::ChoiceOption;
use serde_json::Value;

use crate::predicate::Predicate;

/// Limit/offset window over a filtered record listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: usize,
    offset: usize,
}

impl PageRequest {
    /// Creates a page request; the limit must be at least one.
    pub fn new(limit: usize, offset: usize) -> AppResult<Self> {
        if limit == 0 {
            return Err(AppError::Validation(
                "page limit must be at least one".to_owned(),
            ));
        }

        Ok(Self { limit, offset })
    }

    /// Returns the first page with the given limit.
    pub fn first(limit: usize) -> AppResult<Self> {
        Self::new(limit, 0)
    }

    /// Returns the maximum number of records to fetch.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of records to skip.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Requested listing order over one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Record field path to order by.
    pub field: String,
    /// Whether to sort descending.
    pub descending: bool,
}

impl SortSpec {
    /// Parses an `ordering` value; a leading `-` means descending.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_owned(),
                descending: true,
            },
            None => Self {
                field: value.to_owned(),
                descending: false,
            },
        }
    }
}

/// Store port the metadata services read records through.
///
/// Resources are addressed by name; records are JSON objects carrying
/// at least an `id` member.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Lists records of a resource matching the optional predicate, in
    /// the requested order or stable insertion order.
    async fn list(
        &self,
        resource: &str,
        predicate: Option<&Predicate>,
        order: Option<&SortSpec>,
        page: PageRequest,
    ) -> AppResult<Vec<Value>>;

    /// Finds one record by its id.
    async fn find_by_id(&self, resource: &str, id: &str) -> AppResult<Option<Value>>;

    /// Resolves a named choice enumeration, if the store defines it.
    async fn resolve_enumeration(&self, name: &str) -> AppResult<Option<Vec<ChoiceOption>>>;
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, SortSpec};

    #[test]
    fn zero_limit_is_rejected() {
        assert!(PageRequest::new(0, 0).is_err());
    }

    #[test]
    fn leading_dash_means_descending() {
        let order = SortSpec::parse("-created_at");
        assert_eq!(order.field, "created_at");
        assert!(order.descending);
        assert!(!SortSpec::parse("number").descending);
    }

    #[test]
    fn first_page_starts_at_offset_zero() {
        let page = PageRequest::first(10).unwrap_or_else(|_| unreachable!());
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 0);
    }
}
