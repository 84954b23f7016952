//! Shared primitives for all Rust crates in restmeta.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across restmeta crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed resource registration or filter metadata, raised at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A precise lookup matched more than one record.
    #[error("ambiguous lookup: {0}")]
    AmbiguousLookup(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn non_empty_string_preserves_value() {
        let value = NonEmptyString::new("price").unwrap_or_else(|_| unreachable!());
        assert_eq!(value.as_str(), "price");
    }

    #[test]
    fn ambiguous_lookup_is_distinct_from_not_found() {
        let ambiguous = AppError::AmbiguousLookup("two matches".to_owned()).to_string();
        let missing = AppError::NotFound("no match".to_owned()).to_string();
        assert!(ambiguous.starts_with("ambiguous lookup"));
        assert!(missing.starts_with("not found"));
    }
}
