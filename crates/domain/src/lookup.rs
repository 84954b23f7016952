use restmeta_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized `(value, label)` pair returned by autocomplete and
/// precise lookup endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    value: Value,
    label: String,
}

impl LookupResult {
    /// Creates a validated lookup result.
    pub fn new(value: Value, label: impl Into<String>) -> AppResult<Self> {
        if value.is_null() {
            return Err(AppError::Validation(
                "lookup result value must not be null".to_owned(),
            ));
        }

        Ok(Self {
            value,
            label: label.into(),
        })
    }

    /// Returns the record key the client should submit back.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::LookupResult;

    #[test]
    fn lookup_result_rejects_null_value() {
        assert!(LookupResult::new(Value::Null, "Missing").is_err());
    }

    #[test]
    fn lookup_result_keeps_value_and_label() {
        let result =
            LookupResult::new(json!(42), "Account 42").unwrap_or_else(|_| unreachable!());
        assert_eq!(result.value(), &json!(42));
        assert_eq!(result.label(), "Account 42");
    }
}
