//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every variant is recoverable: the ledger is left consistent after any
/// of them and the caller decides how to present it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid card number: {0}")]
    InvalidIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot transfer money to the same account")]
    SelfTransfer,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid amount error
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    /// Stable machine-readable name of the error kind, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidAmount(_) => "invalid_amount",
            Error::InvalidIdentifier(_) => "invalid_identifier",
            Error::NotFound(_) => "not_found",
            Error::SelfTransfer => "self_transfer",
            Error::InsufficientFunds => "insufficient_funds",
            Error::Persistence(_) => "persistence",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert("kind".to_string(), serde_json::Value::from(e.kind()));
                Self::fail_with_context(e.to_string(), context)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_operation_result_fail() {
        let result: OperationResult<i32> = OperationResult::fail("Something went wrong");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_from_result_carries_error_kind() {
        let ok: Result<i32> = Ok(42);
        let result: OperationResult<i32> = ok.into();
        assert!(result.success);

        let err: Result<i32> = Err(Error::InsufficientFunds);
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Insufficient funds"));
        let context = result.context.unwrap();
        assert_eq!(context["kind"], "insufficient_funds");
    }

    #[test]
    fn test_duckdb_errors_become_persistence_errors() {
        let err: Error = duckdb::Error::QueryReturnedNoRows.into();
        assert_eq!(err.kind(), "persistence");
    }
}
