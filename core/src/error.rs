//! Error types for the catalog API client.
//!
//! # Design
//! Outcomes are classified by status code into a closed set of variants, so
//! callers never compare message text. `Unauthorized` is shared by every item
//! operation and is what triggers the session clear. Item failures carry the
//! `Operation` that failed; its display text is the fixed, user-facing
//! message for that operation. Auth failures carry the server's own `detail`.

use std::fmt;
use std::io;

use thiserror::Error;

/// The item operations exposed by `ApiClient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListItems,
    GetItem,
    CreateItem,
    UpdateItem,
    DeleteItem,
}

impl Operation {
    /// Generic message surfaced for any non-401 failure of this operation.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::ListItems => "Failed to fetch items",
            Operation::GetItem => "Failed to fetch item",
            Operation::CreateItem => "Failed to create item",
            Operation::UpdateItem => "Failed to update item",
            Operation::DeleteItem => "Failed to delete item",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.failure_message())
    }
}

/// Errors returned by `ApiClient` parse methods and `SessionContext` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 401, or the session guard found no token.
    #[error("Unauthorized")]
    Unauthorized,

    /// The server returned 404 for an item operation.
    #[error("{operation}")]
    NotFound { operation: Operation },

    /// Any other non-2xx status from an item endpoint.
    #[error("{operation}")]
    OperationFailed { operation: Operation, status: u16 },

    /// Non-2xx from `/register` or `/login`, carrying the server's message.
    #[error("{0}")]
    ValidationFailed(String),

    /// A required field was blank; the request was never sent.
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    /// No response was received.
    #[error("request failed: {0}")]
    Transport(String),

    /// The session store could not persist or remove the token.
    #[error("session storage failed: {0}")]
    Storage(#[from] io::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// HTTP status behind the error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::NotFound { .. } => Some(404),
            ApiError::OperationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_failures_display_the_generic_message() {
        let err = ApiError::OperationFailed {
            operation: Operation::ListItems,
            status: 500,
        };
        assert_eq!(err.to_string(), "Failed to fetch items");

        let err = ApiError::NotFound {
            operation: Operation::DeleteItem,
        };
        assert_eq!(err.to_string(), "Failed to delete item");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn validation_failures_display_the_server_detail() {
        let err = ApiError::ValidationFailed("Email already registered".to_string());
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn unauthorized_is_distinguishable_without_text() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::MissingField("name").is_unauthorized());
        assert_eq!(ApiError::MissingField("name").to_string(), "name is required");
    }
}
