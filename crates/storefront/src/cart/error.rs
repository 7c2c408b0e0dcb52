//! Error records surfaced to cart consumers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{ApiError, CheckoutFieldError};

/// An error from the last remote cart operation.
///
/// Records stay in the cart state until explicitly cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CartError {
    /// The backend rejected an input field.
    #[error("{message}")]
    Field {
        field: Option<String>,
        message: String,
    },

    /// The request failed or returned GraphQL errors.
    #[error("{message}")]
    Remote { message: String },
}

impl CartError {
    /// The input field this error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Field { field, .. } => field.as_deref(),
            Self::Remote { .. } => None,
        }
    }
}

impl From<CheckoutFieldError> for CartError {
    fn from(error: CheckoutFieldError) -> Self {
        Self::Field {
            field: error.field,
            message: error.message,
        }
    }
}

impl From<&ApiError> for CartError {
    fn from(error: &ApiError) -> Self {
        Self::Remote {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_serializes_with_kind() {
        let error = CartError::from(CheckoutFieldError {
            field: Some("quantity".to_string()),
            message: "Insufficient stock".to_string(),
        });
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["kind"], "field");
        assert_eq!(json["field"], "quantity");
        assert_eq!(error.to_string(), "Insufficient stock");
        assert_eq!(error.field(), Some("quantity"));
    }

    #[test]
    fn test_remote_error_from_api_error() {
        let error = CartError::from(&ApiError::RateLimited(5));
        assert_eq!(error.to_string(), "Rate limited, retry after 5 seconds");
        assert!(error.field().is_none());
    }
}
