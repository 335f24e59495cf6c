//! # Error Types
//!
//! Domain-specific error types for kpr-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kpr-core errors (this file)                                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kpr-db errors (separate crate)                                        │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  kpr-api errors (in app)                                               │
//! │  └── ApiError         - What the HTTP client sees ({"erro": ...})      │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → ApiError → Frontend                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are in Portuguese because they are shown verbatim by the
//! storefront admin screens.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a request body doesn't meet requirements.
/// They are checked before any database write happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} é obrigatório")]
    Required { field: String },

    /// A required list is missing or has no elements.
    #[error("{field} deve ter pelo menos um item")]
    Empty { field: String },

    /// Field value is too short.
    #[error("{field} deve ter pelo menos {min} caracteres")]
    TooShort { field: String, min: usize },

    /// Numeric value must not be negative.
    #[error("{field} não pode ser negativo")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., a price that is not a finite number).
    #[error("{field} tem formato inválido: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("nome").to_string(), "nome é obrigatório");

        let err = ValidationError::TooShort {
            field: "senhaNova".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "senhaNova deve ter pelo menos 6 caracteres");

        let err = ValidationError::Empty {
            field: "cores".to_string(),
        };
        assert_eq!(err.to_string(), "cores deve ter pelo menos um item");
    }
}
