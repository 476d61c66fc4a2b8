//! Error Types
//!
//! Caller-facing failures of the provisioning engine. Only problems detected
//! before any write are errors; store failures during provisioning are
//! reported inside result structs instead.
//!
//! # Example
//!
//! ```
//! use hearth_core::{HearthError, Result};
//!
//! fn require_role(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(HearthError::validation("role_type", "is required"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_role("").is_err());
//! ```

use serde::Serialize;
use thiserror::Error;

/// Standardized error type for hearth.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HearthError {
    /// Malformed input supplied by the caller. No store call was made.
    #[error("Validation error on field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// Another account already owns this email. No role was written.
    #[error("An account with email {email} already exists")]
    DuplicateAccount {
        /// The conflicting email address
        email: String,
    },
}

impl HearthError {
    /// Create a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate account error.
    pub fn duplicate_account(email: impl Into<String>) -> Self {
        Self::DuplicateAccount {
            email: email.into(),
        }
    }
}

/// Type alias for Results using `HearthError`.
pub type Result<T> = std::result::Result<T, HearthError>;
