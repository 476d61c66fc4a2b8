//! Provisioning error types.
//!
//! Only failures that stop an operation before it writes anything surface
//! here. Per-role and per-account failures are reported in result structs.

use hearth_core::HearthError;
use hearth_db::StoreError;
use thiserror::Error;

/// Errors returned by provisioning and reconciliation entry points.
#[derive(Debug, Clone, Error)]
pub enum ProvisioningError {
    /// Caller input rejected, or the email belongs to another account.
    #[error(transparent)]
    Rejected(#[from] HearthError),

    /// A store call the operation cannot proceed without failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ProvisioningError {
    /// Check if the caller may retry the same request later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ProvisioningError::Rejected(_) => false,
            ProvisioningError::Store(e) => e.is_transient(),
        }
    }

    /// Check if the request was rejected as malformed.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, ProvisioningError::Rejected(HearthError::Validation { .. }))
    }

    /// Check if the email already belongs to another account.
    #[must_use]
    pub fn is_duplicate_account(&self) -> bool {
        matches!(
            self,
            ProvisioningError::Rejected(HearthError::DuplicateAccount { .. })
        )
    }
}

/// Result type for provisioning operations.
pub type ProvisioningResult<T> = Result<T, ProvisioningError>;
