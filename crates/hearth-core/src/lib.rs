//! hearth Core Library
//!
//! Shared domain types for the hearth role provisioning engine.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`AccountId`, `RoleRecordId`, ...)
//! - [`role_type`] - The closed set of role types
//! - [`account`] - Account identity and its validation
//! - [`traits`] - Account-scoped record trait
//! - [`error`] - Caller-facing error types (`HearthError`)
//!
//! # Example
//!
//! ```
//! use hearth_core::{Account, AccountId, RoleType};
//!
//! let account = Account::new(AccountId::new(), "new@example.com");
//! assert!(account.validate().is_ok());
//! assert_eq!(RoleType::Particular.as_str(), "particular");
//! ```

pub mod account;
pub mod error;
pub mod ids;
pub mod role_type;
pub mod traits;

pub use account::{validate_email, Account};
pub use error::{HearthError, Result};
pub use ids::{AccountId, AdministratorProfileId, NotificationId, ParseIdError, RoleRecordId};
pub use role_type::{RoleType, UnknownRoleType};
pub use traits::{account_ids, AccountScoped};
