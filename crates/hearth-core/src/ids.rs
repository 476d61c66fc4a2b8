//! Strongly Typed Identifiers
//!
//! Newtype wrappers around [`Uuid`] for every record family the provisioning
//! engine touches. An `AccountId` cannot be handed to a function expecting a
//! `RoleRecordId`, which matters because role records and administrator
//! profiles are both keyed by account id *and* carry their own row id.
//!
//! # Example
//!
//! ```
//! use hearth_core::{AccountId, RoleRecordId};
//!
//! let account = AccountId::new();
//! let role = RoleRecordId::new();
//!
//! fn roles_for(account: AccountId) -> String {
//!     account.to_string()
//! }
//!
//! let _ = roles_for(account);
//! // roles_for(role); // does not compile
//! # let _ = role;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying UUID parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Whether this is the all-zero UUID.
            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Identifier of an authenticated account.
    ///
    /// Owned by the auth collaborator; the provisioning engine only reads it.
    AccountId
);

define_id!(
    /// Row id of a role grant in `role_records`.
    RoleRecordId
);

define_id!(
    /// Row id of a specialized record in `administrator_profiles`.
    AdministratorProfileId
);

define_id!(
    /// Row id of an entry in `account_notifications`.
    NotificationId
);
