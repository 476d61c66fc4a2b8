//! Role record entity model.
//!
//! One row per granted role type per account. `(account_id, role_type)` is
//! unique in every store implementation.

use chrono::{DateTime, Utc};
use hearth_core::{AccountId, AccountScoped, RoleRecordId, RoleType};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A role grant for an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: RoleRecordId,
    pub account_id: AccountId,
    pub role_type: RoleType,
    pub is_verified: bool,
    /// At most one role per account is active after provisioning completes.
    pub is_active: bool,
    /// Free-form data whose shape depends on `role_type`.
    pub role_specific_data: JsonValue,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoleRecord {
    /// Read a string field out of `role_specific_data`, ignoring blanks.
    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.role_specific_data
            .get(key)
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl AccountScoped for RoleRecord {
    fn account_id(&self) -> AccountId {
        self.account_id
    }
}

/// Insert payload for `role_records`. The store generates id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoleRecord {
    pub account_id: AccountId,
    pub role_type: RoleType,
    pub is_verified: bool,
    pub is_active: bool,
    pub role_specific_data: JsonValue,
}

impl NewRoleRecord {
    /// A verified, inactive grant.
    pub fn verified(account_id: AccountId, role_type: RoleType, data: JsonValue) -> Self {
        Self {
            account_id,
            role_type,
            is_verified: true,
            is_active: false,
            role_specific_data: data,
        }
    }

    /// Set the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}
