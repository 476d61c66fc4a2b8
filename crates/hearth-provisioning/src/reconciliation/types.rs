//! Reconciliation report types.

use chrono::{DateTime, Utc};
use hearth_core::{AccountId, AdministratorProfileId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A store written by a reconciliation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatedStore {
    AdministratorProfiles,
    RoleRecords,
}

impl UpdatedStore {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdatedStore::AdministratorProfiles => "administrator_profiles",
            UpdatedStore::RoleRecords => "role_records",
        }
    }
}

impl Display for UpdatedStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of reconciling one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOneOutcome {
    pub success: bool,
    pub message: String,
    pub updated_stores: Vec<UpdatedStore>,
}

impl SyncOneOutcome {
    /// Nothing needed writing.
    pub fn in_sync(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            updated_stores: Vec::new(),
        }
    }

    /// One store was written.
    pub fn updated(store: UpdatedStore, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            updated_stores: vec![store],
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            updated_stores: Vec::new(),
        }
    }
}

/// Outcome of a system-wide reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAllReport {
    pub success: bool,
    /// Records written in either direction.
    pub synced_count: usize,
    /// Role records created from administrator profiles.
    pub created_in_roles: usize,
    /// Administrator profiles created from role records.
    pub created_in_profiles: usize,
    /// Accounts found already in sync, including lost insert races.
    pub already_synced: usize,
    pub errors: Vec<String>,
}

/// One administrator in the unified listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizedAdministrator {
    pub profile_id: AdministratorProfileId,
    pub account_id: AccountId,
    pub company_name: String,
    pub company_tax_id: String,
    pub contact_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// The tax id is still a generated placeholder.
    pub has_temporary_tax_id: bool,
    pub created_at: DateTime<Utc>,
}

/// Read-only administrator listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizedListing {
    pub success: bool,
    pub administrators: Vec<SynchronizedAdministrator>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<String>,
}
