//! Provisioning result types.

use hearth_core::{RoleRecordId, RoleType};
use hearth_db::RoleRecord;
use serde::{Deserialize, Serialize};

use crate::reconciliation::SyncOneOutcome;

/// Why a role was part of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleOrigin {
    Primary,
    /// Listed explicitly in the additional roles.
    Requested,
    /// Added by an expansion rule.
    Expanded,
}

/// A role inserted by this invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRole {
    pub role: RoleRecord,
    pub origin: RoleOrigin,
    pub via_emergency: bool,
}

/// Outcome of [`RoleProvisioner::provision`](super::RoleProvisioner::provision).
///
/// `success` is lenient: it holds when at least one role exists for the
/// account afterwards. Compare `roles_created_count` with
/// `total_requested_count`, or check [`is_partial`](Self::is_partial), to
/// detect missing roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResult {
    pub success: bool,
    pub roles_created_count: usize,
    pub total_requested_count: usize,
    pub created_roles: Vec<CreatedRole>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_result: Option<SyncOneOutcome>,
    /// Role records found on the final re-read.
    pub final_role_count: usize,
    /// Requested role types absent on the final re-read.
    pub missing_roles: Vec<RoleType>,
}

impl ProvisionResult {
    /// Succeeded, but some requested roles are missing.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.success && !self.missing_roles.is_empty()
    }
}

/// Outcome of creating a single role.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOneResult {
    pub success: bool,
    pub role: Option<RoleRecord>,
    /// False when an existing record was returned instead.
    pub created: bool,
    pub error: Option<String>,
}

impl CreateOneResult {
    pub(crate) fn existing(role: RoleRecord) -> Self {
        Self {
            success: true,
            role: Some(role),
            created: false,
            error: None,
        }
    }

    pub(crate) fn created(role: RoleRecord) -> Self {
        Self {
            success: true,
            role: Some(role),
            created: true,
            error: None,
        }
    }

    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            role: None,
            created: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of the emergency creation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleRecord>,
    pub created: bool,
}

impl EmergencyResult {
    pub(crate) fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            role: None,
            created: false,
        }
    }
}

/// Outcome of [`RoleProvisioner::monitor`](super::RoleProvisioner::monitor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorResult {
    pub success: bool,
    /// Fewer roles than expected, accepted after most of the budget elapsed.
    pub partial: bool,
    pub message: String,
    pub actual_count: usize,
    pub expected_count: usize,
}

/// What the single-active-role pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActiveRoleOutcome {
    NoVerifiedRoles,
    AlreadySingle { active: RoleRecordId },
    Activated { active: RoleRecordId },
    Deactivated {
        kept: RoleRecordId,
        deactivated: Vec<RoleRecordId>,
    },
}

impl ActiveRoleOutcome {
    /// The role left active, if any.
    #[must_use]
    pub fn active_role(&self) -> Option<RoleRecordId> {
        match self {
            ActiveRoleOutcome::NoVerifiedRoles => None,
            ActiveRoleOutcome::AlreadySingle { active }
            | ActiveRoleOutcome::Activated { active } => Some(*active),
            ActiveRoleOutcome::Deactivated { kept, .. } => Some(*kept),
        }
    }
}
