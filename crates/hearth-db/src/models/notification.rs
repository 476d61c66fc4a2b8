//! Account notification entity model.

use chrono::{DateTime, Utc};
use hearth_core::{AccountId, NotificationId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// What a notification reports about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Every requested role was set up.
    RoleSetup,
    /// Some requested roles are missing.
    RoleSetupPartial,
    /// A role was created through the emergency path.
    RoleSetupEmergency,
}

impl NotificationKind {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::RoleSetup => "role_setup",
            NotificationKind::RoleSetupPartial => "role_setup_partial",
            NotificationKind::RoleSetupEmergency => "role_setup_emergency",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "role_setup" => Ok(NotificationKind::RoleSetup),
            "role_setup_partial" => Ok(NotificationKind::RoleSetupPartial),
            "role_setup_emergency" => Ok(NotificationKind::RoleSetupEmergency),
            _ => Err(format!("Unknown notification kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNotification {
    pub id: NotificationId,
    pub account_id: AccountId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for `account_notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub account_id: AccountId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}
