//! The closed set of role types an account can hold.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Capability granted to an account.
///
/// The string form is the value stored in `role_records.role_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Private property owner ("particular").
    Particular,
    /// Member of a residents' community.
    CommunityMember,
    /// Company or professional offering home services.
    ServiceProvider,
    /// Property administrator managing communities on behalf of owners.
    PropertyAdministrator,
}

impl RoleType {
    /// All role types in declaration order.
    pub const ALL: [RoleType; 4] = [
        RoleType::Particular,
        RoleType::CommunityMember,
        RoleType::ServiceProvider,
        RoleType::PropertyAdministrator,
    ];

    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Particular => "particular",
            RoleType::CommunityMember => "community_member",
            RoleType::ServiceProvider => "service_provider",
            RoleType::PropertyAdministrator => "property_administrator",
        }
    }

    /// Human readable label used in notifications.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RoleType::Particular => "Particular",
            RoleType::CommunityMember => "Community member",
            RoleType::ServiceProvider => "Service provider",
            RoleType::PropertyAdministrator => "Property administrator",
        }
    }

    /// Whether records of this type must be mirrored in `administrator_profiles`.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        matches!(self, RoleType::PropertyAdministrator)
    }
}

impl Display for RoleType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored or supplied role type is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role type: {0}")]
pub struct UnknownRoleType(pub String);

impl FromStr for RoleType {
    type Err = UnknownRoleType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "particular" | "individual" => Ok(RoleType::Particular),
            "community_member" => Ok(RoleType::CommunityMember),
            "service_provider" => Ok(RoleType::ServiceProvider),
            "property_administrator" => Ok(RoleType::PropertyAdministrator),
            _ => Err(UnknownRoleType(s.to_string())),
        }
    }
}
