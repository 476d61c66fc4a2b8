//! Row models for the four logical tables the engine reads and writes.

pub mod account_profile;
pub mod administrator_profile;
pub mod notification;
pub mod role_record;

pub use account_profile::AccountProfile;
pub use administrator_profile::{AdministratorProfile, NewAdministratorProfile};
pub use notification::{AccountNotification, NewNotification, NotificationKind};
pub use role_record::{NewRoleRecord, RoleRecord};

/// Logical table names, as used in logs and error reports.
pub mod tables {
    pub const ROLE_RECORDS: &str = "role_records";
    pub const ADMINISTRATOR_PROFILES: &str = "administrator_profiles";
    pub const ACCOUNT_PROFILES: &str = "account_profiles";
    pub const ACCOUNT_NOTIFICATIONS: &str = "account_notifications";
}
