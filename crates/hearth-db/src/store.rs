//! Store traits.
//!
//! One trait per logical table. Implementations provide per-row atomic
//! insert and update only; no operation spans more than one row, which is
//! why the provisioning engine re-reads before every write and treats
//! [`StoreErrorKind::UniqueViolation`](crate::StoreErrorKind::UniqueViolation)
//! as "already exists".

use async_trait::async_trait;
use hearth_core::{AccountId, RoleRecordId, RoleType};
use std::sync::Arc;

use crate::error::StoreResult;
use crate::models::{
    AccountNotification, AccountProfile, AdministratorProfile, NewAdministratorProfile,
    NewNotification, NewRoleRecord, RoleRecord,
};

/// Access to `role_records`.
#[async_trait]
pub trait RoleRecordStore: Send + Sync {
    /// The grant of `role_type` to `account_id`, if any.
    async fn find_role(
        &self,
        account_id: AccountId,
        role_type: RoleType,
    ) -> StoreResult<Option<RoleRecord>>;

    /// A grant by row id.
    async fn find_role_by_id(&self, id: RoleRecordId) -> StoreResult<Option<RoleRecord>>;

    /// Every grant of an account, oldest first.
    async fn list_roles(&self, account_id: AccountId) -> StoreResult<Vec<RoleRecord>>;

    /// Every grant of one role type across all accounts, oldest first.
    async fn list_roles_by_type(
        &self,
        role_type: RoleType,
        verified_only: bool,
    ) -> StoreResult<Vec<RoleRecord>>;

    /// Insert a grant. Fails with a uniqueness violation if the
    /// `(account_id, role_type)` pair is taken.
    async fn insert_role(&self, role: NewRoleRecord) -> StoreResult<RoleRecord>;

    /// Flip the active flag of one grant.
    async fn set_role_active(&self, id: RoleRecordId, active: bool) -> StoreResult<()>;
}

/// Access to `administrator_profiles`.
#[async_trait]
pub trait AdministratorProfileStore: Send + Sync {
    /// The profile of an account, if any.
    async fn find_profile(&self, account_id: AccountId)
        -> StoreResult<Option<AdministratorProfile>>;

    /// Every profile, oldest first.
    async fn list_profiles(&self) -> StoreResult<Vec<AdministratorProfile>>;

    /// Insert a profile. Fails with a uniqueness violation if the account
    /// already has one.
    async fn insert_profile(
        &self,
        profile: NewAdministratorProfile,
    ) -> StoreResult<AdministratorProfile>;
}

/// Read access to `account_profiles`.
#[async_trait]
pub trait AccountProfileStore: Send + Sync {
    /// The profile of an account, if any.
    async fn find_account(&self, account_id: AccountId) -> StoreResult<Option<AccountProfile>>;

    /// The profile registered under an email, compared case-insensitively.
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AccountProfile>>;
}

/// Write access to `account_notifications`.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<AccountNotification>;
}

/// The four stores the provisioning engine is constructed with.
///
/// Each handle can be replaced independently, which is how tests wrap a
/// single table with failure injection.
#[derive(Clone)]
pub struct Stores {
    pub roles: Arc<dyn RoleRecordStore>,
    pub administrators: Arc<dyn AdministratorProfileStore>,
    pub accounts: Arc<dyn AccountProfileStore>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    /// Use one backend for every table.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: RoleRecordStore
            + AdministratorProfileStore
            + AccountProfileStore
            + NotificationStore
            + 'static,
    {
        Self {
            roles: backend.clone(),
            administrators: backend.clone(),
            accounts: backend.clone(),
            notifications: backend,
        }
    }

    /// Replace the role record store.
    #[must_use]
    pub fn with_roles(mut self, roles: Arc<dyn RoleRecordStore>) -> Self {
        self.roles = roles;
        self
    }

    /// Replace the administrator profile store.
    #[must_use]
    pub fn with_administrators(
        mut self,
        administrators: Arc<dyn AdministratorProfileStore>,
    ) -> Self {
        self.administrators = administrators;
        self
    }

    /// Replace the account profile store.
    #[must_use]
    pub fn with_accounts(mut self, accounts: Arc<dyn AccountProfileStore>) -> Self {
        self.accounts = accounts;
        self
    }

    /// Replace the notification store.
    #[must_use]
    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationStore>) -> Self {
        self.notifications = notifications;
        self
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
