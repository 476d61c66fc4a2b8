//! In-process store.
//!
//! Implements every store trait over plain vectors guarded by a
//! `tokio::sync::RwLock`, enforcing the same uniqueness constraints as the
//! PostgreSQL schema. Rows keep insertion order, which doubles as creation
//! order.

use async_trait::async_trait;
use chrono::Utc;
use hearth_core::{AccountId, AdministratorProfileId, NotificationId, RoleRecordId, RoleType};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::tables::{
    ACCOUNT_NOTIFICATIONS, ACCOUNT_PROFILES, ADMINISTRATOR_PROFILES, ROLE_RECORDS,
};
use crate::models::{
    AccountNotification, AccountProfile, AdministratorProfile, NewAdministratorProfile,
    NewNotification, NewRoleRecord, RoleRecord,
};
use crate::store::{
    AccountProfileStore, AdministratorProfileStore, NotificationStore, RoleRecordStore,
};

#[derive(Debug, Default)]
struct MemoryState {
    roles: Vec<RoleRecord>,
    profiles: Vec<AdministratorProfile>,
    accounts: Vec<AccountProfile>,
    notifications: Vec<AccountNotification>,
}

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account profile. Emails are unique, case-insensitively.
    pub async fn insert_account(&self, account: AccountProfile) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let email = account.email.to_lowercase();
        if state
            .accounts
            .iter()
            .any(|a| a.id == account.id || a.email.to_lowercase() == email)
        {
            return Err(StoreError::unique_violation(
                ACCOUNT_PROFILES,
                format!(
                    "account {} or email {} already registered",
                    account.id, account.email
                ),
            ));
        }
        state.accounts.push(account);
        Ok(())
    }

    /// Snapshot of every role record.
    pub async fn all_roles(&self) -> Vec<RoleRecord> {
        self.state.read().await.roles.clone()
    }

    /// Snapshot of every administrator profile.
    pub async fn all_profiles(&self) -> Vec<AdministratorProfile> {
        self.state.read().await.profiles.clone()
    }

    /// Notifications written for an account, oldest first.
    pub async fn notifications_for(&self, account_id: AccountId) -> Vec<AccountNotification> {
        self.state
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.account_id == account_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RoleRecordStore for MemoryStore {
    async fn find_role(
        &self,
        account_id: AccountId,
        role_type: RoleType,
    ) -> StoreResult<Option<RoleRecord>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .find(|r| r.account_id == account_id && r.role_type == role_type)
            .cloned())
    }

    async fn find_role_by_id(&self, id: RoleRecordId) -> StoreResult<Option<RoleRecord>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn list_roles(&self, account_id: AccountId) -> StoreResult<Vec<RoleRecord>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn list_roles_by_type(
        &self,
        role_type: RoleType,
        verified_only: bool,
    ) -> StoreResult<Vec<RoleRecord>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .filter(|r| r.role_type == role_type && (!verified_only || r.is_verified))
            .cloned()
            .collect())
    }

    async fn insert_role(&self, role: NewRoleRecord) -> StoreResult<RoleRecord> {
        let mut state = self.state.write().await;
        if state
            .roles
            .iter()
            .any(|r| r.account_id == role.account_id && r.role_type == role.role_type)
        {
            return Err(StoreError::unique_violation(
                ROLE_RECORDS,
                format!(
                    "duplicate key value violates unique constraint \"role_records_account_id_role_type_key\" ({}, {})",
                    role.account_id, role.role_type
                ),
            ));
        }

        let now = Utc::now();
        let record = RoleRecord {
            id: RoleRecordId::new(),
            account_id: role.account_id,
            role_type: role.role_type,
            is_verified: role.is_verified,
            is_active: role.is_active,
            role_specific_data: role.role_specific_data,
            verified_at: role.is_verified.then_some(now),
            created_at: now,
            updated_at: now,
        };
        state.roles.push(record.clone());
        Ok(record)
    }

    async fn set_role_active(&self, id: RoleRecordId, active: bool) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let role = state
            .roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(ROLE_RECORDS, format!("role record {id}")))?;
        role.is_active = active;
        role.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl AdministratorProfileStore for MemoryStore {
    async fn find_profile(
        &self,
        account_id: AccountId,
    ) -> StoreResult<Option<AdministratorProfile>> {
        Ok(self
            .state
            .read()
            .await
            .profiles
            .iter()
            .find(|p| p.account_id == account_id)
            .cloned())
    }

    async fn list_profiles(&self) -> StoreResult<Vec<AdministratorProfile>> {
        Ok(self.state.read().await.profiles.clone())
    }

    async fn insert_profile(
        &self,
        profile: NewAdministratorProfile,
    ) -> StoreResult<AdministratorProfile> {
        let mut state = self.state.write().await;
        if state
            .profiles
            .iter()
            .any(|p| p.account_id == profile.account_id)
        {
            return Err(StoreError::unique_violation(
                ADMINISTRATOR_PROFILES,
                format!(
                    "duplicate key value violates unique constraint \"administrator_profiles_account_id_key\" ({})",
                    profile.account_id
                ),
            ));
        }

        let now = Utc::now();
        let record = AdministratorProfile {
            id: AdministratorProfileId::new(),
            account_id: profile.account_id,
            company_name: profile.company_name,
            company_tax_id: profile.company_tax_id,
            contact_email: profile.contact_email,
            contact_phone: profile.contact_phone,
            license_number: profile.license_number,
            created_at: now,
            updated_at: now,
        };
        state.profiles.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl AccountProfileStore for MemoryStore {
    async fn find_account(&self, account_id: AccountId) -> StoreResult<Option<AccountProfile>> {
        Ok(self
            .state
            .read()
            .await
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AccountProfile>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .state
            .read()
            .await
            .accounts
            .iter()
            .find(|a| a.email.to_lowercase() == email)
            .cloned())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<AccountNotification> {
        if notification.title.is_empty() {
            return Err(StoreError::other(
                ACCOUNT_NOTIFICATIONS,
                None,
                "notification title must not be empty",
            ));
        }

        let record = AccountNotification {
            id: NotificationId::new(),
            account_id: notification.account_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            is_read: false,
            created_at: Utc::now(),
        };
        self.state.write().await.notifications.push(record.clone());
        Ok(record)
    }
}
