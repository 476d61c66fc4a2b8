//! Shared helpers for hearth-provisioning integration tests.
//!
//! Hand-written store doubles wrap [`MemoryStore`] and inject failures or
//! count calls, so each test can break exactly one table.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use hearth_core::{Account, AccountId, RoleRecordId, RoleType};
use hearth_db::{
    AccountNotification, AccountProfile, AccountProfileStore, AdministratorProfile,
    AdministratorProfileStore, MemoryStore, NewAdministratorProfile, NewNotification,
    NewRoleRecord, NotificationStore, RoleRecord, RoleRecordStore, StoreError, StoreResult,
    Stores,
};
use hearth_provisioning::{ProvisioningConfig, RoleProvisioner};

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub fn account(email: &str) -> Account {
    Account::new(AccountId::new(), email)
}

pub fn transient(message: &str) -> StoreError {
    StoreError::transient("role_records", message)
}

pub fn denied() -> StoreError {
    StoreError::other(
        "role_records",
        Some("42501".to_string()),
        "permission denied for table role_records",
    )
}

fn take_hidden(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

// =============================================================================
// Role store with failure injection
// =============================================================================

/// Role store that can fail inserts, fail listings, or hide rows from
/// `find_role` to simulate a concurrent writer.
pub struct FlakyRoleStore {
    inner: Arc<MemoryStore>,
    queued_insert_failures: Mutex<VecDeque<StoreError>>,
    failing_role_types: Mutex<Vec<(RoleType, StoreError)>>,
    fail_lists: AtomicBool,
    hidden_finds: AtomicUsize,
    insert_calls: AtomicUsize,
    list_calls: AtomicUsize,
    find_calls: AtomicUsize,
    set_active_calls: AtomicUsize,
}

impl FlakyRoleStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            queued_insert_failures: Mutex::new(VecDeque::new()),
            failing_role_types: Mutex::new(Vec::new()),
            fail_lists: AtomicBool::new(false),
            hidden_finds: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            find_calls: AtomicUsize::new(0),
            set_active_calls: AtomicUsize::new(0),
        }
    }

    /// The next inserts fail with these errors, in order.
    pub fn fail_next_inserts(&self, errors: impl IntoIterator<Item = StoreError>) {
        self.queued_insert_failures.lock().unwrap().extend(errors);
    }

    /// Every insert of `role_type` fails with `error`.
    pub fn fail_inserts_of(&self, role_type: RoleType, error: StoreError) {
        self.failing_role_types
            .lock()
            .unwrap()
            .push((role_type, error));
    }

    pub fn fail_lists(&self) {
        self.fail_lists.store(true, Ordering::SeqCst);
    }

    /// The next `count` calls to `find_role` report nothing, as if a
    /// concurrent writer inserted right after the read.
    pub fn hide_next_finds(&self, count: usize) {
        self.hidden_finds.store(count, Ordering::SeqCst);
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn set_active_calls(&self) -> usize {
        self.set_active_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.insert_calls() + self.list_calls() + self.find_calls() + self.set_active_calls()
    }
}

#[async_trait]
impl RoleRecordStore for FlakyRoleStore {
    async fn find_role(
        &self,
        account_id: AccountId,
        role_type: RoleType,
    ) -> StoreResult<Option<RoleRecord>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if take_hidden(&self.hidden_finds) {
            return Ok(None);
        }
        self.inner.find_role(account_id, role_type).await
    }

    async fn find_role_by_id(&self, id: RoleRecordId) -> StoreResult<Option<RoleRecord>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_role_by_id(id).await
    }

    async fn list_roles(&self, account_id: AccountId) -> StoreResult<Vec<RoleRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(transient("connection reset by peer"));
        }
        self.inner.list_roles(account_id).await
    }

    async fn list_roles_by_type(
        &self,
        role_type: RoleType,
        verified_only: bool,
    ) -> StoreResult<Vec<RoleRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(transient("connection reset by peer"));
        }
        self.inner
            .list_roles_by_type(role_type, verified_only)
            .await
    }

    async fn insert_role(&self, role: NewRoleRecord) -> StoreResult<RoleRecord> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.queued_insert_failures.lock().unwrap().pop_front();
        if let Some(err) = queued {
            return Err(err);
        }
        let failing = self
            .failing_role_types
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| *t == role.role_type)
            .map(|(_, e)| e.clone());
        if let Some(err) = failing {
            return Err(err);
        }
        self.inner.insert_role(role).await
    }

    async fn set_role_active(&self, id: RoleRecordId, active: bool) -> StoreResult<()> {
        self.set_active_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set_role_active(id, active).await
    }
}

// =============================================================================
// Profile store with failure injection
// =============================================================================

/// Administrator profile store that can hide rows or fail inserts.
pub struct FlakyProfileStore {
    inner: Arc<MemoryStore>,
    hidden_finds: AtomicUsize,
    fail_inserts: AtomicBool,
    insert_calls: AtomicUsize,
    find_calls: AtomicUsize,
}

impl FlakyProfileStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            hidden_finds: AtomicUsize::new(0),
            fail_inserts: AtomicBool::new(false),
            insert_calls: AtomicUsize::new(0),
            find_calls: AtomicUsize::new(0),
        }
    }

    pub fn hide_next_finds(&self, count: usize) {
        self.hidden_finds.store(count, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdministratorProfileStore for FlakyProfileStore {
    async fn find_profile(
        &self,
        account_id: AccountId,
    ) -> StoreResult<Option<AdministratorProfile>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if take_hidden(&self.hidden_finds) {
            return Ok(None);
        }
        self.inner.find_profile(account_id).await
    }

    async fn list_profiles(&self) -> StoreResult<Vec<AdministratorProfile>> {
        self.inner.list_profiles().await
    }

    async fn insert_profile(
        &self,
        profile: NewAdministratorProfile,
    ) -> StoreResult<AdministratorProfile> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::other(
                "administrator_profiles",
                Some("23514".to_string()),
                "new row violates check constraint",
            ));
        }
        self.inner.insert_profile(profile).await
    }
}

// =============================================================================
// Always-failing stores
// =============================================================================

/// Account store whose lookups always fail.
#[derive(Default)]
pub struct UnavailableAccountStore {
    calls: AtomicUsize,
}

impl UnavailableAccountStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountProfileStore for UnavailableAccountStore {
    async fn find_account(&self, _account_id: AccountId) -> StoreResult<Option<AccountProfile>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::transient(
            "account_profiles",
            "network unreachable",
        ))
    }

    async fn find_account_by_email(&self, _email: &str) -> StoreResult<Option<AccountProfile>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::transient(
            "account_profiles",
            "network unreachable",
        ))
    }
}

/// Notification store that rejects every write.
#[derive(Default)]
pub struct RejectingNotificationStore {
    calls: AtomicUsize,
}

impl RejectingNotificationStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationStore for RejectingNotificationStore {
    async fn insert_notification(
        &self,
        _notification: NewNotification,
    ) -> StoreResult<AccountNotification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::other(
            "account_notifications",
            Some("42501".to_string()),
            "permission denied for table account_notifications",
        ))
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A memory store with every table routed through the flaky doubles.
pub struct Harness {
    pub memory: Arc<MemoryStore>,
    pub roles: Arc<FlakyRoleStore>,
    pub profiles: Arc<FlakyProfileStore>,
    pub stores: Stores,
}

impl Harness {
    pub fn new() -> Self {
        init_test_logging();
        let memory = Arc::new(MemoryStore::new());
        let roles = Arc::new(FlakyRoleStore::new(memory.clone()));
        let profiles = Arc::new(FlakyProfileStore::new(memory.clone()));
        let stores = Stores::from_backend(memory.clone())
            .with_roles(roles.clone())
            .with_administrators(profiles.clone());
        Self {
            memory,
            roles,
            profiles,
            stores,
        }
    }

    pub fn provisioner(&self) -> RoleProvisioner {
        RoleProvisioner::new(self.stores.clone(), ProvisioningConfig::default())
    }

    pub async fn roles_of(&self, account_id: AccountId) -> Vec<RoleRecord> {
        self.memory.list_roles(account_id).await.unwrap()
    }

    pub async fn seed_role(
        &self,
        account_id: AccountId,
        role_type: RoleType,
        active: bool,
    ) -> RoleRecord {
        self.memory
            .insert_role(
                NewRoleRecord::verified(account_id, role_type, serde_json::json!({}))
                    .with_active(active),
            )
            .await
            .unwrap()
    }

    pub async fn seed_profile(
        &self,
        account_id: AccountId,
        company_name: &str,
    ) -> AdministratorProfile {
        let slug = company_name.to_lowercase().replace(' ', "-");
        self.memory
            .insert_profile(NewAdministratorProfile {
                account_id,
                company_name: company_name.to_string(),
                company_tax_id: "B87654321".to_string(),
                contact_email: format!("{slug}@fincas.example"),
                contact_phone: Some("910000000".to_string()),
                license_number: None,
            })
            .await
            .unwrap()
    }
}
