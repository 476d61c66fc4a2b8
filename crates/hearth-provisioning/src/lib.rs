//! Role provisioning and administrator reconciliation for hearth.
//!
//! Two components share the stores from `hearth-db`:
//!
//! - [`RoleProvisioner`] creates one verified role record per requested role
//!   type for a new account, retries transient failures, falls back to an
//!   emergency path, and leaves exactly one role active.
//! - [`AdministratorReconciler`] keeps administrator role records and
//!   administrator profiles in agreement in both directions.
//!
//! Neither holds authoritative state. Every operation re-reads before it
//! writes and treats uniqueness violations as "already done".
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hearth_core::{Account, RoleType};
//! use hearth_db::{MemoryStore, Stores};
//! use hearth_provisioning::{ProfileSeed, ProvisioningConfig, RoleProvisioner};
//!
//! let stores = Stores::from_backend(Arc::new(MemoryStore::new()));
//! let provisioner = RoleProvisioner::new(stores, ProvisioningConfig::default());
//! let account = Account::parse("8f0c5a4e-1b7d-4c1e-9a55-3f1b2c3d4e5f", "new@example.com")?;
//! let result = provisioner
//!     .provision(&account, RoleType::Particular, vec![], &ProfileSeed::default())
//!     .await?;
//! assert!(result.success);
//! ```

pub mod config;
pub mod error;
pub mod expansion;
pub mod notify;
pub mod projection;
pub mod provisioner;
pub mod reconciliation;
pub mod retry;

pub use config::{ConfigError, ProvisioningConfig};
pub use error::{ProvisioningError, ProvisioningResult};
pub use expansion::{
    AdditionalRole, ExpansionGrant, ExpansionRule, ExpansionRuleTable, IdentityMatcher,
};
pub use notify::Notifier;
pub use projection::{generate_community_code, project, ProfileSeed};
pub use provisioner::{
    ActiveRoleOutcome, CreateOneResult, CreatedRole, EmergencyResult, MonitorResult,
    ProvisionResult, RoleOrigin, RoleProvisioner,
};
pub use reconciliation::{
    is_temporary_tax_id, temporary_tax_id, AdministratorReconciler, SyncAllReport, SyncOneOutcome,
    SynchronizedAdministrator, SynchronizedListing, UpdatedStore, PLACEHOLDER_COMPANY_NAME,
    PLACEHOLDER_CONTACT_EMAIL,
};
pub use retry::RetryPolicy;
