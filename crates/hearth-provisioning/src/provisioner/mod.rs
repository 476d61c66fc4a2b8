//! Multi-role account provisioning.
//!
//! [`RoleProvisioner::provision`] turns a freshly authenticated account and
//! a set of requested role types into verified role records:
//!
//! 1. validate the account and guard against a duplicate email
//! 2. expand the request through the identity rule table
//! 3. return early when every requested role already exists
//! 4. create the primary role, then each additional role, each with
//!    retry and an emergency fallback
//! 5. leave exactly one role active
//! 6. mirror administrator roles into administrator profiles
//! 7. re-read the account's roles and report
//!
//! Store state is never cached between steps: concurrent sign-ups and
//! reconciliation passes may touch the same account at any time.

mod active;
mod create;
mod emergency;
mod monitor;
mod types;

use std::collections::HashSet;
use std::sync::Arc;

use hearth_core::{Account, HearthError, RoleType};
use hearth_db::{NotificationKind, Stores};
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, warn};

use crate::config::ProvisioningConfig;
use crate::error::ProvisioningResult;
use crate::expansion::{AdditionalRole, ExpansionRuleTable};
use crate::notify::Notifier;
use crate::projection::{overlay, project, ProfileSeed};
use crate::reconciliation::AdministratorReconciler;
use crate::retry::RetryPolicy;

pub use types::{
    ActiveRoleOutcome, CreateOneResult, CreatedRole, EmergencyResult, MonitorResult,
    ProvisionResult, RoleOrigin,
};

/// Creates role records for new accounts.
#[derive(Debug, Clone)]
pub struct RoleProvisioner {
    stores: Stores,
    reconciler: Arc<AdministratorReconciler>,
    expansion: ExpansionRuleTable,
    config: ProvisioningConfig,
    notifier: Notifier,
    retry: RetryPolicy,
}

/// Running state of one `provision` call.
struct Tally<'a> {
    account: &'a Account,
    seed: ProfileSeed,
    result: ProvisionResult,
    known_types: HashSet<RoleType>,
    found_existing: bool,
    admin_synced: bool,
}

impl RoleProvisioner {
    /// Create a provisioner with its own reconciler over the same stores
    /// and an empty expansion rule table.
    pub fn new(stores: Stores, config: ProvisioningConfig) -> Self {
        let notifier = Notifier::new(stores.notifications.clone(), config.notifications_enabled);
        Self {
            reconciler: Arc::new(AdministratorReconciler::new(stores.clone())),
            retry: config.retry_policy(),
            expansion: ExpansionRuleTable::default(),
            stores,
            config,
            notifier,
        }
    }

    #[must_use]
    pub fn with_expansion_rules(mut self, rules: ExpansionRuleTable) -> Self {
        self.expansion = rules;
        self
    }

    /// Share a reconciler with other callers.
    #[must_use]
    pub fn with_reconciler(mut self, reconciler: Arc<AdministratorReconciler>) -> Self {
        self.reconciler = reconciler;
        self
    }

    #[must_use]
    pub fn reconciler(&self) -> &Arc<AdministratorReconciler> {
        &self.reconciler
    }

    #[must_use]
    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// Provision the primary role and every additional role for `account`.
    ///
    /// Only validation and duplicate-account rejections are returned as
    /// errors, and both happen before any write. Everything else is
    /// reported in the [`ProvisionResult`].
    #[instrument(
        skip(self, account, primary, additional, seed),
        fields(account_id = %account.id, primary = %primary)
    )]
    pub async fn provision(
        &self,
        account: &Account,
        primary: RoleType,
        additional: Vec<AdditionalRole>,
        seed: &ProfileSeed,
    ) -> ProvisioningResult<ProvisionResult> {
        account.validate()?;
        self.check_duplicate_account(account).await?;

        let mut explicit: Vec<AdditionalRole> = Vec::with_capacity(additional.len());
        for role in additional {
            let duplicate = explicit.iter().any(|r| r.role_type == role.role_type);
            if role.role_type != primary && !duplicate {
                explicit.push(role);
            }
        }
        let expanded = self.expansion.expand(account, primary, &explicit);

        let requested: Vec<RoleType> = std::iter::once(primary)
            .chain(explicit.iter().map(|r| r.role_type))
            .chain(expanded.iter().map(|r| r.role_type))
            .collect();

        let mut tally = Tally {
            account,
            seed: seed.clone().or_email(&account.email),
            result: ProvisionResult {
                total_requested_count: requested.len(),
                ..ProvisionResult::default()
            },
            known_types: HashSet::new(),
            found_existing: false,
            admin_synced: false,
        };

        match self.stores.roles.list_roles(account.id).await {
            Ok(existing) => {
                tally.found_existing = !existing.is_empty();
                tally
                    .known_types
                    .extend(existing.iter().map(|r| r.role_type));
                if requested.iter().all(|t| tally.known_types.contains(t)) {
                    debug!(
                        existing = existing.len(),
                        "Every requested role already exists"
                    );
                    if tally.known_types.contains(&RoleType::PropertyAdministrator) {
                        self.sync_administrator(&mut tally).await;
                    }
                    tally.result.success = true;
                    tally.result.final_role_count = existing.len();
                    return Ok(tally.result);
                }
            }
            Err(e) => {
                warn!(error = %e, "Existing role lookup failed, creating per role");
                tally
                    .result
                    .warnings
                    .push(format!("existing role lookup failed: {}", e.summary()));
            }
        }

        self.create_with_fallback(&mut tally, primary, &JsonValue::Null, RoleOrigin::Primary)
            .await;

        let additional = explicit
            .into_iter()
            .map(|r| (r, RoleOrigin::Requested))
            .chain(expanded.into_iter().map(|r| (r, RoleOrigin::Expanded)));
        for (role, origin) in additional {
            self.create_with_fallback(&mut tally, role.role_type, &role.role_specific_data, origin)
                .await;
        }

        if tally.result.roles_created_count > 0 {
            match self.ensure_single_active_role(account.id).await {
                Ok(outcome) => debug!(?outcome, "Single active role enforced"),
                Err(e) => {
                    warn!(error = %e, "Single active role pass failed");
                    tally
                        .result
                        .warnings
                        .push(format!("active role pass failed: {e}"));
                }
            }
        }

        let created_admin = tally
            .result
            .created_roles
            .iter()
            .any(|c| c.role.role_type.is_administrator());
        if created_admin && !tally.admin_synced {
            self.sync_administrator(&mut tally).await;
        }

        self.finish(&mut tally, &requested).await;
        self.notify_outcome(&tally).await;

        info!(
            success = tally.result.success,
            created = tally.result.roles_created_count,
            requested = tally.result.total_requested_count,
            final_count = tally.result.final_role_count,
            errors = tally.result.errors.len(),
            "Provisioning finished"
        );
        Ok(tally.result)
    }

    async fn check_duplicate_account(&self, account: &Account) -> ProvisioningResult<()> {
        match self
            .stores
            .accounts
            .find_account_by_email(&account.email)
            .await
        {
            Ok(Some(existing)) if existing.id != account.id => {
                warn!(
                    existing_account_id = %existing.id,
                    "Email already registered to another account"
                );
                Err(HearthError::duplicate_account(account.email.clone()).into())
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Duplicate account lookup failed, continuing");
                Ok(())
            }
        }
    }

    async fn create_with_fallback(
        &self,
        tally: &mut Tally<'_>,
        role_type: RoleType,
        explicit_data: &JsonValue,
        origin: RoleOrigin,
    ) {
        let data = overlay(
            project(role_type, &tally.seed, &self.config.default_country),
            explicit_data,
        );
        let outcome = self
            .create_one(
                tally.account,
                role_type,
                data,
                origin == RoleOrigin::Primary,
            )
            .await;

        if let (true, Some(role)) = (outcome.success, outcome.role) {
            tally.known_types.insert(role_type);
            if outcome.created {
                tally.result.roles_created_count += 1;
                tally.result.created_roles.push(CreatedRole {
                    role,
                    origin,
                    via_emergency: false,
                });
            } else {
                tally.found_existing = true;
            }
            if role_type.is_administrator() {
                self.sync_administrator(tally).await;
            }
            return;
        }

        let error = outcome
            .error
            .unwrap_or_else(|| "role creation returned no record".to_string());
        tally.result.errors.push(format!("{role_type}: {error}"));

        let emergency = self.emergency_provision(tally.account, role_type).await;
        match (emergency.success, emergency.role) {
            (true, Some(role)) => {
                tally.known_types.insert(role_type);
                tally
                    .result
                    .warnings
                    .push(format!("{role_type}: {}", emergency.message));
                if emergency.created {
                    tally.result.roles_created_count += 1;
                    tally.result.created_roles.push(CreatedRole {
                        role,
                        origin,
                        via_emergency: true,
                    });
                } else {
                    tally.found_existing = true;
                }
            }
            _ => tally.result.errors.push(format!(
                "{role_type} emergency fallback: {}",
                emergency.message
            )),
        }
    }

    async fn sync_administrator(&self, tally: &mut Tally<'_>) {
        let outcome = self.reconciler.sync_one(tally.account.id).await;
        tally.admin_synced = true;
        if !outcome.success {
            tally
                .result
                .warnings
                .push(format!("administrator sync: {}", outcome.message));
        }
        tally.result.sync_result = Some(outcome);
    }

    /// Re-read the account's roles; that count decides success.
    ///
    /// When the re-read fails the outcome is unverified: `success` is false
    /// and `final_role_count` stays zero, while `missing_roles` is still
    /// reported from the tally.
    async fn finish(&self, tally: &mut Tally<'_>, requested: &[RoleType]) {
        let reread = self.stores.roles.list_roles(tally.account.id).await;
        let (present, verified): (HashSet<RoleType>, bool) = match reread {
            Ok(roles) => {
                tally.result.final_role_count = roles.len();
                (roles.iter().map(|r| r.role_type).collect(), true)
            }
            Err(e) => {
                warn!(error = %e, "Final role re-read failed, outcome unverified");
                tally
                    .result
                    .warnings
                    .push(format!("final role re-read failed: {}", e.summary()));
                tally.result.final_role_count = 0;
                (tally.known_types.clone(), false)
            }
        };

        tally.result.missing_roles = requested
            .iter()
            .copied()
            .filter(|t| !present.contains(t))
            .collect();
        tally.result.success = verified
            && tally.result.final_role_count >= 1
            && (tally.result.roles_created_count >= 1 || tally.found_existing);
    }

    async fn notify_outcome(&self, tally: &Tally<'_>) {
        let result = &tally.result;
        let (kind, title, message) = if !result.success {
            (
                NotificationKind::RoleSetupPartial,
                "Account setup incomplete",
                "We couldn't finish setting up your account. Please retry from your profile."
                    .to_string(),
            )
        } else if result.missing_roles.is_empty() {
            (
                NotificationKind::RoleSetup,
                "Your roles are ready",
                format!(
                    "{} of {} requested roles are configured.",
                    result.total_requested_count - result.missing_roles.len(),
                    result.total_requested_count
                ),
            )
        } else {
            let missing: Vec<&str> = result.missing_roles.iter().map(RoleType::label).collect();
            (
                NotificationKind::RoleSetupPartial,
                "Some roles need attention",
                format!(
                    "These roles could not be set up yet: {}. You can add them from your profile.",
                    missing.join(", ")
                ),
            )
        };
        self.notifier
            .send(tally.account.id, kind, title, message)
            .await;
    }
}
