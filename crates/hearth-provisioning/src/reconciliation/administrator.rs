//! Administrator role ↔ profile reconciler.

use std::collections::HashSet;

use chrono::Utc;
use hearth_core::{account_ids, AccountId, RoleType};
use hearth_db::{AdministratorProfile, NewRoleRecord, RoleRecord, StoreError, Stores};
use tracing::{debug, error, info, instrument, warn};

use super::placeholder::{is_temporary_tax_id, profile_from_role, role_data_from_profile};
use super::types::{
    SyncAllReport, SyncOneOutcome, SynchronizedAdministrator, SynchronizedListing, UpdatedStore,
};

/// Keeps administrator role records and administrator profiles in agreement.
///
/// Every write is preceded by a fresh existence check, and a uniqueness
/// violation on insert counts as "already synced": two reconcilers racing
/// on the same account both end up reporting success.
#[derive(Debug, Clone)]
pub struct AdministratorReconciler {
    stores: Stores,
}

enum InsertOutcome {
    Created,
    AlreadyPresent,
}

impl AdministratorReconciler {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Reconcile a single account.
    ///
    /// Looks up the role and profile concurrently, then at most re-checks
    /// and inserts once. Never returns an error; failures are reported in
    /// the outcome.
    #[instrument(skip(self, account_id), fields(account_id = %account_id))]
    pub async fn sync_one(&self, account_id: AccountId) -> SyncOneOutcome {
        let (role, profile) = tokio::join!(
            self.stores
                .roles
                .find_role(account_id, RoleType::PropertyAdministrator),
            self.stores.administrators.find_profile(account_id),
        );

        let role = match role {
            Ok(role) => role,
            Err(e) => {
                warn!(error = %e, "Administrator role lookup failed");
                return SyncOneOutcome::failure(format!("role lookup failed: {}", e.summary()));
            }
        };
        let profile = match profile {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Administrator profile lookup failed");
                return SyncOneOutcome::failure(format!("profile lookup failed: {}", e.summary()));
            }
        };

        match (role, profile) {
            (Some(r), None) if r.is_verified => match self.create_profile(&r, false).await {
                Ok(InsertOutcome::Created) => SyncOneOutcome::updated(
                    UpdatedStore::AdministratorProfiles,
                    "administrator profile created from role record",
                ),
                Ok(InsertOutcome::AlreadyPresent) => {
                    SyncOneOutcome::in_sync("administrator profile already present")
                }
                Err(e) => SyncOneOutcome::failure(format!(
                    "failed to create administrator profile: {}",
                    e.summary()
                )),
            },
            (Some(_), None) => {
                debug!("Administrator role not verified, nothing to mirror");
                SyncOneOutcome::in_sync("administrator role not verified")
            }
            (None, Some(profile)) => match self.create_role(&profile).await {
                Ok(InsertOutcome::Created) => SyncOneOutcome::updated(
                    UpdatedStore::RoleRecords,
                    "administrator role created from profile",
                ),
                Ok(InsertOutcome::AlreadyPresent) => {
                    SyncOneOutcome::in_sync("administrator role already present")
                }
                Err(e) => SyncOneOutcome::failure(format!(
                    "failed to create administrator role: {}",
                    e.summary()
                )),
            },
            (Some(_), Some(_)) => SyncOneOutcome::in_sync("administrator already in sync"),
            (None, None) => SyncOneOutcome::in_sync("account is not an administrator"),
        }
    }

    /// Reconcile every administrator in both directions.
    #[instrument(skip(self))]
    pub async fn sync_all(&self) -> SyncAllReport {
        let mut report = SyncAllReport::default();

        let roles = match self
            .stores
            .roles
            .list_roles_by_type(RoleType::PropertyAdministrator, true)
            .await
        {
            Ok(roles) => roles,
            Err(e) => {
                error!(error = %e, "Failed to list administrator roles");
                let summary = e.summary();
                report.errors.push(format!("listing roles: {summary}"));
                return report;
            }
        };
        let profiles = match self.stores.administrators.list_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                error!(error = %e, "Failed to list administrator profiles");
                let summary = e.summary();
                report.errors.push(format!("listing profiles: {summary}"));
                return report;
            }
        };

        let initially_empty = roles.is_empty() && profiles.is_empty();
        let role_accounts = account_ids(&roles);
        let profile_accounts = account_ids(&profiles);
        report.already_synced = role_accounts.intersection(&profile_accounts).count();

        // Role → profile.
        let mut seen = HashSet::new();
        for role in roles
            .iter()
            .filter(|r| !profile_accounts.contains(&r.account_id))
        {
            if !seen.insert(role.account_id) {
                continue;
            }
            match self.create_profile(role, true).await {
                Ok(InsertOutcome::Created) => report.created_in_profiles += 1,
                Ok(InsertOutcome::AlreadyPresent) => report.already_synced += 1,
                Err(e) => report.errors.push(format!(
                    "profile for account {}: {}",
                    role.account_id,
                    e.summary()
                )),
            }
        }

        // Profile → role.
        seen.clear();
        for profile in profiles
            .iter()
            .filter(|p| !role_accounts.contains(&p.account_id))
        {
            if !seen.insert(profile.account_id) {
                continue;
            }
            match self.create_role(profile).await {
                Ok(InsertOutcome::Created) => report.created_in_roles += 1,
                Ok(InsertOutcome::AlreadyPresent) => report.already_synced += 1,
                Err(e) => report.errors.push(format!(
                    "role for account {}: {}",
                    profile.account_id,
                    e.summary()
                )),
            }
        }

        report.synced_count = report.created_in_profiles + report.created_in_roles;
        report.success = initially_empty || self.both_stores_populated(&mut report.errors).await;

        info!(
            success = report.success,
            created_in_profiles = report.created_in_profiles,
            created_in_roles = report.created_in_roles,
            already_synced = report.already_synced,
            errors = report.errors.len(),
            "Administrator reconciliation finished"
        );
        report
    }

    /// Unified administrator listing, sourced from profiles and enriched with
    /// account details where available. Never writes.
    #[instrument(skip(self))]
    pub async fn list_synchronized(&self) -> SynchronizedListing {
        let profiles = match self.stores.administrators.list_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                error!(error = %e, "Failed to list administrator profiles");
                return SynchronizedListing {
                    success: false,
                    administrators: Vec::new(),
                    errors: vec![e.summary()],
                };
            }
        };

        let mut seen = HashSet::new();
        let mut administrators = Vec::with_capacity(profiles.len());
        for profile in profiles {
            if !seen.insert(profile.account_id) {
                continue;
            }
            administrators.push(self.enrich(profile).await);
        }

        SynchronizedListing {
            success: true,
            administrators,
            errors: Vec::new(),
        }
    }

    async fn enrich(&self, profile: AdministratorProfile) -> SynchronizedAdministrator {
        let account = match self.stores.accounts.find_account(profile.account_id).await {
            Ok(account) => account,
            Err(e) => {
                warn!(
                    account_id = %profile.account_id,
                    error = %e,
                    "Account lookup failed, using profile fields"
                );
                None
            }
        };

        let display_name = account
            .as_ref()
            .and_then(|a| a.display_name())
            .unwrap_or(&profile.company_name)
            .to_string();
        let email = account
            .as_ref()
            .map_or_else(|| profile.contact_email.clone(), |a| a.email.clone());
        let phone = account
            .as_ref()
            .and_then(|a| a.phone.clone())
            .or_else(|| profile.contact_phone.clone());

        SynchronizedAdministrator {
            profile_id: profile.id,
            account_id: profile.account_id,
            has_temporary_tax_id: is_temporary_tax_id(&profile.company_tax_id),
            company_name: profile.company_name,
            company_tax_id: profile.company_tax_id,
            contact_email: profile.contact_email,
            contact_phone: profile.contact_phone,
            license_number: profile.license_number,
            display_name,
            email,
            phone,
            created_at: profile.created_at,
        }
    }

    /// `lookup_account` enables account-profile fallbacks at the cost of one
    /// more round trip.
    async fn create_profile(
        &self,
        role: &RoleRecord,
        lookup_account: bool,
    ) -> Result<InsertOutcome, StoreError> {
        let account_id = role.account_id;
        if self
            .stores
            .administrators
            .find_profile(account_id)
            .await?
            .is_some()
        {
            debug!(account_id = %account_id, "Profile appeared before insert");
            return Ok(InsertOutcome::AlreadyPresent);
        }

        let account = if lookup_account {
            match self.stores.accounts.find_account(account_id).await {
                Ok(account) => account,
                Err(e) => {
                    warn!(
                        account_id = %account_id,
                        error = %e,
                        "Account lookup failed, using placeholders"
                    );
                    None
                }
            }
        } else {
            None
        };

        let new_profile = profile_from_role(role, account.as_ref(), Utc::now());
        match self.stores.administrators.insert_profile(new_profile).await {
            Ok(profile) => {
                info!(
                    account_id = %account_id,
                    profile_id = %profile.id,
                    temporary_tax_id = is_temporary_tax_id(&profile.company_tax_id),
                    "Administrator profile created"
                );
                Ok(InsertOutcome::Created)
            }
            Err(e) if e.is_unique_violation() => {
                debug!(account_id = %account_id, "Lost profile insert race, already synced");
                Ok(InsertOutcome::AlreadyPresent)
            }
            Err(e) => {
                error!(
                    account_id = %account_id,
                    error = %e,
                    "Failed to create administrator profile"
                );
                Err(e)
            }
        }
    }

    async fn create_role(
        &self,
        profile: &AdministratorProfile,
    ) -> Result<InsertOutcome, StoreError> {
        let account_id = profile.account_id;
        if self
            .stores
            .roles
            .find_role(account_id, RoleType::PropertyAdministrator)
            .await?
            .is_some()
        {
            debug!(account_id = %account_id, "Role appeared before insert");
            return Ok(InsertOutcome::AlreadyPresent);
        }

        // Mirrored roles never become active on their own.
        let new_role = NewRoleRecord::verified(
            account_id,
            RoleType::PropertyAdministrator,
            role_data_from_profile(profile),
        )
        .with_active(false);

        match self.stores.roles.insert_role(new_role).await {
            Ok(role) => {
                info!(
                    account_id = %account_id,
                    role_id = %role.id,
                    "Administrator role created from profile"
                );
                Ok(InsertOutcome::Created)
            }
            Err(e) if e.is_unique_violation() => {
                debug!(account_id = %account_id, "Lost role insert race, already synced");
                Ok(InsertOutcome::AlreadyPresent)
            }
            Err(e) => {
                error!(account_id = %account_id, error = %e, "Failed to create administrator role");
                Err(e)
            }
        }
    }

    async fn both_stores_populated(&self, errors: &mut Vec<String>) -> bool {
        let (roles, profiles) = tokio::join!(
            self.stores
                .roles
                .list_roles_by_type(RoleType::PropertyAdministrator, true),
            self.stores.administrators.list_profiles(),
        );
        match (roles, profiles) {
            (Ok(roles), Ok(profiles)) => !roles.is_empty() && !profiles.is_empty(),
            (Err(e), _) | (_, Err(e)) => {
                errors.push(format!("final count: {}", e.summary()));
                false
            }
        }
    }
}
