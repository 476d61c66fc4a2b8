//! AdministratorReconciler tests
//!
//! `sync_one`, `sync_all` and `list_synchronized` against the in-memory
//! store, including lost insert races and failing account lookups.

mod common;

use std::sync::Arc;

use hearth_core::{AccountId, RoleType};
use hearth_db::{AccountProfile, NewRoleRecord, RoleRecordStore};
use hearth_provisioning::{AdministratorReconciler, UpdatedStore, PLACEHOLDER_COMPANY_NAME};
use regex::Regex;
use serde_json::json;

use common::{Harness, UnavailableAccountStore};

fn reconciler(h: &Harness) -> AdministratorReconciler {
    AdministratorReconciler::new(h.stores.clone())
}

// =============================================================================
// sync_one
// =============================================================================

#[tokio::test]
async fn test_sync_one_creates_missing_profile_with_placeholder_tax_id() {
    let h = Harness::new();
    let accounts = Arc::new(UnavailableAccountStore::default());
    let rec = AdministratorReconciler::new(h.stores.clone().with_accounts(accounts.clone()));
    let account_id = AccountId::new();
    h.seed_role(account_id, RoleType::PropertyAdministrator, true)
        .await;

    let outcome = rec.sync_one(account_id).await;

    assert!(outcome.success);
    assert_eq!(
        outcome.updated_stores,
        vec![UpdatedStore::AdministratorProfiles]
    );

    let profiles = h.memory.all_profiles().await;
    assert_eq!(profiles.len(), 1);
    let temporary = Regex::new(r"^A\d{8}T$").unwrap();
    assert!(temporary.is_match(&profiles[0].company_tax_id));
    assert_eq!(profiles[0].company_name, PLACEHOLDER_COMPANY_NAME);

    assert_eq!(h.roles.find_calls(), 1);
    assert_eq!(h.profiles.find_calls(), 2);
    assert_eq!(h.profiles.insert_calls(), 1);
    assert_eq!(accounts.calls(), 0);
}

#[tokio::test]
async fn test_sync_one_creates_inactive_role_from_profile() {
    let h = Harness::new();
    let account_id = AccountId::new();
    let profile = h.seed_profile(account_id, "Fincas Centro").await;

    let outcome = reconciler(&h).sync_one(account_id).await;

    assert!(outcome.success);
    assert_eq!(outcome.updated_stores, vec![UpdatedStore::RoleRecords]);

    let role = h
        .memory
        .find_role(account_id, RoleType::PropertyAdministrator)
        .await
        .unwrap()
        .unwrap();
    assert!(role.is_verified);
    assert!(!role.is_active);
    assert_eq!(role.role_specific_data["company_name"], "Fincas Centro");
    assert_eq!(
        role.role_specific_data["company_tax_id"],
        profile.company_tax_id
    );
    assert_eq!(
        role.role_specific_data["company_email"],
        profile.contact_email
    );
}

#[tokio::test]
async fn test_sync_one_noop_when_both_or_neither_exist() {
    let h = Harness::new();
    let synced = AccountId::new();
    h.seed_role(synced, RoleType::PropertyAdministrator, true)
        .await;
    h.seed_profile(synced, "Fincas Sur").await;
    let rec = reconciler(&h);

    let both = rec.sync_one(synced).await;
    let neither = rec.sync_one(AccountId::new()).await;

    assert!(both.success && neither.success);
    assert!(both.updated_stores.is_empty());
    assert!(neither.updated_stores.is_empty());
    assert_eq!(h.profiles.insert_calls(), 0);
    assert_eq!(h.roles.insert_calls(), 0);
}

#[tokio::test]
async fn test_sync_one_ignores_unverified_role() {
    let h = Harness::new();
    let account_id = AccountId::new();
    h.memory
        .insert_role(NewRoleRecord {
            account_id,
            role_type: RoleType::PropertyAdministrator,
            is_verified: false,
            is_active: false,
            role_specific_data: json!({}),
        })
        .await
        .unwrap();

    let outcome = reconciler(&h).sync_one(account_id).await;

    assert!(outcome.success);
    assert!(outcome.updated_stores.is_empty());
    assert!(h.memory.all_profiles().await.is_empty());
}

#[tokio::test]
async fn test_sync_one_lost_race_is_benign() {
    let h = Harness::new();
    let account_id = AccountId::new();
    h.seed_role(account_id, RoleType::PropertyAdministrator, true)
        .await;
    h.seed_profile(account_id, "Fincas Este").await;
    h.profiles.hide_next_finds(2);

    let outcome = reconciler(&h).sync_one(account_id).await;

    assert!(outcome.success);
    assert!(outcome.updated_stores.is_empty());
    assert_eq!(h.profiles.insert_calls(), 1);
    assert_eq!(h.memory.all_profiles().await.len(), 1);
}

#[tokio::test]
async fn test_sync_one_reports_insert_failure() {
    let h = Harness::new();
    let account_id = AccountId::new();
    h.seed_role(account_id, RoleType::PropertyAdministrator, true)
        .await;
    h.profiles.fail_inserts();

    let outcome = reconciler(&h).sync_one(account_id).await;

    assert!(!outcome.success);
    assert!(outcome.message.contains("23514"));
}

// =============================================================================
// sync_all
// =============================================================================

#[tokio::test]
async fn test_sync_all_converges_and_is_idempotent() {
    let h = Harness::new();
    let role_only = AccountId::new();
    let profile_only = AccountId::new();
    let both = AccountId::new();

    let mut owner = AccountProfile::new(role_only, "marta@example.com");
    owner.full_name = Some("Marta Ruiz".into());
    h.memory.insert_account(owner).await.unwrap();

    h.seed_role(role_only, RoleType::PropertyAdministrator, true)
        .await;
    h.seed_profile(profile_only, "Fincas Oeste").await;
    h.seed_role(both, RoleType::PropertyAdministrator, false)
        .await;
    h.seed_profile(both, "Fincas Mar").await;
    let rec = reconciler(&h);

    let first = rec.sync_all().await;
    assert!(first.success);
    assert_eq!(first.created_in_profiles, 1);
    assert_eq!(first.created_in_roles, 1);
    assert_eq!(first.synced_count, 2);
    assert_eq!(first.already_synced, 1);
    assert!(first.errors.is_empty());

    let created = h
        .memory
        .all_profiles()
        .await
        .into_iter()
        .find(|p| p.account_id == role_only)
        .unwrap();
    assert_eq!(created.company_name, "Marta Ruiz");
    assert_eq!(created.contact_email, "marta@example.com");

    let mirrored = h
        .memory
        .find_role(profile_only, RoleType::PropertyAdministrator)
        .await
        .unwrap()
        .unwrap();
    assert!(!mirrored.is_active);

    let second = rec.sync_all().await;
    assert!(second.success);
    assert_eq!(second.synced_count, 0);
    assert_eq!(second.already_synced, 3);
}

#[tokio::test]
async fn test_sync_all_on_empty_system_succeeds() {
    let h = Harness::new();

    let report = reconciler(&h).sync_all().await;

    assert!(report.success);
    assert_eq!(report.synced_count, 0);
}

#[tokio::test]
async fn test_sync_all_tolerates_account_lookup_failure() {
    let h = Harness::new();
    let stores = h
        .stores
        .clone()
        .with_accounts(Arc::new(UnavailableAccountStore::default()));
    let account_id = AccountId::new();
    h.seed_role(account_id, RoleType::PropertyAdministrator, true)
        .await;

    let report = AdministratorReconciler::new(stores).sync_all().await;

    assert!(report.success);
    assert_eq!(report.created_in_profiles, 1);
    assert_eq!(
        h.memory.all_profiles().await[0].company_name,
        PLACEHOLDER_COMPANY_NAME
    );
}

#[tokio::test]
async fn test_sync_all_failed_insert_counts_as_error() {
    let h = Harness::new();
    h.seed_role(AccountId::new(), RoleType::PropertyAdministrator, true)
        .await;
    h.profiles.fail_inserts();

    let report = reconciler(&h).sync_all().await;

    assert!(!report.success);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.created_in_profiles, 0);
}

#[tokio::test]
async fn test_sync_all_listing_failure_aborts() {
    let h = Harness::new();
    h.roles.fail_lists();

    let report = reconciler(&h).sync_all().await;

    assert!(!report.success);
    assert_eq!(report.errors.len(), 1);
}

#[tokio::test]
async fn test_concurrent_sync_all_creates_one_profile() {
    let h = Harness::new();
    let account_id = AccountId::new();
    h.seed_role(account_id, RoleType::PropertyAdministrator, true)
        .await;
    let rec = reconciler(&h);

    let (a, b) = tokio::join!(rec.sync_all(), rec.sync_all());

    assert!(a.success && b.success);
    assert_eq!(a.created_in_profiles + b.created_in_profiles, 1);
    assert_eq!(h.memory.all_profiles().await.len(), 1);
}

// =============================================================================
// list_synchronized
// =============================================================================

#[tokio::test]
async fn test_listing_enriches_from_accounts_with_fallbacks() {
    let h = Harness::new();
    let known = AccountId::new();
    let unknown = AccountId::new();

    let mut profile = AccountProfile::new(known, "lucia@example.com");
    profile.full_name = Some("Lucia Romero".into());
    profile.phone = Some("600123123".into());
    h.memory.insert_account(profile).await.unwrap();
    h.seed_profile(known, "Fincas Lucia").await;
    let bare = h.seed_profile(unknown, "Fincas Anon").await;

    let listing = reconciler(&h).list_synchronized().await;

    assert!(listing.success);
    assert_eq!(listing.administrators.len(), 2);

    let lucia = listing
        .administrators
        .iter()
        .find(|a| a.account_id == known)
        .unwrap();
    assert_eq!(lucia.display_name, "Lucia Romero");
    assert_eq!(lucia.email, "lucia@example.com");
    assert_eq!(lucia.phone.as_deref(), Some("600123123"));
    assert!(!lucia.has_temporary_tax_id);

    let anon = listing
        .administrators
        .iter()
        .find(|a| a.account_id == unknown)
        .unwrap();
    assert_eq!(anon.display_name, "Fincas Anon");
    assert_eq!(anon.email, bare.contact_email);
    assert_eq!(anon.phone, bare.contact_phone);
}

#[tokio::test]
async fn test_listing_survives_account_store_outage() {
    let h = Harness::new();
    let account_id = AccountId::new();
    h.seed_role(account_id, RoleType::PropertyAdministrator, true)
        .await;
    let rec = reconciler(&h);
    rec.sync_one(account_id).await;

    let stores = h
        .stores
        .clone()
        .with_accounts(Arc::new(UnavailableAccountStore::default()));
    let listing = AdministratorReconciler::new(stores)
        .list_synchronized()
        .await;

    assert!(listing.success);
    assert_eq!(listing.administrators.len(), 1);
    assert!(listing.administrators[0].has_temporary_tax_id);
    assert_eq!(
        listing.administrators[0].display_name,
        PLACEHOLDER_COMPANY_NAME
    );
}

#[tokio::test]
async fn test_listing_never_writes() {
    let h = Harness::new();
    h.seed_role(AccountId::new(), RoleType::PropertyAdministrator, true)
        .await;

    let listing = reconciler(&h).list_synchronized().await;

    assert!(listing.administrators.is_empty());
    assert_eq!(h.profiles.insert_calls(), 0);
    assert_eq!(h.roles.insert_calls(), 0);
}
