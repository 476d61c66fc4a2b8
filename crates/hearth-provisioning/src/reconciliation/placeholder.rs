//! Field mapping between administrator role records and profiles.
//!
//! Missing values fall back to the account profile where one was fetched,
//! then to clearly marked placeholders the administrator corrects later.

use chrono::{DateTime, Utc};
use hearth_db::{AccountProfile, AdministratorProfile, NewAdministratorProfile, RoleRecord};
use regex::Regex;
use serde_json::{json, Value as JsonValue};
use std::sync::LazyLock;

pub const PLACEHOLDER_COMPANY_NAME: &str = "Property Administration";
pub const PLACEHOLDER_CONTACT_EMAIL: &str = "contact-pending@placeholder.invalid";

static TEMPORARY_TAX_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^A\d{8}T$").expect("TEMPORARY_TAX_ID is a valid regex pattern")
});

/// `A` + last 8 digits of the millisecond timestamp + `T`.
#[must_use]
pub fn temporary_tax_id(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().rem_euclid(100_000_000);
    format!("A{millis:08}T")
}

/// Whether a tax id is a generated placeholder.
#[must_use]
pub fn is_temporary_tax_id(tax_id: &str) -> bool {
    TEMPORARY_TAX_ID.is_match(tax_id)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Profile insert payload for an administrator role lacking one.
#[must_use]
pub fn profile_from_role(
    role: &RoleRecord,
    account: Option<&AccountProfile>,
    now: DateTime<Utc>,
) -> NewAdministratorProfile {
    let company_name = non_blank(role.data_str("company_name"))
        .or_else(|| account.and_then(|a| non_blank(a.display_name())))
        .unwrap_or_else(|| PLACEHOLDER_COMPANY_NAME.to_string());
    let company_tax_id = non_blank(role.data_str("company_tax_id"))
        .unwrap_or_else(|| temporary_tax_id(now));
    let contact_email = non_blank(role.data_str("company_email"))
        .or_else(|| account.and_then(|a| non_blank(Some(a.email.as_str()))))
        .unwrap_or_else(|| PLACEHOLDER_CONTACT_EMAIL.to_string());
    let contact_phone = non_blank(role.data_str("company_phone"))
        .or_else(|| account.and_then(|a| non_blank(a.phone.as_deref())));

    NewAdministratorProfile {
        account_id: role.account_id,
        company_name,
        company_tax_id,
        contact_email,
        contact_phone,
        license_number: non_blank(role.data_str("license_number")),
    }
}

/// Role data for an administrator profile lacking a role record.
#[must_use]
pub fn role_data_from_profile(profile: &AdministratorProfile) -> JsonValue {
    json!({
        "company_name": profile.company_name,
        "company_tax_id": profile.company_tax_id,
        "company_email": profile.contact_email,
        "company_phone": profile.contact_phone.as_deref().unwrap_or_default(),
        "license_number": profile.license_number.as_deref().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hearth_core::{AccountId, RoleRecordId, RoleType};

    fn admin_role(data: JsonValue) -> RoleRecord {
        let now = Utc::now();
        RoleRecord {
            id: RoleRecordId::new(),
            account_id: AccountId::new(),
            role_type: RoleType::PropertyAdministrator,
            is_verified: true,
            is_active: false,
            role_specific_data: data,
            verified_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_temporary_tax_id_uses_last_eight_digits() {
        let at = Utc.timestamp_millis_opt(1_712_345_678_901).unwrap();
        assert_eq!(temporary_tax_id(at), "A45678901T");
        assert!(is_temporary_tax_id(&temporary_tax_id(Utc::now())));
        assert!(!is_temporary_tax_id("B12345678"));
    }

    #[test]
    fn test_role_data_wins() {
        let role = admin_role(json!({
            "company_name": "Fincas Sol",
            "company_tax_id": "B12345678",
            "company_email": "info@fincassol.es",
            "license_number": "LIC-1"
        }));
        let profile = profile_from_role(&role, None, Utc::now());
        assert_eq!(profile.company_name, "Fincas Sol");
        assert_eq!(profile.company_tax_id, "B12345678");
        assert_eq!(profile.contact_email, "info@fincassol.es");
        assert_eq!(profile.license_number.as_deref(), Some("LIC-1"));
        assert_eq!(profile.contact_phone, None);
    }

    #[test]
    fn test_account_then_placeholder_fallbacks() {
        let role = admin_role(json!({}));
        let mut account = AccountProfile::new(role.account_id, "owner@example.com");
        account.full_name = Some("Marta Ruiz".into());

        let with_account = profile_from_role(&role, Some(&account), Utc::now());
        assert_eq!(with_account.company_name, "Marta Ruiz");
        assert_eq!(with_account.contact_email, "owner@example.com");
        assert!(is_temporary_tax_id(&with_account.company_tax_id));

        let bare = profile_from_role(&role, None, Utc::now());
        assert_eq!(bare.company_name, PLACEHOLDER_COMPANY_NAME);
        assert_eq!(bare.contact_email, PLACEHOLDER_CONTACT_EMAIL);
    }
}
