//! Role-specific data projection.
//!
//! Maps a generic identity seed onto the `role_specific_data` shape of each
//! role type. Every key is always present; missing seed values become empty
//! strings, or the configured default country.

use hearth_core::RoleType;
use hearth_db::AccountProfile;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Identity data supplied at sign-up, used to populate role data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSeed {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub company_name: String,
    pub company_address: String,
    pub company_tax_id: String,
    pub company_phone: String,
    pub company_email: String,
    pub license_number: String,
    pub community_code: String,
    pub selected_services: Vec<String>,
}

impl ProfileSeed {
    /// Seed carrying only an email.
    #[must_use]
    pub fn minimal(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Seed rebuilt from a stored account profile.
    #[must_use]
    pub fn from_account_profile(profile: &AccountProfile) -> Self {
        let field = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
        Self {
            full_name: field(&profile.full_name),
            email: profile.email.clone(),
            phone: field(&profile.phone),
            address: field(&profile.address),
            city: field(&profile.city),
            postal_code: field(&profile.postal_code),
            country: field(&profile.country),
            ..Self::default()
        }
    }

    /// Fill a blank email with `email`.
    #[must_use]
    pub fn or_email(mut self, email: &str) -> Self {
        if self.email.trim().is_empty() {
            self.email = email.to_string();
        }
        self
    }
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
        .unwrap_or_default()
}

/// Project `seed` into the data shape of `role_type`.
#[must_use]
pub fn project(role_type: RoleType, seed: &ProfileSeed, default_country: &str) -> JsonValue {
    project_with_rng(role_type, seed, default_country, &mut rand::thread_rng())
}

/// [`project`] with an explicit random source for the community code.
pub fn project_with_rng<R: Rng + ?Sized>(
    role_type: RoleType,
    seed: &ProfileSeed,
    default_country: &str,
    rng: &mut R,
) -> JsonValue {
    let country = first_non_empty(&[seed.country.as_str(), default_country]);
    let company_name = first_non_empty(&[seed.company_name.as_str(), seed.full_name.as_str()]);
    let company_address = first_non_empty(&[seed.company_address.as_str(), seed.address.as_str()]);
    let company_phone = first_non_empty(&[seed.company_phone.as_str(), seed.phone.as_str()]);
    let company_email = first_non_empty(&[seed.company_email.as_str(), seed.email.as_str()]);

    match role_type {
        RoleType::Particular => json!({
            "full_name": seed.full_name.trim(),
            "phone": seed.phone.trim(),
            "address": seed.address.trim(),
            "city": seed.city.trim(),
            "postal_code": seed.postal_code.trim(),
            "country": country,
        }),
        RoleType::CommunityMember => {
            let community_code = match seed.community_code.trim() {
                "" => generate_community_code(&seed.address, rng),
                code => code.to_string(),
            };
            json!({
                "full_name": seed.full_name.trim(),
                "phone": seed.phone.trim(),
                "community_code": community_code,
                "address": seed.address.trim(),
                "city": seed.city.trim(),
                "postal_code": seed.postal_code.trim(),
                "country": country,
            })
        }
        RoleType::ServiceProvider => json!({
            "company_name": company_name,
            "company_address": company_address,
            "company_tax_id": seed.company_tax_id.trim(),
            "company_phone": company_phone,
            "company_email": company_email,
            "selected_services": seed.selected_services,
            "city": seed.city.trim(),
            "postal_code": seed.postal_code.trim(),
            "country": country,
        }),
        RoleType::PropertyAdministrator => json!({
            "company_name": company_name,
            "company_address": company_address,
            "company_tax_id": seed.company_tax_id.trim(),
            "company_phone": company_phone,
            "company_email": company_email,
            "contact_name": seed.full_name.trim(),
            "license_number": seed.license_number.trim(),
            "city": seed.city.trim(),
            "postal_code": seed.postal_code.trim(),
            "country": country,
        }),
    }
}

/// Probably-unique community code derived from an address.
///
/// `COM-` followed by the first ten non-whitespace characters of the
/// address and a zero-padded three digit suffix, uppercased.
pub fn generate_community_code<R: Rng + ?Sized>(address: &str, rng: &mut R) -> String {
    let stem: String = address
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(10)
        .collect();
    let suffix: u16 = rng.gen_range(0..1000);
    format!("COM-{}", format!("{stem}{suffix:03}").to_uppercase())
}

/// Merge `overrides` onto `base`. Null override values are ignored.
#[must_use]
pub fn overlay(base: JsonValue, overrides: &JsonValue) -> JsonValue {
    match (base, overrides) {
        (JsonValue::Object(mut base), JsonValue::Object(extra)) => {
            for (key, value) in extra {
                if !value.is_null() {
                    base.insert(key.clone(), value.clone());
                }
            }
            JsonValue::Object(base)
        }
        (JsonValue::Null, JsonValue::Object(extra)) => JsonValue::Object(extra.clone()),
        (base, _) => base,
    }
}
