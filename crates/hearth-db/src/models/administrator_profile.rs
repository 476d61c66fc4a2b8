//! Administrator profile entity model.
//!
//! Business details for accounts holding the property administrator role.
//! `account_id` is unique.

use chrono::{DateTime, Utc};
use hearth_core::{AccountId, AccountScoped, AdministratorProfileId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministratorProfile {
    pub id: AdministratorProfileId,
    pub account_id: AccountId,
    pub company_name: String,
    pub company_tax_id: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub license_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountScoped for AdministratorProfile {
    fn account_id(&self) -> AccountId {
        self.account_id
    }
}

/// Insert payload for `administrator_profiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAdministratorProfile {
    pub account_id: AccountId,
    pub company_name: String,
    pub company_tax_id: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub license_number: Option<String>,
}
