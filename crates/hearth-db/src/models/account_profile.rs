//! Account profile entity model.
//!
//! Owned by the surrounding account flow; read-only here.

use chrono::{DateTime, Utc};
use hearth_core::{AccountId, AccountScoped};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: AccountId,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AccountProfile {
    /// A profile with only the required fields set.
    pub fn new(id: AccountId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            full_name: None,
            phone: None,
            address: None,
            city: None,
            postal_code: None,
            country: None,
            created_at: Utc::now(),
        }
    }

    /// Name to show in listings, when one is set.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl AccountScoped for AccountProfile {
    fn account_id(&self) -> AccountId {
        self.id
    }
}
