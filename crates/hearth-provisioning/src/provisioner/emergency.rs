//! Last-resort role creation.

use hearth_core::{Account, RoleType};
use hearth_db::{NewRoleRecord, NotificationKind};
use tracing::{error, info, instrument, warn};

use super::types::EmergencyResult;
use super::RoleProvisioner;
use crate::projection::{project, ProfileSeed};

impl RoleProvisioner {
    /// Create `role_type` through the simplified path: fresh seed, one
    /// existence check, one insert with the role active.
    ///
    /// Never fails past its boundary; every error becomes
    /// `success == false` with a message.
    #[instrument(
        skip(self, account, role_type),
        fields(account_id = %account.id, role_type = %role_type)
    )]
    pub async fn emergency_provision(
        &self,
        account: &Account,
        role_type: RoleType,
    ) -> EmergencyResult {
        let seed = match self.stores.accounts.find_account(account.id).await {
            Ok(Some(profile)) => ProfileSeed::from_account_profile(&profile),
            Ok(None) => ProfileSeed::minimal(account.email.clone()),
            Err(e) => {
                warn!(error = %e, "Account profile fetch failed, using minimal seed");
                ProfileSeed::minimal(account.email.clone())
            }
        }
        .or_email(&account.email);

        match self.stores.roles.find_role(account.id, role_type).await {
            Ok(Some(existing)) => {
                return EmergencyResult {
                    success: true,
                    message: "role already present".to_string(),
                    role: Some(existing),
                    created: false,
                };
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Emergency existence check failed, inserting anyway"),
        }

        let new_role = NewRoleRecord::verified(
            account.id,
            role_type,
            project(role_type, &seed, &self.config.default_country),
        )
        .with_active(true);

        match self.stores.roles.insert_role(new_role).await {
            Ok(role) => {
                info!(role_id = %role.id, "Role created through emergency path");
                self.notifier
                    .send(
                        account.id,
                        NotificationKind::RoleSetupEmergency,
                        "Account set up automatically",
                        format!(
                            "Your {} role was set up with minimal details. Review your profile to complete it.",
                            role_type.label().to_lowercase()
                        ),
                    )
                    .await;
                EmergencyResult {
                    success: true,
                    message: "created through emergency path".to_string(),
                    role: Some(role),
                    created: true,
                }
            }
            Err(e) if e.is_unique_violation() => {
                match self.stores.roles.find_role(account.id, role_type).await {
                    Ok(Some(existing)) => EmergencyResult {
                        success: true,
                        message: "role created concurrently".to_string(),
                        role: Some(existing),
                        created: false,
                    },
                    _ => EmergencyResult::failure(format!(
                        "{}; existing record not readable",
                        e.summary()
                    )),
                }
            }
            Err(e) => {
                error!(error = %e, "Emergency role creation failed");
                EmergencyResult::failure(format!("emergency creation failed: {}", e.summary()))
            }
        }
    }
}
