//! Single-active-role enforcement.

use hearth_core::AccountId;
use hearth_db::RoleRecord;
use tracing::{debug, info, instrument};

use super::types::ActiveRoleOutcome;
use super::RoleProvisioner;
use crate::error::ProvisioningResult;

impl RoleProvisioner {
    /// Leave exactly one of the account's roles active.
    ///
    /// Roles are ordered by creation time. With no active role the oldest
    /// verified one is activated; with several, the oldest active one is
    /// kept. An account without verified roles is left untouched.
    #[instrument(skip(self, account_id), fields(account_id = %account_id))]
    pub async fn ensure_single_active_role(
        &self,
        account_id: AccountId,
    ) -> ProvisioningResult<ActiveRoleOutcome> {
        let mut roles = self.stores.roles.list_roles(account_id).await?;
        roles.sort_by_key(|r| r.created_at);

        let active: Vec<&RoleRecord> = roles.iter().filter(|r| r.is_active).collect();
        match active.as_slice() {
            [] => {
                let Some(first) = roles.iter().find(|r| r.is_verified) else {
                    debug!("No verified roles, nothing to activate");
                    return Ok(ActiveRoleOutcome::NoVerifiedRoles);
                };
                self.stores.roles.set_role_active(first.id, true).await?;
                info!(role_id = %first.id, role_type = %first.role_type, "Activated role");
                Ok(ActiveRoleOutcome::Activated { active: first.id })
            }
            [only] => Ok(ActiveRoleOutcome::AlreadySingle { active: only.id }),
            [kept, rest @ ..] => {
                let mut deactivated = Vec::with_capacity(rest.len());
                for role in rest {
                    match self.stores.roles.set_role_active(role.id, false).await {
                        Ok(()) => deactivated.push(role.id),
                        Err(e) if e.is_not_found() => {
                            debug!(role_id = %role.id, "Role vanished before deactivation");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                info!(
                    kept = %kept.id,
                    deactivated = deactivated.len(),
                    "Deactivated surplus active roles"
                );
                Ok(ActiveRoleOutcome::Deactivated {
                    kept: kept.id,
                    deactivated,
                })
            }
        }
    }
}
