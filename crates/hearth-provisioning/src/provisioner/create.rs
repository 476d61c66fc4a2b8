//! Idempotent creation of a single role record.

use hearth_core::{Account, RoleType};
use hearth_db::{NewRoleRecord, RoleRecord};
use serde_json::Value as JsonValue;
use tracing::{debug, error, info, instrument, warn};

use super::types::CreateOneResult;
use super::RoleProvisioner;

impl RoleProvisioner {
    /// Ensure `account` holds `role_type`.
    ///
    /// Returns the existing record when one is found, either before the
    /// insert or after losing an insert race. Transient insert failures are
    /// retried with linear backoff; anything else fails immediately with
    /// the store's code and message.
    #[instrument(
        skip(self, account, data, role_type),
        fields(account_id = %account.id, role_type = %role_type)
    )]
    pub async fn create_one(
        &self,
        account: &Account,
        role_type: RoleType,
        data: JsonValue,
        is_primary: bool,
    ) -> CreateOneResult {
        match self.stores.roles.find_role(account.id, role_type).await {
            Ok(Some(existing)) => {
                debug!(role_id = %existing.id, "Role already exists");
                return CreateOneResult::existing(existing);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Pre-insert lookup failed, relying on uniqueness"),
        }

        let new_role = NewRoleRecord::verified(account.id, role_type, data).with_active(is_primary);
        let roles = &self.stores.roles;
        let new_role = &new_role;
        let inserted = self
            .retry
            .run("insert_role", move |attempt| {
                debug!(attempt, "Inserting role record");
                roles.insert_role(new_role.clone())
            })
            .await;

        match inserted {
            Ok(role) => {
                info!(role_id = %role.id, active = role.is_active, "Role record created");
                self.verify_insert(&role).await;
                CreateOneResult::created(role)
            }
            Err(e) if e.is_unique_violation() => {
                debug!("Lost insert race, reading the winning record");
                match self.stores.roles.find_role(account.id, role_type).await {
                    Ok(Some(existing)) => CreateOneResult::existing(existing),
                    Ok(None) => CreateOneResult::failure(format!(
                        "{}; record not visible on re-read",
                        e.summary()
                    )),
                    Err(read_err) => CreateOneResult::failure(format!(
                        "{}; re-read failed: {}",
                        e.summary(),
                        read_err.summary()
                    )),
                }
            }
            Err(e) => {
                error!(error = %e, "Role record creation failed");
                CreateOneResult::failure(e.summary())
            }
        }
    }

    async fn verify_insert(&self, role: &RoleRecord) {
        match self.stores.roles.find_role_by_id(role.id).await {
            Ok(Some(_)) => debug!(role_id = %role.id, "Insert verified"),
            Ok(None) => warn!(role_id = %role.id, "Inserted role not visible on read-back"),
            Err(e) => warn!(role_id = %role.id, error = %e, "Read-back of inserted role failed"),
        }
    }
}
