//! Best-effort account notifications.

use std::sync::Arc;

use hearth_core::AccountId;
use hearth_db::{NewNotification, NotificationKind, NotificationStore};
use tracing::{debug, warn};

/// Writes provisioning outcomes to `account_notifications`.
///
/// Failures are logged and swallowed.
#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn NotificationStore>,
    enabled: bool,
}

impl Notifier {
    pub fn new(store: Arc<dyn NotificationStore>, enabled: bool) -> Self {
        Self { store, enabled }
    }

    /// Returns whether a notification row was written.
    pub async fn send(
        &self,
        account_id: AccountId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> bool {
        if !self.enabled {
            debug!(account_id = %account_id, kind = %kind, "Notifications disabled, skipping");
            return false;
        }

        let notification = NewNotification {
            account_id,
            kind,
            title: title.into(),
            message: message.into(),
        };
        match self.store.insert_notification(notification).await {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    account_id = %account_id,
                    kind = %kind,
                    error = %e,
                    "Failed to write account notification"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
