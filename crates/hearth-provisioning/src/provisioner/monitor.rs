//! Polling until provisioned roles become visible.

use std::time::Duration;

use hearth_core::AccountId;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::types::MonitorResult;
use super::RoleProvisioner;

impl RoleProvisioner {
    /// Poll the account's roles until `expected` are visible or `timeout`
    /// elapses.
    ///
    /// Polls immediately, then every configured interval. Once the share of
    /// the budget given by `monitor_partial_ratio` has elapsed, any non-zero
    /// count is accepted as partial success.
    #[instrument(skip(self, account_id), fields(account_id = %account_id))]
    pub async fn monitor(
        &self,
        account_id: AccountId,
        expected: usize,
        timeout: Duration,
    ) -> MonitorResult {
        if expected == 0 {
            return MonitorResult {
                success: true,
                partial: false,
                message: "no roles expected".to_string(),
                actual_count: 0,
                expected_count: 0,
            };
        }

        let start = Instant::now();
        let partial = timeout.as_secs_f64() * self.config.monitor_partial_ratio;
        let partial_after = Duration::try_from_secs_f64(partial).unwrap_or(timeout);
        let mut actual = 0;

        loop {
            match self.stores.roles.list_roles(account_id).await {
                Ok(roles) => actual = roles.len(),
                Err(e) => warn!(error = %e, "Role poll failed"),
            }

            let elapsed = start.elapsed();
            if actual >= expected {
                debug!(
                    actual,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "All roles visible"
                );
                return MonitorResult {
                    success: true,
                    partial: false,
                    message: format!("{actual} of {expected} roles visible"),
                    actual_count: actual,
                    expected_count: expected,
                };
            }
            if actual > 0 && elapsed >= partial_after {
                return MonitorResult {
                    success: true,
                    partial: true,
                    message: format!("partial setup: {actual} of {expected} roles visible"),
                    actual_count: actual,
                    expected_count: expected,
                };
            }
            if elapsed >= timeout {
                return MonitorResult {
                    success: false,
                    partial: false,
                    message: format!(
                        "timed out after {}ms with {actual} of {expected} roles visible",
                        timeout.as_millis()
                    ),
                    actual_count: actual,
                    expected_count: expected,
                };
            }

            let remaining = timeout - elapsed;
            tokio::time::sleep(self.config.monitor_poll_interval.min(remaining)).await;
        }
    }
}
