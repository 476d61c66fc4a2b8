//! Provisioning configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::expansion::ExpansionRuleTable;
use crate::retry::RetryPolicy;

/// Tunables for role provisioning and the monitor helper.
#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
    /// Total insert attempts when the store reports a transient failure.
    pub max_insert_attempts: u32,

    /// Linear backoff unit: the wait after attempt `n` is `n × retry_base_delay`.
    pub retry_base_delay: Duration,

    /// Interval between polls in [`RoleProvisioner::monitor`](crate::RoleProvisioner::monitor).
    pub monitor_poll_interval: Duration,

    /// Fraction of the monitor timeout after which a non-zero partial count
    /// is accepted as partial success.
    pub monitor_partial_ratio: f64,

    /// Country written into role data when neither the seed nor the account
    /// profile carries one.
    pub default_country: String,

    /// JSON file holding the identity expansion rule table. No rules when unset.
    pub expansion_rules_path: Option<PathBuf>,

    /// Whether best-effort account notifications are written.
    pub notifications_enabled: bool,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            max_insert_attempts: 3,
            retry_base_delay: Duration::from_millis(1000),
            monitor_poll_interval: Duration::from_millis(1000),
            monitor_partial_ratio: 0.8,
            default_country: "España".to_string(),
            expansion_rules_path: None,
            notifications_enabled: true,
        }
    }
}

impl ProvisioningConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Tests supply variables through the reader instead of mutating
    /// process-global environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let defaults = Self::default();

        let max_insert_attempts = reader("HEARTH_MAX_INSERT_ATTEMPTS")
            .unwrap_or_else(|_| defaults.max_insert_attempts.to_string())
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidValue("HEARTH_MAX_INSERT_ATTEMPTS".into(), e.to_string())
            })?;
        if max_insert_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "HEARTH_MAX_INSERT_ATTEMPTS".into(),
                "must be at least 1".into(),
            ));
        }

        let retry_base_delay = read_millis(&reader, "HEARTH_RETRY_BASE_DELAY_MS", 1000)?;
        let monitor_poll_interval = read_millis(&reader, "HEARTH_MONITOR_POLL_INTERVAL_MS", 1000)?;
        if monitor_poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "HEARTH_MONITOR_POLL_INTERVAL_MS".into(),
                "must be greater than zero".into(),
            ));
        }

        let monitor_partial_ratio = reader("HEARTH_MONITOR_PARTIAL_RATIO")
            .unwrap_or_else(|_| defaults.monitor_partial_ratio.to_string())
            .parse::<f64>()
            .map_err(|e| {
                ConfigError::InvalidValue("HEARTH_MONITOR_PARTIAL_RATIO".into(), e.to_string())
            })?;
        if !(0.0..=1.0).contains(&monitor_partial_ratio) {
            return Err(ConfigError::InvalidValue(
                "HEARTH_MONITOR_PARTIAL_RATIO".into(),
                format!("{monitor_partial_ratio} is outside 0.0..=1.0"),
            ));
        }

        let default_country = reader("HEARTH_DEFAULT_COUNTRY")
            .ok()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or(defaults.default_country);

        let expansion_rules_path = reader("HEARTH_EXPANSION_RULES")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let notifications_enabled = reader("HEARTH_NOTIFICATIONS")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|e| ConfigError::InvalidValue("HEARTH_NOTIFICATIONS".into(), e.to_string()))?;

        Ok(Self {
            max_insert_attempts,
            retry_base_delay,
            monitor_poll_interval,
            monitor_partial_ratio,
            default_country,
            expansion_rules_path,
            notifications_enabled,
        })
    }

    /// Retry policy for role inserts.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_insert_attempts, self.retry_base_delay)
    }

    /// Load the expansion rule table named by `expansion_rules_path`.
    pub fn load_expansion_rules(&self) -> Result<ExpansionRuleTable, ConfigError> {
        let Some(path) = &self.expansion_rules_path else {
            return Ok(ExpansionRuleTable::default());
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Rules(format!("cannot read {}: {e}", path.display())))?;
        ExpansionRuleTable::from_json(&raw)
            .map_err(|e| ConfigError::Rules(format!("cannot parse {}: {e}", path.display())))
    }
}

fn read_millis<F>(reader: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    reader(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("invalid expansion rules: {0}")]
    Rules(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env::VarError;

    fn make_reader(vars: HashMap<&str, &str>) -> impl Fn(&str) -> Result<String, VarError> {
        let owned: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| owned.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_defaults() {
        let config = ProvisioningConfig::from_reader(make_reader(HashMap::new())).unwrap();
        assert_eq!(config.max_insert_attempts, 3);
        assert_eq!(config.retry_base_delay, Duration::from_secs(1));
        assert_eq!(config.monitor_poll_interval, Duration::from_secs(1));
        assert!((config.monitor_partial_ratio - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.default_country, "España");
        assert!(config.expansion_rules_path.is_none());
        assert!(config.notifications_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = ProvisioningConfig::from_reader(make_reader(HashMap::from([
            ("HEARTH_MAX_INSERT_ATTEMPTS", "5"),
            ("HEARTH_RETRY_BASE_DELAY_MS", "250"),
            ("HEARTH_DEFAULT_COUNTRY", "Portugal"),
            ("HEARTH_NOTIFICATIONS", "false"),
        ])))
        .unwrap();
        assert_eq!(config.max_insert_attempts, 5);
        assert_eq!(config.retry_base_delay, Duration::from_millis(250));
        assert_eq!(config.default_country, "Portugal");
        assert!(!config.notifications_enabled);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = ProvisioningConfig::from_reader(make_reader(HashMap::from([(
            "HEARTH_MAX_INSERT_ATTEMPTS",
            "0",
        )])))
        .unwrap_err();
        assert!(err.to_string().contains("HEARTH_MAX_INSERT_ATTEMPTS"));
    }

    #[test]
    fn test_ratio_out_of_range_rejected() {
        let err = ProvisioningConfig::from_reader(make_reader(HashMap::from([(
            "HEARTH_MONITOR_PARTIAL_RATIO",
            "1.5",
        )])))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));
        assert!(err.to_string().contains("HEARTH_MONITOR_PARTIAL_RATIO"));
    }

    #[test]
    fn test_unparseable_notifications_flag_rejected() {
        let err = ProvisioningConfig::from_reader(make_reader(HashMap::from([(
            "HEARTH_NOTIFICATIONS",
            "nope",
        )])))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));
        assert!(err.to_string().contains("HEARTH_NOTIFICATIONS"));
    }

    #[test]
    fn test_unset_rules_path_yields_empty_table() {
        let table = ProvisioningConfig::default()
            .load_expansion_rules()
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_rules_file_is_reported() {
        let config = ProvisioningConfig {
            expansion_rules_path: Some(PathBuf::from("/nonexistent/hearth-rules.json")),
            ..ProvisioningConfig::default()
        };
        assert!(matches!(
            config.load_expansion_rules(),
            Err(ConfigError::Rules(_))
        ));
    }
}
