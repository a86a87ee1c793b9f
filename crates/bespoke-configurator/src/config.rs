//! Engine configuration.

use crate::catalog::{Backoff, RetryPolicy};
use crate::error::ConfiguratorError;
use crate::money::Currency;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the configurator engine.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguratorConfig {
    /// Currency used when a product descriptor omits one.
    #[serde(default)]
    pub currency: Currency,

    /// Number of designs kept in the device-local library.
    #[serde(default = "default_local_capacity")]
    pub local_capacity: usize,

    /// Upper bound on waiting for the catalog during a restore.
    #[serde(default = "default_hydrate_timeout_ms")]
    pub hydrate_timeout_ms: u64,

    /// Root of convention-derived asset paths.
    #[serde(default = "default_asset_root")]
    pub asset_root: String,

    /// Categories drawn in the back view when the catalog does not say.
    #[serde(default = "default_back_visible_categories")]
    pub back_visible_categories: Vec<String>,

    /// Categories whose images are derived from fabric color and option id.
    #[serde(default = "default_convention_categories")]
    pub convention_categories: Vec<String>,

    /// Key scope of the local design library on this device.
    #[serde(default = "default_device_scope")]
    pub device_scope: String,

    /// Drop content-identical local drafts after a successful remote save.
    #[serde(default)]
    pub purge_local_on_remote_save: bool,

    /// Catalog fetch retries.
    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_local_capacity() -> usize {
    20
}

fn default_hydrate_timeout_ms() -> u64 {
    5_000
}

fn default_asset_root() -> String {
    "/assets/garments".to_string()
}

fn default_back_visible_categories() -> Vec<String> {
    ["back_pleat", "yoke", "vent", "belt"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_convention_categories() -> Vec<String> {
    ["collar", "cuff", "placket", "pocket"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_device_scope() -> String {
    "default".to_string()
}

impl Default for ConfiguratorConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            local_capacity: default_local_capacity(),
            hydrate_timeout_ms: default_hydrate_timeout_ms(),
            asset_root: default_asset_root(),
            back_visible_categories: default_back_visible_categories(),
            convention_categories: default_convention_categories(),
            device_scope: default_device_scope(),
            purge_local_on_remote_save: false,
            retry: RetrySettings::default(),
        }
    }
}

impl ConfiguratorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfiguratorError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file (`.json` or TOML).
    pub fn load(path: &str) -> Result<Self, ConfiguratorError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfiguratorError::Config(format!("{}: {}", path, e)))?;

        if path.ends_with(".json") {
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| ConfiguratorError::Config(format!("{}: {}", path, e)))?;
            config.validate()?;
            Ok(config)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Check invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfiguratorError> {
        if self.local_capacity == 0 {
            return Err(ConfiguratorError::Config(
                "local_capacity must be at least 1".to_string(),
            ));
        }
        if self.hydrate_timeout_ms == 0 {
            return Err(ConfiguratorError::Config(
                "hydrate_timeout_ms must be positive".to_string(),
            ));
        }
        if self.asset_root.trim().is_empty() {
            return Err(ConfiguratorError::Config(
                "asset_root must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Hydration bound as a duration.
    pub fn hydrate_timeout(&self) -> Duration {
        Duration::from_millis(self.hydrate_timeout_ms)
    }

    pub fn is_back_visible_by_default(&self, category: &str) -> bool {
        self.back_visible_categories.iter().any(|c| c == category)
    }

    pub fn is_convention_category(&self, category: &str) -> bool {
        self.convention_categories.iter().any(|c| c == category)
    }
}

/// Retry settings for catalog fetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay.
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Backoff ceiling.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_backoff_ms() -> u64 {
    50
}

fn default_max_backoff_ms() -> u64 {
    500
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetrySettings {
    /// Build the runtime retry policy.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Backoff::Doubling {
                first: Duration::from_millis(self.base_backoff_ms),
                ceiling: Duration::from_millis(self.max_backoff_ms),
            },
        )
    }
}
