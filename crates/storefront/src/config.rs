//! Storefront configuration.
//!
//! The page script has no environment to read from, so configuration is a
//! plain value with defaults for every field. Hosts that want different
//! values pass JSON to [`StorefrontConfig::from_json`].
//!
//! # Fields
//!
//! - `storage_key` - Storage key the cart is persisted under (default: `vitrina.cart`)
//! - `card_class` - Class marking product cards in markup (default: `product-card`)
//! - `id_prefix` - Prefix for generated product ids (default: `prod-`)
//! - `toast_duration_ms` - How long a toast stays visible (default: 2500)

use chrono::TimeDelta;
use serde::Deserialize;
use thiserror::Error;
use vitrina_core::{IdGenerator, STORAGE_KEY};

/// Upper bound for `toast_duration_ms` (one hour).
const MAX_TOAST_DURATION_MS: u64 = 3_600_000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorefrontConfig {
    /// Storage key for the persisted cart
    pub storage_key: String,
    /// Class that marks a product card
    pub card_class: String,
    /// Prefix for ids generated for cards without one
    pub id_prefix: String,
    /// Toast visibility in milliseconds
    pub toast_duration_ms: u64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            card_class: "product-card".to_string(),
            id_prefix: IdGenerator::DEFAULT_PREFIX.to_string(),
            toast_duration_ms: 2500,
        }
    }
}

impl StorefrontConfig {
    /// Parse configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed, names unknown fields,
    /// or holds invalid values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("storage_key", &self.storage_key),
            ("card_class", &self.card_class),
            ("id_prefix", &self.id_prefix),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    name.to_string(),
                    "must not be empty".to_string(),
                ));
            }
        }

        if self.toast_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "toast_duration_ms".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        if self.toast_duration_ms > MAX_TOAST_DURATION_MS {
            return Err(ConfigError::Invalid(
                "toast_duration_ms".to_string(),
                format!("must be at most {MAX_TOAST_DURATION_MS}"),
            ));
        }

        Ok(())
    }

    /// Toast visibility as a duration.
    #[must_use]
    pub fn toast_duration(&self) -> TimeDelta {
        let millis = self.toast_duration_ms.min(MAX_TOAST_DURATION_MS);
        TimeDelta::milliseconds(i64::try_from(millis).unwrap_or(0))
    }
}
