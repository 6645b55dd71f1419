//! Storefront configuration
//!
//! Loaded from an optional YAML file. Every field has a default, so an empty
//! document (or no file at all) gives a working storefront.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::{orders::ORDERS_KEY, regions::Region, search_history};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse config YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Storefront Config
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorefrontConfig {
    /// Directory holding persisted collections
    pub data_dir: PathBuf,

    /// Directory rendered documents are written to
    pub output_dir: PathBuf,

    /// Merchant WhatsApp number receiving checkout confirmations
    pub merchant_whatsapp: String,

    /// Lifetime of transient notices, in milliseconds
    pub notification_ttl_ms: u64,

    /// Persisted key names
    pub keys: StorageKeys,

    /// Login and role settings
    pub identity: IdentityConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("invoices"),
            merchant_whatsapp: "6281234567890".to_string(),
            notification_ttl_ms: 2_000,
            keys: StorageKeys::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Load configuration from YAML text. Blank text gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed YAML or unknown fields.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_norway::from_str(contents)?)
    }

    /// Load from `path` when given, otherwise use the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a given file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }
}

/// Names of the persisted keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageKeys {
    /// Order collection
    pub orders: String,

    /// Goods search history
    pub goods_history: String,

    /// Venue search history
    pub venue_history: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            orders: ORDERS_KEY.to_string(),
            goods_history: search_history::GOODS_HISTORY_KEY.to_string(),
            venue_history: search_history::VENUE_HISTORY_KEY.to_string(),
        }
    }
}

/// Identity Config
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// Login names that grant the admin role, compared trimmed and case-insensitively
    pub admin_login_names: Vec<String>,

    /// Display name given to admins
    pub admin_display_name: String,

    /// Phone recorded when a login leaves it blank
    pub fallback_phone: String,

    /// Region recorded when a login leaves it out
    pub fallback_region: Region,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            admin_login_names: vec!["admin".to_string()],
            admin_display_name: "Admin Griya".to_string(),
            fallback_phone: "08123456789".to_string(),
            fallback_region: Region::Denpasar,
        }
    }
}

impl IdentityConfig {
    /// Whether a login name grants the admin role.
    pub fn is_admin_name(&self, name: &str) -> bool {
        let name = name.trim();

        self.admin_login_names
            .iter()
            .any(|admin| admin.trim().to_lowercase() == name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn blank_document_gives_defaults() -> TestResult {
        assert_eq!(StorefrontConfig::from_yaml("")?, StorefrontConfig::default());

        Ok(())
    }

    #[test]
    fn partial_document_keeps_other_defaults() -> TestResult {
        let config = StorefrontConfig::from_yaml(
            r#"
merchant_whatsapp: "6289900011122"
identity:
  admin_login_names: ["admin", "pengelola"]
"#,
        )?;

        assert_eq!(config.merchant_whatsapp, "6289900011122");
        assert_eq!(config.notification_ttl_ms, 2_000);
        assert_eq!(config.keys.orders, "griya_orders");
        assert_eq!(config.identity.admin_display_name, "Admin Griya");
        assert!(config.identity.is_admin_name(" Pengelola "));

        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = StorefrontConfig::from_yaml("merchant_phone: \"1\"");

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn loads_from_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("griya.yml");

        fs::write(&path, "notification_ttl_ms: 500\n")?;

        let config = StorefrontConfig::load(Some(path.as_path()))?;

        assert_eq!(config.notification_ttl_ms, 500);

        Ok(())
    }

    #[test]
    fn admin_names_match_trimmed_and_case_insensitive() {
        let identity = IdentityConfig::default();

        assert!(identity.is_admin_name("  ADMIN "));
        assert!(!identity.is_admin_name("administrator"));
    }
}
