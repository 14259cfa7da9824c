//! Configuration management for eventpass.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "eventpass";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "eventpass.db";

/// Default catalog file name.
const CATALOG_FILE_NAME: &str = "events_data.json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `EVENTPASS_`)
/// 2. TOML config file at `~/.config/eventpass/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Event catalog configuration.
    pub catalog: CatalogConfig,
    /// Registration form configuration.
    pub registration: RegistrationConfig,
    /// QR rendering configuration.
    pub qr: QrConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/eventpass/eventpass.db`
    pub database_path: Option<PathBuf>,
}

/// Catalog-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the bundled `events_data.json`.
    /// Defaults to `~/.local/share/eventpass/events_data.json`
    pub path: Option<PathBuf>,
}

/// Bounds applied to the registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Minimum number of digits in a phone number.
    pub min_phone_digits: usize,
    /// Maximum number of digits in a phone number.
    pub max_phone_digits: usize,
}

/// QR rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    /// Target edge length of rendered images in pixels.
    pub size_px: u32,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            min_phone_digits: 10,
            max_phone_digits: 12,
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self { size_px: 400 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `EVENTPASS_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("EVENTPASS_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let registration = &self.registration;
        if registration.min_phone_digits == 0 {
            return Err(Error::ConfigValidation {
                message: "min_phone_digits must be greater than 0".to_string(),
            });
        }

        if registration.min_phone_digits > registration.max_phone_digits {
            return Err(Error::ConfigValidation {
                message: format!(
                    "min_phone_digits ({}) cannot be greater than max_phone_digits ({})",
                    registration.min_phone_digits, registration.max_phone_digits
                ),
            });
        }

        if self.qr.size_px == 0 {
            return Err(Error::ConfigValidation {
                message: "size_px must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the catalog path, resolving defaults if not set.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.catalog
            .path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(CATALOG_FILE_NAME))
    }

    /// Check a phone number against the configured registration bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the number contains anything other
    /// than ASCII digits or its length is out of bounds.
    pub fn validate_phone_number(&self, phone_number: &str) -> Result<()> {
        let RegistrationConfig {
            min_phone_digits,
            max_phone_digits,
        } = self.registration;

        if phone_number.is_empty() || !phone_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_input(
                "phone number",
                "must contain only digits",
            ));
        }
        let len = phone_number.len();
        if len < min_phone_digits || len > max_phone_digits {
            return Err(Error::invalid_input(
                "phone number",
                format!("must have between {min_phone_digits} and {max_phone_digits} digits"),
            ));
        }
        Ok(())
    }
}
