//! # Client Configuration
//!
//! Configuration management for the data-access layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SPENDVIEW_REQUEST_TIMEOUT_MS=5000                                  │
//! │     SPENDVIEW_ROLLBACK_FAILED_APPROVALS=true                           │
//! │     SPENDVIEW_PAGE_SIZE=10                                             │
//! │     SPENDVIEW_API_LATENCY_MS=300                                       │
//! │     SPENDVIEW_LOG=debug                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/spendview/config.toml (Linux)                            │
//! │     ~/Library/Application Support/com.spendview.spendview/config.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [client]
//! request_timeout_ms = 10000
//! rollback_failed_approvals = false
//!
//! [api]
//! page_size = 5
//! latency_ms = 0
//!
//! [logging]
//! filter = "info,spendview=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Sections
// =============================================================================

/// Behaviour of the client layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Upper bound for a single API call (milliseconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Revert the optimistic approval patch when the mutation fails.
    ///
    /// Off by default: the patch stands and the failure is only logged.
    #[serde(default)]
    pub rollback_failed_approvals: bool,
}

/// Settings of the in-process API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Transactions per page of `paginatedTransactions`.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Artificial delay before every in-process response (milliseconds).
    #[serde(default)]
    pub latency_ms: u64,
}

/// Logging settings (used by binaries when installing a subscriber).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_page_size() -> usize {
    spendview_core::DEFAULT_PAGE_SIZE
}

fn default_log_filter() -> String {
    "info,spendview=debug".to_string()
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            request_timeout_ms: default_request_timeout(),
            rollback_failed_approvals: false,
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            page_size: default_page_size(),
            latency_ms: 0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub client: ClientSettings,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.client.request_timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "request_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.api.page_size == 0 {
            return Err(ClientError::InvalidConfig(
                "page_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the environment in production).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timeout) = lookup("SPENDVIEW_REQUEST_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => {
                    debug!(ms, "Overriding request timeout from environment");
                    self.client.request_timeout_ms = ms;
                }
                Err(_) => warn!(value = %timeout, "Ignoring invalid SPENDVIEW_REQUEST_TIMEOUT_MS"),
            }
        }

        if let Some(rollback) = lookup("SPENDVIEW_ROLLBACK_FAILED_APPROVALS") {
            match rollback.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.client.rollback_failed_approvals = true,
                "0" | "false" | "no" => self.client.rollback_failed_approvals = false,
                _ => warn!(value = %rollback, "Ignoring invalid SPENDVIEW_ROLLBACK_FAILED_APPROVALS"),
            }
        }

        if let Some(size) = lookup("SPENDVIEW_PAGE_SIZE") {
            if let Ok(size) = size.parse::<usize>() {
                debug!(size, "Overriding page size from environment");
                self.api.page_size = size;
            }
        }

        if let Some(latency) = lookup("SPENDVIEW_API_LATENCY_MS") {
            if let Ok(ms) = latency.parse::<u64>() {
                self.api.latency_ms = ms;
            }
        }

        if let Some(filter) = lookup("SPENDVIEW_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "spendview", "spendview")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.client.request_timeout_ms)
    }

    pub fn rollback_failed_approvals(&self) -> bool {
        self.client.rollback_failed_approvals
    }

    pub fn page_size(&self) -> usize {
        self.api.page_size
    }

    pub fn api_latency(&self) -> Duration {
        Duration::from_millis(self.api.latency_ms)
    }
}
