//! Runtime configuration.
//!
//! Every section has defaults, so an empty (or missing) file yields a working system.
//!
//! ```toml
//! [capacity]
//! default_max_orders_per_volunteer = 5
//! default_order_capacity = 20
//!
//! [rate_limit]
//! user_orders_per_window = 3
//! guest_orders_per_window = 2
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "OUTREACH_CONFIG_PATH";

const DEFAULT_LOCATIONS: [&str; 2] = ["outreach.toml", "config/outreach.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    pub actors: ActorConfig,
    pub signup: SignupConfig,
    pub capacity: CapacityDefaults,
    pub rate_limit: RateLimitConfig,
    pub notifications: NotificationConfig,
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub mailbox_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self { mailbox_capacity: 32 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignupConfig {
    /// Upper bound of the lottery number range; numbers are drawn from `1..=max`.
    pub lottery_number_max: u32,
    /// Fixes the lottery sequence. Leave unset in production.
    pub lottery_seed: Option<u64>,
}

impl Default for SignupConfig {
    fn default() -> Self {
        Self {
            lottery_number_max: 1_000_000,
            lottery_seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CapacityDefaults {
    pub default_max_orders_per_volunteer: u32,
    pub default_order_capacity: u32,
}

impl Default for CapacityDefaults {
    fn default() -> Self {
        Self {
            default_max_orders_per_volunteer: 5,
            default_order_capacity: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub user_orders_per_window: usize,
    pub user_max_pending: usize,
    pub guest_orders_per_window: usize,
    pub guest_max_pending: usize,
    pub window_secs: u64,
    pub retention_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            user_orders_per_window: 3,
            user_max_pending: 5,
            guest_orders_per_window: 2,
            guest_max_pending: 3,
            window_secs: 60 * 60,
            retention_secs: 3 * 24 * 60 * 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs as i64)
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.retention_secs as i64)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub queue_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { queue_capacity: 256 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub sweep_interval_secs: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 15 * 60,
        }
    }
}

impl MaintenanceConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl AllocatorConfig {
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    /// `$OUTREACH_CONFIG_PATH` if set, else the first default location that exists, else
    /// built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            info!(path = %path, "Loading config");
            return Self::from_file(path);
        }
        for candidate in DEFAULT_LOCATIONS {
            let path = Path::new(candidate);
            if path.exists() {
                info!(path = %path.display(), "Loading config");
                return Self::from_file(path);
            }
        }
        info!("No config file found, using defaults");
        Ok(Self::default())
    }
}
