use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Json, Serialized};
use figment::value::{Uncased, UncasedStr};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::scheduling::WorkingHours;

/// Application-level constants
pub const APP_NAME: &str = "SalonScheduler";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable prefix for overrides (`SALON_BIND_ADDR`, ...).
const ENV_PREFIX: &str = "SALON_";

/// Default maximum length of appointment notes, in characters.
pub const DEFAULT_NOTES_MAX_CHARS: usize = 500;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,salon_scheduler_lib=debug,tower_http=info"
}

/// Get the application data directory
/// ~/SalonScheduler/ on all platforms.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Default location of the SQLite database.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("salon.db")
}

/// Default location of the optional JSON config file.
pub fn default_config_path() -> PathBuf {
    app_data_dir().join("config.json")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot load configuration: {0}")]
    Load(#[from] figment::Error),
    #[error("Invalid working hours: {0}")]
    WorkingHours(String),
    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Runtime configuration.
///
/// Merge order (later overrides earlier): compiled defaults, `config.json`
/// (if present), then `SALON_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub working_hours: WorkingHours,
    pub notes_max_chars: usize,
    /// Capacity of the outgoing notification queue.
    pub notification_buffer: usize,
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_path: default_database_path(),
            working_hours: WorkingHours::default(),
            notes_max_chars: DEFAULT_NOTES_MAX_CHARS,
            notification_buffer: 64,
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Load from the default config file location plus process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Load from `path` (missing file = defaults) with env overrides, then validate.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = build_figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.working_hours
            .validate()
            .map_err(ConfigError::WorkingHours)?;
        if self.notes_max_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "notes_max_chars",
                reason: "must be positive".into(),
            });
        }
        if self.notification_buffer == 0 {
            return Err(ConfigError::Invalid {
                field: "notification_buffer",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(default_log_filter())
    }
}

/// The layered provider stack, before extraction.
pub fn build_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Json::file(path))
        .merge(Env::prefixed(ENV_PREFIX).map(env_key))
}

/// `SALON_OPEN`, `SALON_CLOSE` and `SALON_SLOT_MINUTES` land in `working_hours`,
/// `SALON_LOG` in `log_filter`. Everything else maps to the top-level field of
/// the same name (`SALON_NOTIFICATION_BUFFER` -> `notification_buffer`).
fn env_key(key: &UncasedStr) -> Uncased<'_> {
    match key.as_str().to_ascii_lowercase().as_str() {
        "open" => "working_hours.open".into(),
        "close" => "working_hours.close".into(),
        "slot_minutes" => "working_hours.granularity_minutes".into(),
        "log" => "log_filter".into(),
        _ => key.as_str().into(),
    }
}
