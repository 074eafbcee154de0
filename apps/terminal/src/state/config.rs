//! # Terminal Configuration
//!
//! Settings of this terminal installation, loaded once at startup.
//!
//! Store-facing settings (name, address, printer host/port, time offset)
//! are not here: they live in the persisted `StoreConfig` record so a
//! backup carries them.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ACAIZEN_DB_PATH=/data/acaizen.db                                   │
//! │     ACAIZEN_LOG_LEVEL=debug                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/acaizen-pos/acaizen.toml (Linux)                         │
//! │     ~/Library/Application Support/br.acaizen.pos/acaizen.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # acaizen.toml
//! [database]
//! path = "/var/lib/acaizen/acaizen.db"
//! max_connections = 5
//!
//! [logging]
//! level = "info"
//! format = "pretty"   # pretty | json
//!
//! [printer]
//! request_timeout_secs = 5
//! fallback_close_ms = 5000
//!
//! [checkout]
//! kitchen_category_id = 3
//! default_customer_name = "Cliente"
//!
//! [receipts]
//! download_dir = "/home/caixa/Downloads"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use acaizen_core::{DEFAULT_CUSTOMER_NAME, KITCHEN_CATEGORY_ID};
use acaizen_print::{DEFAULT_FALLBACK_CLOSE_MS, DEFAULT_REQUEST_TIMEOUT};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "acaizen.toml";

/// Errors raised while loading the terminal configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to `acaizen.db` in the platform data dir.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    ProjectDirs::from("br", "acaizen", "pos")
        .map(|dirs| dirs.data_dir().join("acaizen.db"))
        .unwrap_or_else(|| PathBuf::from("acaizen.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Invalid(format!(
                "Unknown log format: '{}'. Valid options: pretty, json",
                other
            ))),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` still wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// `[printer]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterSettings {
    /// Timeout of one request to the print helper.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long the print-dialog document waits before closing itself.
    #[serde(default = "default_fallback_close_ms")]
    pub fallback_close_ms: u64,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_fallback_close_ms() -> u64 {
    DEFAULT_FALLBACK_CLOSE_MS
}

impl Default for PrinterSettings {
    fn default() -> Self {
        PrinterSettings {
            request_timeout_secs: default_request_timeout_secs(),
            fallback_close_ms: default_fallback_close_ms(),
        }
    }
}

impl PrinterSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `[checkout]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Lines whose product is in this category also go on the kitchen ticket.
    #[serde(default = "default_kitchen_category_id")]
    pub kitchen_category_id: i64,

    #[serde(default = "default_customer_name")]
    pub default_customer_name: String,
}

fn default_kitchen_category_id() -> i64 {
    KITCHEN_CATEGORY_ID
}

fn default_customer_name() -> String {
    DEFAULT_CUSTOMER_NAME.to_string()
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            kitchen_category_id: default_kitchen_category_id(),
            default_customer_name: default_customer_name(),
        }
    }
}

/// `[receipts]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptSettings {
    /// Where downloaded receipt files are written.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

fn default_download_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        ReceiptSettings {
            download_dir: default_download_dir(),
        }
    }
}

// =============================================================================
// Terminal Config
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub printer: PrinterSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,

    #[serde(default)]
    pub receipts: ReceiptSettings,
}

impl TerminalConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`acaizen.toml`), when it exists
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading terminal config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses one config file, without environment overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        if self.printer.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "printer.request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.checkout.default_customer_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "checkout.default_customer_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("ACAIZEN_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(level) = std::env::var("ACAIZEN_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("ACAIZEN_LOG_FORMAT") {
            match format.parse() {
                Ok(parsed) => self.logging.format = parsed,
                Err(_) => warn!(format = %format, "Unknown log format in environment"),
            }
        }

        if let Ok(secs) = std::env::var("ACAIZEN_PRINTER_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => self.printer.request_timeout_secs = secs,
                Err(_) => warn!(value = %secs, "Invalid printer timeout in environment"),
            }
        }

        if let Ok(id) = std::env::var("ACAIZEN_KITCHEN_CATEGORY_ID") {
            match id.parse::<i64>() {
                Ok(id) => self.checkout.kitchen_category_id = id,
                Err(_) => warn!(value = %id, "Invalid kitchen category id in environment"),
            }
        }

        if let Ok(dir) = std::env::var("ACAIZEN_RECEIPT_DIR") {
            self.receipts.download_dir = PathBuf::from(dir);
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("br", "acaizen", "pos").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
