//! Process settings, read once from the environment at start-up.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default dataset location, relative to the working directory.
pub const DEFAULT_CSV_PATH: &str = "data/temperature_data.csv";

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Deployment environment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Parse an environment name, case-insensitively.
    ///
    /// Unknown names fall back to `Development`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Environment::Test,
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Environment::Development => "temperature_server=debug,tower_http=debug",
            Environment::Test | Environment::Production => "temperature_server=info,tower_http=info",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors in the process configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR {value:?}: expected host:port")]
    InvalidBindAddr { value: String },
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub app_name: String,
    /// Path of the temperature CSV file.
    pub csv_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// Directory of static frontend assets, served for non-API paths.
    pub static_dir: Option<PathBuf>,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// Recognised variables: `APP_ENV`, `CSV_PATH`, `BIND_ADDR`, `STATIC_DIR`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = lookup("APP_ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or_default();

        let csv_path = lookup("CSV_PATH")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CSV_PATH.to_string());

        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr { value: bind.clone() })?;

        let static_dir = lookup("STATIC_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            env,
            app_name: "csv_temperature_data".to_string(),
            csv_path: PathBuf::from(csv_path),
            bind_addr,
            static_dir,
        })
    }

    /// Settings for a dataset at `csv_path`, everything else defaulted.
    pub fn with_csv_path(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            ..Self::default()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            app_name: "csv_temperature_data".to_string(),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            static_dir: None,
        }
    }
}
