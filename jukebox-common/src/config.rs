//! Configuration file resolution and TOML loading
//!
//! Config path resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config directory (`<config_dir>/<app>/config.toml`)
//! 4. System-wide file (`/etc/<app>/config.toml`, unix only)
//!
//! A missing config file is never fatal: callers get built-in defaults and a
//! warning in the log.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Logging configuration shared by every binary
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolves which config file a binary should read
#[derive(Debug, Clone)]
pub struct ConfigPathResolver {
    app_name: String,
    env_var_name: String,
}

impl ConfigPathResolver {
    /// Create a resolver for `app_name`, consulting `env_var_name` second
    pub fn new(app_name: &str, env_var_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            env_var_name: env_var_name.to_string(),
        }
    }

    /// Resolve the config path.
    ///
    /// CLI and environment values are returned even when the file does not
    /// exist (the loader reports that); the implicit locations are only
    /// returned when present on disk.
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: User config directory
        if let Some(path) = self.user_config_path() {
            if path.exists() {
                return Some(path);
            }
        }

        // Priority 4: System-wide config
        let system = self.system_config_path()?;
        system.exists().then_some(system)
    }

    /// `<config_dir>/<app>/config.toml`, if the platform has a config dir
    pub fn user_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(&self.app_name).join("config.toml"))
    }

    fn system_config_path(&self) -> Option<PathBuf> {
        if cfg!(unix) {
            Some(PathBuf::from("/etc").join(&self.app_name).join("config.toml"))
        } else {
            None
        }
    }
}

/// Load a TOML config document, falling back to defaults.
///
/// - `None` path → defaults
/// - path that does not exist → warning + defaults
/// - unreadable or malformed file → error (a typo should not be silently ignored)
pub fn load_toml_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!("Config file {} not found, using built-in defaults", path.display());
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config = toml::from_str(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
