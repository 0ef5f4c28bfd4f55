//! Configuration for jukebox-player
//!
//! Bootstrap settings come from a TOML file (all fields optional, built-in
//! defaults otherwise) and are read once at startup.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`--port`, `--log-level`)
//! 2. TOML configuration file (located via `ConfigPathResolver`)
//! 3. Built-in defaults (code constants)

use crate::error::{Error, Result};
use crate::playback::ControllerSettings;
use jukebox_common::config::{load_toml_or_default, ConfigPathResolver, LoggingConfig};
use jukebox_common::UserId;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Name of the per-user / system config directory
pub const APP_NAME: &str = "jukebox";

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "JUKEBOX_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: u16,

    /// Interface to bind
    pub bind_address: String,

    pub playback: PlaybackConfig,
    pub resolver: ResolverConfig,
    pub bot: BotConfig,
    pub voice: VoiceConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: "127.0.0.1".to_string(),
            playback: PlaybackConfig::default(),
            resolver: ResolverConfig::default(),
            bot: BotConfig::default(),
            voice: VoiceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    5750
}

/// `[playback]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Seconds added to a track's duration before its control surface
    /// stops listening
    pub grace_seconds: u64,

    /// Event bus buffer per subscriber
    pub event_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            grace_seconds: 10,
            event_capacity: 256,
        }
    }
}

/// `[resolver]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// yt-dlp executable (looked up on PATH when relative)
    pub ytdlp_path: PathBuf,

    /// Search prefix applied to plain-text queries
    pub default_search: String,

    /// Netscape cookie file, used only when it exists
    pub cookies_file: Option<PathBuf>,

    /// User agent sent along with cookies
    pub user_agent: String,

    /// Queries resolved at once within one request
    pub concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: PathBuf::from("yt-dlp"),
            default_search: "ytsearch1".to_string(),
            cookies_file: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            concurrency: 4,
        }
    }
}

/// `[bot]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// The bot's own user id; its reactions are ignored
    pub user_id: u64,
}

/// Largest accepted `voice.time_scale`
pub const MAX_TIME_SCALE: f64 = 100.0;

/// `[voice]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Multiplier on track durations for the clock backend
    pub time_scale: f64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self { time_scale: 1.0 }
    }
}

/// Command-line values that win over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Effective configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// File the settings came from, if any
    pub source: Option<PathBuf>,
    pub toml: TomlConfig,
}

impl Config {
    /// Resolve the config file, load it and apply overrides
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let resolver = ConfigPathResolver::new(APP_NAME, CONFIG_ENV_VAR);
        let source = resolver.resolve(overrides.config_path.as_deref());
        Self::from_path(source.as_deref(), overrides)
    }

    /// Load from an explicit path (None = defaults) and apply overrides
    pub fn from_path(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut toml: TomlConfig = load_toml_or_default(path)?;

        if let Some(port) = overrides.port {
            toml.port = port;
        }
        if let Some(level) = &overrides.log_level {
            toml.logging.level = level.clone();
        }

        let config = Self {
            source: path.map(Path::to_path_buf),
            toml,
        };
        config.validate()?;

        info!(
            port = config.toml.port,
            grace_seconds = config.toml.playback.grace_seconds,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.toml.resolver.concurrency == 0 {
            return Err(Error::Config("resolver.concurrency must be at least 1".to_string()));
        }
        let scale = self.toml.voice.time_scale;
        if !(scale.is_finite() && (0.0..=MAX_TIME_SCALE).contains(&scale)) {
            return Err(Error::Config(format!(
                "voice.time_scale must be between 0 and {}, got {}",
                MAX_TIME_SCALE, scale
            )));
        }
        self.bind_addr().map(|_| ())
    }

    /// Socket address for the HTTP server
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.toml.bind_address.parse().map_err(|e| {
            Error::Config(format!("Invalid bind_address '{}': {}", self.toml.bind_address, e))
        })?;
        Ok(SocketAddr::new(ip, self.toml.port))
    }

    /// Controller tunables
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            grace: Duration::from_secs(self.toml.playback.grace_seconds),
            bot_user_id: UserId(self.toml.bot.user_id),
        }
    }

    /// Default tracing filter when RUST_LOG is not set
    pub fn log_filter(&self) -> String {
        let level = &self.toml.logging.level;
        format!("jukebox_player={level},jukebox_common={level},tower_http=info")
    }
}
