//! Configuration management for voiceeased.
//!
//! Loads settings from /etc/voiceease/config.toml (or an explicit path) and
//! falls back to defaults. `VOICEEASE_BIND` and `VOICEEASE_DB_PATH` override
//! the file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/voiceease/config.toml";

pub const ENV_BIND: &str = "VOICEEASE_BIND";
pub const ENV_DB_PATH: &str = "VOICEEASE_DB_PATH";

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Request body cap in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("/var/lib/voiceease/voiceease.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Session and password settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Maximum live sessions before the least recently used is evicted
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,

    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Add `Secure` to the session cookie (set when served over TLS)
    #[serde(default)]
    pub cookie_secure: bool,
}

fn default_session_ttl() -> u64 {
    86_400 // one day
}

fn default_session_capacity() -> usize {
    10_000
}

fn default_pbkdf2_iterations() -> u32 {
    100_000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
            session_capacity: default_session_capacity(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            cookie_secure: false,
        }
    }
}

/// Accounts created by the start-up bootstrap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_seed_enabled")]
    pub enabled: bool,

    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    #[serde(default = "default_demo_username")]
    pub demo_username: String,

    #[serde(default = "default_demo_password")]
    pub demo_password: String,
}

fn default_seed_enabled() -> bool {
    true
}

fn default_admin_username() -> String {
    "admin@voiceease.com".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_demo_username() -> String {
    "demo@voiceease.com".to_string()
}

fn default_demo_password() -> String {
    "password123".to_string()
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_seed_enabled(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            demo_username: default_demo_username(),
            demo_password: default_demo_password(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub seed: SeedConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the system path is
    /// tried and defaults are used if it is missing or broken.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from_path(p)?,
            None => match Self::load_from_path(Path::new(CONFIG_PATH)) {
                Ok(c) => c,
                Err(e) => {
                    if Path::new(CONFIG_PATH).exists() {
                        warn!("Ignoring unreadable {}: {:#}", CONFIG_PATH, e);
                    } else {
                        info!("No config at {}, using defaults", CONFIG_PATH);
                    }
                    Self::default()
                }
            },
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would leave the daemon unusable
    pub fn validate(&self) -> Result<()> {
        if self.auth.pbkdf2_iterations == 0 {
            bail!("auth.pbkdf2_iterations must be at least 1");
        }
        if self.auth.session_ttl_secs == 0 {
            bail!("auth.session_ttl_secs must be at least 1");
        }
        Ok(())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var(ENV_BIND) {
            if !bind.trim().is_empty() {
                self.server.bind = bind;
            }
        }
        if let Ok(db) = std::env::var(ENV_DB_PATH) {
            if !db.trim().is_empty() {
                self.database.path = PathBuf::from(db);
            }
        }
    }

    /// Write default config to a file
    pub fn save_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}
