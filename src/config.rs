//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.pokedex/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::network::TransportConfig;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PokedexConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub list: ListConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ListConfig {
    pub page_size: Option<u32>,
    pub images_base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2/";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_IMAGES_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/dream-world/";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: Option<String>,
    pub page_size: u32,
    pub images_base_url: String,
}

impl ResolvedConfig {
    /// Settings for building the HTTP transport.
    pub fn transport(&self) -> TransportConfig {
        let mut config = TransportConfig::new(self.base_url.clone());
        config.connect_timeout = self.connect_timeout;
        config.request_timeout = self.request_timeout;
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        config
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidUrl { value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::InvalidUrl { value, reason } => {
                write!(f, "invalid base URL `{value}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.pokedex/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".pokedex").join("config.toml"))
}

/// Load config from `~/.pokedex/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PokedexConfig::default()`.
pub fn load_config() -> Result<PokedexConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(PokedexConfig::default())
        }
    }
}

/// Load config from an explicit path. Same first-run behavior as [`load_config`].
pub fn load_config_from(path: &Path) -> Result<PokedexConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(PokedexConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: PokedexConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# Pokedex Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [api]
# base_url = "https://pokeapi.co/api/v2/"   # Or set POKEDEX_BASE_URL
# connect_timeout_secs = 30
# request_timeout_secs = 120
# user_agent = "pokedex/0.1.0"

# [list]
# page_size = 20                            # Or set POKEDEX_PAGE_SIZE
# images_base_url = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/dream-world/"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(
    config: &PokedexConfig,
    cli_base_url: Option<&str>,
    cli_page_size: Option<u32>,
) -> Result<ResolvedConfig, ConfigError> {
    resolve_with_env(config, cli_base_url, cli_page_size, |key| {
        std::env::var(key).ok()
    })
}

/// [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env(
    config: &PokedexConfig,
    cli_base_url: Option<&str>,
    cli_page_size: Option<u32>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig, ConfigError> {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(str::to_string)
        .or_else(|| env("POKEDEX_BASE_URL"))
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Url::parse(&base_url).map_err(|e| ConfigError::InvalidUrl {
        value: base_url.clone(),
        reason: e.to_string(),
    })?;

    // Page size: CLI → env → config → default; unparsable env values are ignored
    let page_size = cli_page_size
        .or_else(|| {
            env("POKEDEX_PAGE_SIZE").and_then(|v| match v.trim().parse() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!("Ignoring invalid POKEDEX_PAGE_SIZE: {v}");
                    None
                }
            })
        })
        .or(config.list.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .max(1);

    Ok(ResolvedConfig {
        base_url,
        connect_timeout: Duration::from_secs(
            config
                .api
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        ),
        request_timeout: Duration::from_secs(
            config
                .api
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        user_agent: config.api.user_agent.clone(),
        page_size,
        images_base_url: config
            .list
            .images_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGES_BASE_URL.to_string()),
    })
}
