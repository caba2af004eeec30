//! Bootstrap configuration loading and root folder resolution
//!
//! Configuration comes from, in priority order:
//! 1. Command-line arguments (handled by the binary)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing or unreadable TOML file is not fatal: the caller gets the
//! compiled defaults and a warning in the log.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "ROAMWISE_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "roamwise.db";

/// Bootstrap configuration loaded from TOML file
///
/// Every field has a default so an empty file is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Root folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Overall deadline for one trip creation, in seconds
    #[serde(default = "default_request_deadline_secs")]
    pub request_deadline_secs: u64,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Geo-data provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Generative text backend settings
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: default_port(),
            request_deadline_secs: default_request_deadline_secs(),
            logging: LoggingConfig::default(),
            provider: ProviderConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full `EnvFilter` directive
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

/// Geo-data provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Base URL of the provider API (no trailing slash)
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// Value sent in the `X-RapidAPI-Host` header
    #[serde(default = "default_provider_host")]
    pub host: String,

    /// API key (lowest-priority source, see service config resolution)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Client-side rate limit
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Maximum records requested per call
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,

    /// Radius used by point searches, in kilometres
    #[serde(default = "default_search_radius_km")]
    pub search_radius_km: u32,

    /// Response language
    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            host: default_provider_host(),
            api_key: None,
            requests_per_second: default_requests_per_second(),
            result_limit: default_result_limit(),
            search_radius_km: default_search_radius_km(),
            lang: default_lang(),
        }
    }
}

/// Generative text backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Base URL of the generation API (no trailing slash)
    #[serde(default = "default_generator_base_url")]
    pub base_url: String,

    /// Model name used in the request path
    #[serde(default = "default_generator_model")]
    pub model: String,

    /// API key (lowest-priority source, see service config resolution)
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_generator_base_url(),
            model: default_generator_model(),
            api_key: None,
        }
    }
}

fn default_port() -> u16 {
    5810
}

fn default_request_deadline_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_provider_base_url() -> String {
    "https://travel-advisor.p.rapidapi.com".to_string()
}

fn default_provider_host() -> String {
    "travel-advisor.p.rapidapi.com".to_string()
}

fn default_requests_per_second() -> u32 {
    5
}

fn default_result_limit() -> u32 {
    30
}

fn default_search_radius_km() -> u32 {
    10
}

fn default_lang() -> String {
    "en_US".to_string()
}

fn default_generator_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_generator_model() -> String {
    "gemini-1.5-flash".to_string()
}

/// Parse TOML text into a config
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load TOML config from an explicit path
///
/// Unlike [`load_config`], a missing file here is an error: the caller asked
/// for this path specifically.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    parse_toml_config(&content)
}

/// Load bootstrap config with graceful degradation
///
/// With an explicit path, that file must load. Without one, the platform
/// config locations are probed and compiled defaults are used when none is
/// found or it fails to parse.
pub fn load_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit_path {
        let config = load_toml_config(path)?;
        info!("Loaded config from {}", path.display());
        return Ok(config);
    }

    match find_config_file() {
        Some(path) => match load_toml_config(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring unreadable config file: {}. Using defaults.", e);
                Ok(TomlConfig::default())
            }
        },
        None => {
            warn!("No config file found. Using compiled defaults.");
            Ok(TomlConfig::default())
        }
    }
}

/// Root folder resolution
///
/// Priority: command-line argument, then environment variable, then TOML
/// config, then the OS-dependent compiled default.
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}

/// Platform config file locations, first existing wins
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("roamwise").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/roamwise/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/roamwise (or /var/lib/roamwise for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("roamwise"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/roamwise"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("roamwise"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/roamwise"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("roamwise"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\roamwise"))
    } else {
        PathBuf::from("./roamwise_data")
    }
}
