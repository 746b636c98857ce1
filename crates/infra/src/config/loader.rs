//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the credentials are incomplete, falls back to loading from file
//! 3. Probes the working directory and the executable's directory
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `UKG_UserName`, `UKG_Password`, `UKG_ClientAccessKey`,
//!   `UKG_UserAccessKey`: credentials (required)
//! - `UKG_BaseUrl`: services base URL (defaults to
//!   `https://service4.ultipro.com/services/`)
//! - `UKG_TimeoutSecs`: HTTP request timeout in seconds
//! - `UKG_PollIntervalSecs`: seconds between report status checks
//! - `UKG_PollMaxAttempts`: status re-checks before giving up
//! - `UKG_RetryMaxAttempts`: attempts per outbound call
//!
//! ## File Locations
//! The loader checks the following paths (in order):
//! 1. `./ultipro.json` or `./ultipro.toml` (current working directory)
//! 2. `ultipro.json` or `ultipro.toml` next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ultipro_domain::constants::{
    ENV_BASE_URL, ENV_CLIENT_ACCESS_KEY, ENV_PASSWORD, ENV_POLL_INTERVAL_SECS,
    ENV_POLL_MAX_ATTEMPTS, ENV_RETRY_MAX_ATTEMPTS, ENV_TIMEOUT_SECS, ENV_USERNAME,
    ENV_USER_ACCESS_KEY,
};
use ultipro_domain::{ClientConfig, Credentials, Result, UltiProError};

const CONFIG_FILE_NAMES: [&str; 2] = ["ultipro.json", "ultipro.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any credential
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `UltiProError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or values are out of range
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The four credential variables must be present; the others fall back to
/// the defaults of [`ClientConfig::new`].
///
/// # Errors
/// Returns `UltiProError::Config` if a credential is missing or a numeric
/// variable cannot be parsed.
pub fn load_from_env() -> Result<ClientConfig> {
    let credentials = Credentials::new(
        env_var(ENV_USERNAME)?,
        env_var(ENV_PASSWORD)?,
        env_var(ENV_CLIENT_ACCESS_KEY)?,
        env_var(ENV_USER_ACCESS_KEY)?,
    )?;

    let mut config = ClientConfig::new(credentials);
    if let Some(base_url) = env_optional(ENV_BASE_URL) {
        config.base_url = base_url;
    }
    if let Some(timeout) = env_parse(ENV_TIMEOUT_SECS)? {
        config.request_timeout_secs = timeout;
    }
    if let Some(interval) = env_parse(ENV_POLL_INTERVAL_SECS)? {
        config.polling.interval_secs = interval;
    }
    if let Some(attempts) = env_parse(ENV_POLL_MAX_ATTEMPTS)? {
        config.polling.max_attempts = attempts;
    }
    if let Some(attempts) = env_parse(ENV_RETRY_MAX_ATTEMPTS)? {
        config.retry.max_attempts = attempts;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`discover_config_path`].
///
/// # Errors
/// Returns `UltiProError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or a credential is missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(UltiProError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => discover_config_path().ok_or_else(|| {
            UltiProError::Config(format!(
                "Credentials not set in the environment and no {} or {} found",
                CONFIG_FILE_NAMES[0], CONFIG_FILE_NAMES[1]
            ))
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| UltiProError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| UltiProError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| UltiProError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(UltiProError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard paths for configuration files
///
/// Searches the current working directory first, then the directory of
/// the running executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn discover_config_path() -> Option<PathBuf> {
    let mut directories = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        directories.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            directories.push(exe_dir.to_path_buf());
        }
    }

    directories
        .iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `UltiProError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    env_optional(key).ok_or_else(|| {
        UltiProError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Value of a set, non-blank environment variable.
fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable
///
/// # Errors
/// Returns `UltiProError::Config` if the variable is set but not a valid
/// number.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_optional(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| UltiProError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}
