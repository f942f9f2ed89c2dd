//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `SYRUP_TOKEN` is missing or a value is invalid, falls back to a file
//! 3. Probes the working directory and the executable directory
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `SYRUP_TOKEN`: API token (required)
//! - `SYRUP_URL`: Base URL of the job API
//! - `SYRUP_QUEUE_URL`: Base URL of the job queue
//! - `SYRUP_RUN_ID`: Run id propagated with every request
//! - `SYRUP_SUPER`: Parent component namespace
//! - `SYRUP_USER_AGENT`: User agent suffix
//! - `SYRUP_BACKOFF_MAX_TRIES`: Transport retries on 5xx/network errors
//! - `SYRUP_USE_SYSTEM_PROXY`: `false` bypasses `HTTP_PROXY`/`HTTPS_PROXY`
//! - `SYRUP_POLL_MAX_DELAY`: Upper bound in seconds between two polls
//! - `SYRUP_POLL_TIMEOUT`: Deadline in seconds for the whole poll loop
//!
//! ## File Locations
//! `syrup.json` or `syrup.toml`, first in the current working directory and
//! then next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use syrup_domain::{ClientConfig, Result, SyrupError};

const CONFIG_FILE_NAMES: [&str; 2] = ["syrup.json", "syrup.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `SyrupError::Config` if neither the environment nor a config
/// file yields a valid configuration.
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `SYRUP_TOKEN` is required; everything else keeps its default when
/// unset.
///
/// # Errors
/// Returns `SyrupError::Config` if `SYRUP_TOKEN` is missing, a numeric
/// variable does not parse, or the result does not validate.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(env_var("SYRUP_TOKEN")?);

    if let Some(url) = env_opt("SYRUP_URL") {
        config.url = url;
    }
    config.queue_url = env_opt("SYRUP_QUEUE_URL");
    config.run_id = env_opt("SYRUP_RUN_ID");
    config.super_component = env_opt("SYRUP_SUPER");
    config.user_agent = env_opt("SYRUP_USER_AGENT");

    if let Some(tries) = env_parse("SYRUP_BACKOFF_MAX_TRIES")? {
        config.backoff_max_tries = tries;
    }
    if let Some(use_proxy) = env_parse("SYRUP_USE_SYSTEM_PROXY")? {
        config.use_system_proxy = use_proxy;
    }
    if let Some(max_delay) = env_parse("SYRUP_POLL_MAX_DELAY")? {
        config.poll.max_delay_secs = max_delay;
    }
    if let Some(timeout) = env_parse("SYRUP_POLL_TIMEOUT")? {
        config.poll.timeout_secs = Some(timeout);
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. The format is
/// detected by extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `SyrupError::Config` if the file is missing, unreadable,
/// malformed or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SyrupError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SyrupError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SyrupError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SyrupError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SyrupError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SyrupError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file
///
/// Returns the first existing `syrup.{json,toml}` in the current working
/// directory or next to the executable.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        SyrupError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Non-empty value of an environment variable.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| SyrupError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
