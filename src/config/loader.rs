//! Configuration loading and discovery for `gmcp.toml`
//!
//! Provides functions to find, load, and apply environment overrides.

use super::schema::GmcpConfig;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project-level configuration file.
pub const CONFIG_FILE_NAME: &str = "gmcp.toml";

/// Name of the dotenv file consulted for environment variables.
pub const DOTENV_FILE_NAME: &str = ".env";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding `gemini.model`.
pub const MODEL_ENV: &str = "GEMINI_MODEL";

/// Environment variable overriding `gemini.base_url`.
pub const BASE_URL_ENV: &str = "GEMINI_API_BASE";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse gmcp.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Find gmcp.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for gmcp.toml
/// 2. Check XDG_CONFIG_HOME/gemini-mcp/gmcp.toml (or ~/.config/gemini-mcp/gmcp.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find gmcp.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("gemini-mcp").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find gmcp.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    find_upward(start, CONFIG_FILE_NAME)
}

/// Find `.env` by walking up from a specific directory.
pub fn find_dotenv_from(start: PathBuf) -> Option<PathBuf> {
    find_upward(start, DOTENV_FILE_NAME)
}

fn find_upward(start: PathBuf, file_name: &str) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(file_name);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration, then apply environment overrides.
///
/// If a path is provided, loads from that file (a missing file is an error).
/// Otherwise uses `find_config()` and falls back to defaults when nothing is
/// found.
pub fn load_config(path: Option<&Path>) -> Result<GmcpConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    let mut config = match config_path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading config");
            load_config_file(&p)?
        }
        None => GmcpConfig::default(),
    };

    let dotenv = env::current_dir().ok().and_then(find_dotenv_from).map(|p| read_dotenv(&p)).unwrap_or_default();
    apply_env_overrides(&mut config, layered_lookup(dotenv));

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<GmcpConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: GmcpConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Read the variables of a dotenv file. An unreadable file yields nothing.
pub fn read_dotenv(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable .env");
            return HashMap::new();
        }
    };

    tracing::debug!(path = %path.display(), "loading .env");
    let mut vars = HashMap::new();
    for entry in iter {
        match entry {
            Ok((key, value)) => {
                vars.insert(key, value);
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping .env line"),
        }
    }
    vars
}

/// Process environment first, then `dotenv` for variables the process lacks.
pub fn layered_lookup(dotenv: HashMap<String, String>) -> impl Fn(&str) -> Option<String> {
    move |key| env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

/// Apply environment overrides using `lookup` to read variables.
///
/// The API key is only ever taken from the environment (or `.env`).
pub fn apply_env_overrides<F>(config: &mut GmcpConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    config.gemini.api_key = lookup(API_KEY_ENV);

    if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
        config.gemini.model = model;
    }

    if let Some(base) = lookup(BASE_URL_ENV).filter(|b| !b.trim().is_empty()) {
        config.gemini.base_url = base.trim_end_matches('/').to_string();
    }
}
