use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{GraphLensError, Result};

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name of the per-user configuration directory.
pub const CONFIG_DIR: &str = "graphlens";

/// Environment variable overriding the service base URL.
pub const ENV_API_URL: &str = "GRAPHLENS_API_URL";
/// Environment variable carrying the service API key.
pub const ENV_API_KEY: &str = "INFRANODUS_API_KEY";
/// Environment variable overriding the request timeout.
pub const ENV_TIMEOUT_SECS: &str = "GRAPHLENS_TIMEOUT_SECS";

/// Configuration for the GraphLens server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphLensConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Base URL of the graph-analysis API.
    pub api_url: String,
    /// Bearer token for the API; requests are sent unauthenticated without it.
    pub api_key: Option<String>,
    /// Upper bound on a single upstream request, in seconds.
    pub timeout_secs: u64,
    /// Default language for search-engine imports.
    pub import_language: String,
    /// Default country for search-engine imports.
    pub import_country: String,
    /// Default model for AI-generated advice.
    pub default_model: String,
}

impl Default for GraphLensConfig {
    fn default() -> Self {
        Self {
            version: 1,
            api_url: "https://infranodus.com/api/v1".to_string(),
            api_key: None,
            timeout_secs: 120,
            import_language: "EN".to_string(),
            import_country: "US".to_string(),
            default_model: "gpt-4o".to_string(),
        }
    }
}

/// Returns the default configuration file path, e.g.
/// `~/.config/graphlens/config.json`.
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| GraphLensError::Config {
        message: "could not determine the user configuration directory".to_string(),
    })?;
    Ok(base.join(CONFIG_DIR).join(CONFIG_FILENAME))
}

/// Loads the configuration from `path`.
///
/// A missing file yields the default configuration.
pub fn load_config(path: &Path) -> Result<GraphLensConfig> {
    if !path.exists() {
        return Ok(GraphLensConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| GraphLensError::Config {
        message: format!("failed to read config file '{}': {}", path.display(), e),
    })?;

    serde_json::from_str(&contents).map_err(|e| GraphLensError::Config {
        message: format!("failed to parse config file '{}': {}", path.display(), e),
    })
}

/// Applies environment overrides on top of a loaded configuration.
///
/// `lookup` resolves a variable name; pass `|k| std::env::var(k).ok()` in
/// production.
pub fn apply_env_overrides<F>(mut config: GraphLensConfig, lookup: F) -> Result<GraphLensConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
        config.api_url = url;
    }
    if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
        config.api_key = Some(key);
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        config.timeout_secs = raw.trim().parse().map_err(|_| GraphLensError::Config {
            message: format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw),
        })?;
    }
    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it to the final
/// location, so a partial write never corrupts the configuration.
pub fn save_config(path: &Path, config: &GraphLensConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| GraphLensError::Config {
            message: format!("failed to create config directory '{}': {}", dir.display(), e),
        })?;
    }

    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(config).map_err(|e| GraphLensError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    fs::write(&tmp_path, &json).map_err(|e| GraphLensError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, path).map_err(|e| GraphLensError::Config {
        message: format!(
            "failed to rename temporary config file '{}' to '{}': {}",
            tmp_path.display(),
            path.display(),
            e
        ),
    })?;

    Ok(())
}
