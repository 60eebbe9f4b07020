//! BrainTrip configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main BrainTrip configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation provider configuration
    pub generation: GenerationConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Draft autosave configuration
    pub autosave: AutosaveConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that required environment variables are set. Call this
    /// early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.generation.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "Generation API key not found. Set the {} environment variable.",
                self.generation.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path is authoritative, so failure there is fatal.
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local file first: .braintrip.yml
        let local_config = PathBuf::from(".braintrip.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Then the user config dir: ~/.config/braintrip/braintrip.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("braintrip").join("braintrip.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Generation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl GenerationConfig {
    /// Read the API key from the configured environment variable
    pub fn resolve_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .map_err(|_| eyre::eyre!("Environment variable {} is not set", self.api_key_env))
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_ms: 60_000,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for trip, draft, and user slot files
    #[serde(rename = "store-dir")]
    pub store_dir: String,

    /// Directory for log files
    #[serde(rename = "log-dir")]
    pub log_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/braintrip on Linux)
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join("braintrip"))
            .unwrap_or_else(|| PathBuf::from(".braintrip"));

        Self {
            store_dir: data_dir.to_string_lossy().into_owned(),
            log_dir: data_dir.join("logs").to_string_lossy().into_owned(),
        }
    }
}

/// Draft autosave configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Quiet period before a pending draft is written, in milliseconds
    #[serde(rename = "debounce-ms")]
    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { debounce_ms: 2_000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.generation.provider, "gemini");
        assert_eq!(config.generation.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.autosave.debounce_ms, 2_000);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
generation:
  provider: gemini
  model: gemini-2.5-pro
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  timeout-ms: 30000

storage:
  store-dir: /tmp/braintrip
  log-dir: /tmp/braintrip/logs

autosave:
  debounce-ms: 500
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.generation.model, "gemini-2.5-pro");
        assert_eq!(config.generation.api_key_env, "MY_API_KEY");
        assert_eq!(config.generation.timeout_ms, 30_000);
        assert_eq!(config.storage.store_dir, "/tmp/braintrip");
        assert_eq!(config.autosave.debounce_ms, 500);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
generation:
  model: gemini-2.0-flash
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.generation.model, "gemini-2.0-flash");

        // Defaults for unspecified
        assert_eq!(config.generation.provider, "gemini");
        assert_eq!(config.generation.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.autosave.debounce_ms, 2_000);
    }
}
