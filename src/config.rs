use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: PathBuf,
    /// Cloud mirror connection
    pub remote: RemoteConfig,
    /// Sync worker behaviour
    pub sync: SyncConfig,
    /// Optional AI brain-dump integration
    pub ai: AiConfig,
}

/// Connection settings for the per-user document store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub server_url: Option<String>,
    pub api_key: Option<String>,
    /// Authenticated user id; remote operations fail without one.
    pub user_id: Option<String>,
}

impl RemoteConfig {
    pub fn is_configured(&self) -> bool {
        self.server_url.is_some() && self.api_key.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum re-runs of a failed sync job before dropping it.
    pub max_retries: u32,
    /// First backoff delay in seconds; doubles per retry, capped at 600.
    pub backoff_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            model: "llama-3.3-70b-versatile".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self {
            database_path: PathBuf::from(&home).join(".focuslive").join("focuslive.db"),
            remote: RemoteConfig::default(),
            sync: SyncConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("FOCUSLIVE_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(url) = std::env::var("FOCUSLIVE_SERVER_URL") {
            config.remote.server_url = Some(url);
        }
        if let Ok(key) = std::env::var("FOCUSLIVE_API_KEY") {
            config.remote.api_key = Some(key);
        }
        if let Ok(uid) = std::env::var("FOCUSLIVE_USER_ID") {
            config.remote.user_id = Some(uid);
        }
        if let Ok(key) = std::env::var("FOCUSLIVE_AI_API_KEY") {
            config.ai.api_key = Some(key);
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/focuslive/config.yaml
    pub fn default_config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("focuslive")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config
            .database_path
            .to_string_lossy()
            .contains("focuslive.db"));
        assert!(!config.remote.is_configured());
        assert_eq!(config.sync.max_retries, 5);
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.remote.server_url.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/db.sqlite").unwrap();
        writeln!(file, "remote:").unwrap();
        writeln!(file, "  server_url: https://sync.example.com").unwrap();
        writeln!(file, "  api_key: secret").unwrap();
        writeln!(file, "  user_id: user-1").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/custom/path/db.sqlite"));
        assert!(config.remote.is_configured());
        assert_eq!(config.remote.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
