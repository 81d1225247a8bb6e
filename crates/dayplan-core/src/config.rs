//! Configuration management
//!
//! Settings are resolved in the following order:
//! 1. Environment variables
//! 2. dayplan.toml configuration file
//! 3. Default values
//!
//! Inside the configuration file, `${VAR_NAME}` expands to the value of the
//! named environment variable.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Default chat endpoint, matching the companion chat server's address.
pub const DEFAULT_CHAT_API_URL: &str = "http://localhost:5000/api/chat";

/// Chat endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Chat endpoint URL. A URL stored from a previous session
    /// (`chatApiUrl`) takes precedence over this value.
    #[serde(default = "default_chat_api_url")]
    pub api_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_chat_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: default_chat_api_url(),
            timeout_secs: default_chat_timeout_secs(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_chat_api_url() -> String {
    DEFAULT_CHAT_API_URL.to_string()
}

fn default_chat_timeout_secs() -> u64 {
    30
}

fn default_db_path() -> String {
    "data/dayplan.db".to_string()
}

/// Main configuration for dayplan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat endpoint configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` references to environment variable values.
    ///
    /// Unknown variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    chars.next();
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file.
    ///
    /// `${VAR_NAME}` references in the file are expanded before parsing, and
    /// environment variables override whatever the file provides.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let toml_config: TomlConfig = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut cfg = Self::from_toml_config(toml_config);
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// Load configuration from the default locations.
    ///
    /// Tries `./dayplan.toml` first; without a file, only environment
    /// variables and defaults apply.
    pub fn load() -> crate::Result<Self> {
        if Path::new("dayplan.toml").exists() {
            return Self::from_toml_file("dayplan.toml");
        }

        Ok(Self::from_env())
    }

    /// Build a Config from the TOML file structure
    fn from_toml_config(toml: TomlConfig) -> Self {
        let chat = toml.chat.unwrap_or_default();
        let storage = toml.storage.unwrap_or_default();

        Config {
            chat: ChatConfig {
                api_url: chat.api_url.unwrap_or_else(default_chat_api_url),
                timeout_secs: chat.timeout_secs.unwrap_or_else(default_chat_timeout_secs),
            },
            storage: StorageConfig {
                db_path: storage.db_path.unwrap_or_else(default_db_path),
            },
        }
    }

    /// Override settings from environment variables
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CHAT_API_URL") {
            if !url.is_empty() {
                self.chat.api_url = url;
            }
        }

        if let Ok(secs) = std::env::var("CHAT_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse() {
                self.chat.timeout_secs = parsed;
            }
        }

        if let Ok(path) = std::env::var("DB_PATH") {
            if !path.is_empty() {
                self.storage.db_path = path;
            }
        }
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut cfg = Config::default();
        cfg.apply_env_overrides();
        cfg
    }
}

// ============================================================================
// TOML file structures
// ============================================================================

/// Top-level structure of dayplan.toml
#[derive(Debug, Deserialize)]
struct TomlConfig {
    /// Chat endpoint settings
    chat: Option<TomlChatConfig>,
    /// Storage settings
    storage: Option<TomlStorageConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlChatConfig {
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlStorageConfig {
    #[serde(default)]
    db_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_config_default() {
        let config = ChatConfig::default();
        assert_eq!(config.api_url, "http://localhost:5000/api/chat");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.db_path, "data/dayplan.db");
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("DAYPLAN_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${DAYPLAN_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("DAYPLAN_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        let result = Config::expand_env_vars("no_vars_here");
        assert_eq!(result, "no_vars_here");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[chat]
api_url = "http://calendar.example.com/api/chat"
timeout_secs = 10

[storage]
db_path = "/tmp/dayplan-test.db"
"#;

        let toml_config: TomlConfig = toml::from_str(toml_content).unwrap();
        let config = Config::from_toml_config(toml_config);

        assert_eq!(config.chat.api_url, "http://calendar.example.com/api/chat");
        assert_eq!(config.chat.timeout_secs, 10);
        assert_eq!(config.storage.db_path, "/tmp/dayplan-test.db");
    }

    #[test]
    fn test_toml_config_partial() {
        let toml_config: TomlConfig = toml::from_str("[chat]\ntimeout_secs = 5\n").unwrap();
        let config = Config::from_toml_config(toml_config);

        assert_eq!(config.chat.api_url, DEFAULT_CHAT_API_URL);
        assert_eq!(config.chat.timeout_secs, 5);
        assert_eq!(config.storage.db_path, "data/dayplan.db");
    }
}
