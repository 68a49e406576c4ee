//! Configuration management for smartala.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::conversation::DEFAULT_CAPACITY;
use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "smartala";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SMARTALA_`)
/// 2. TOML config file at `~/.config/smartala/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Conversation history configuration.
    pub conversation: ConversationConfig,
    /// Voice assistant configuration.
    pub assistant: AssistantConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Base URL used in static location links.
    /// Defaults to `http://{host}:{port}/`
    pub public_base_url: Option<String>,
}

/// Conversation history configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Maximum number of exchanges retained.
    pub capacity: usize,
    /// Number of recent exchanges passed to the model as context.
    pub context_window: usize,
}

/// Voice assistant configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// City named in prompts.
    pub city: String,
    /// Latitude assumed when the client sends no position.
    pub fallback_latitude: f64,
    /// Longitude assumed when the client sends no position.
    pub fallback_longitude: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            public_base_url: None,
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            context_window: 5,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        // central Almaty
        Self {
            city: "Almaty".to_string(),
            fallback_latitude: 43.238_293,
            fallback_longitude: 76.889_709,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("SMARTALA_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "port must be greater than 0".to_string(),
            });
        }

        if let Some(url) = &self.server.public_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::ConfigValidation {
                    message: format!("public_base_url must start with http:// or https://: {url}"),
                });
            }
        }

        if self.conversation.capacity == 0 {
            return Err(Error::ConfigValidation {
                message: "conversation capacity must be greater than 0".to_string(),
            });
        }

        if self.conversation.context_window > self.conversation.capacity {
            return Err(Error::ConfigValidation {
                message: format!(
                    "context_window ({}) cannot be greater than capacity ({})",
                    self.conversation.context_window, self.conversation.capacity
                ),
            });
        }

        if let Err(e) = self.fallback_position() {
            return Err(Error::ConfigValidation {
                message: format!("invalid fallback position: {e}"),
            });
        }

        Ok(())
    }

    /// Base URL for static location links, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> String {
        let base = self.server.public_base_url.clone().unwrap_or_else(|| {
            format!("http://{}:{}/", self.server.host, self.server.port)
        });
        if base.ends_with('/') {
            base
        } else {
            format!("{base}/")
        }
    }

    /// Socket address string to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Position assumed in prompts when the client sends none.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured fallback is out of range.
    pub fn fallback_position(&self) -> Result<Coordinate> {
        Coordinate::new(
            self.assistant.fallback_latitude,
            self.assistant.fallback_longitude,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert!(config.server.public_base_url.is_none());
        assert_eq!(config.conversation.capacity, 50);
        assert_eq!(config.conversation.context_window, 5);
        assert_eq!(config.assistant.city, "Almaty");
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("port"));
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = Config::default();
        config.conversation.capacity = 0;
        config.conversation.context_window = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("capacity"));
    }

    #[test]
    fn test_validate_window_larger_than_capacity() {
        let mut config = Config::default();
        config.conversation.capacity = 3;
        config.conversation.context_window = 4;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("context_window"));
    }

    #[test]
    fn test_validate_bad_fallback() {
        let mut config = Config::default();
        config.assistant.fallback_latitude = 123.0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("fallback"));
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let mut config = Config::default();
        config.server.public_base_url = Some("example.com".to_string());
        assert!(config.validate().is_err());

        config.server.public_base_url = Some("https://example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_default() {
        let config = Config::default();
        assert_eq!(config.base_url(), "http://127.0.0.1:5000/");
    }

    #[test]
    fn test_base_url_adds_trailing_slash() {
        let mut config = Config::default();
        config.server.public_base_url = Some("https://nav.example.com".to_string());
        assert_eq!(config.base_url(), "https://nav.example.com/");
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(Config::default().bind_address(), "127.0.0.1:5000");
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("smartala"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 8080\npublic_base_url = \"https://nav.example.com/\"\n\n[conversation]\ncapacity = 10"
        )
        .unwrap();

        let config = Config::load_from(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.conversation.capacity, 10);
        assert_eq!(config.base_url(), "https://nav.example.com/");
    }

    #[test]
    fn test_load_invalid_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[conversation]\ncapacity = 2\ncontext_window = 9").unwrap();

        let result = Config::load_from(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("context_window"));
        assert!(json.contains("fallback_latitude"));
    }

    #[test]
    fn test_server_config_deserialize() {
        let json = r#"{"port": 9000}"#;
        let server: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(server.port, 9000);
        assert_eq!(server.host, "127.0.0.1");
    }
}
