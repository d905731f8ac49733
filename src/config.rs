//! Service configuration loaded from TOML.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//! allowed_origins = ["https://www.triponbuddy.com"]
//!
//! [search]
//! max_concurrent_requests = 50
//! cache_ttl_seconds = 3600
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::path::{Path, PathBuf};

use scenery_search::ImageSearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "SCENERY_CONFIG";

/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "PORT";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneryConfig {
    /// HTTP listener and CORS settings.
    pub server: ServerConfig,
    /// Image resolution pipeline settings.
    pub search: ImageSearchConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind. `0` picks a free port.
    pub port: u16,
    /// Origins allowed to call the API from a browser. `"*"` allows any;
    /// a trailing `:*` allows any port.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8000,
            allowed_origins: vec![
                "https://www.triponbuddy.com".to_owned(),
                "http://localhost:*".to_owned(),
            ],
        }
    }
}

impl SceneryConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/scenery/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("scenery").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("scenery")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/scenery-config/config.toml")
        }
    }

    /// Load the configuration the service should run with.
    ///
    /// Reads the file named by `SCENERY_CONFIG`, or the default path. A
    /// missing file means defaults. `PORT` overrides the listen port. The
    /// result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be parsed, `PORT` is not
    /// a port number, or the search settings are invalid.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);

        let mut config = if path.exists() {
            tracing::info!(path = %path.display(), "loading config");
            Self::from_file(&path)?
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        if let Ok(port) = std::env::var(PORT_ENV) {
            config.server.port = port
                .trim()
                .parse()
                .map_err(|e| ServerError::Config(format!("invalid {PORT_ENV} {port:?}: {e}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the search settings.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Search`] if any search limit is invalid.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        Ok(())
    }

    /// The `host:port` string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
