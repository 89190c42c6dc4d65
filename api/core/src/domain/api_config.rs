// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// API Configuration Types
//
// Defines the configuration schema for a CI API process, including:
// - Deployment site (org / com), fixed for the process lifetime
// - HTTP listener settings
// - Insights service endpoint and credentials
// - Encryption key for env var values

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::insights::Site;

/// Top-level API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Deployment site; changes the insights authorization rule
    #[serde(default = "default_site")]
    pub site: Site,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub insights: InsightsConfig,

    #[serde(default)]
    pub encryption: EncryptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Base URL of the insights service; `/metrics` is appended
    #[serde(default)]
    pub endpoint: String,

    /// Service credential sent as `Authorization: Token token="..."`
    #[serde(default)]
    pub auth_token: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncryptionConfig {
    /// Base64-encoded 256-bit key
    #[serde(default)]
    pub key: String,
}

fn default_site() -> Site {
    Site::Org
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            site: default_site(),
            http: HttpConfig::default(),
            insights: InsightsConfig::default(),
            encryption: EncryptionConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            auth_token: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. CI_API_CONFIG_PATH environment variable
    /// 2. ./ci-api-config.yaml (working directory)
    /// 3. ~/.ci-api/config.yaml (user home)
    /// 4. /etc/ci-api/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("CI_API_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./ci-api-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".ci-api").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/ci-api/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load from an explicit path (which must exist), else discover, else defaults.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CI_API_SITE") {
            match val.parse::<Site>() {
                Ok(site) => self.site = site,
                Err(e) => tracing::warn!("Ignoring CI_API_SITE: {}", e),
            }
        }
        if let Ok(val) = std::env::var("CI_API_INSIGHTS_ENDPOINT") {
            self.insights.endpoint = val;
        }
        if let Ok(val) = std::env::var("CI_API_INSIGHTS_TOKEN") {
            self.insights.auth_token = val;
        }
        if let Ok(val) = std::env::var("CI_API_ENCRYPTION_KEY") {
            self.encryption.key = val;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.insights.endpoint.is_empty() {
            anyhow::bail!("insights.endpoint cannot be empty");
        }
        let endpoint = url::Url::parse(&self.insights.endpoint)
            .map_err(|e| anyhow::anyhow!("insights.endpoint is not a valid URL: {}", e))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("insights.endpoint must use http or https, got '{}'", endpoint.scheme());
        }

        if self.insights.auth_token.is_empty() {
            anyhow::bail!("insights.auth_token cannot be empty");
        }

        if self.insights.timeout_seconds == 0 {
            anyhow::bail!("insights.timeout_seconds must be greater than 0");
        }

        let key = base64::engine::general_purpose::STANDARD
            .decode(&self.encryption.key)
            .map_err(|e| anyhow::anyhow!("encryption.key is not valid base64: {}", e))?;
        if key.len() != 32 {
            anyhow::bail!("encryption.key must decode to 32 bytes, got {}", key.len());
        }

        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }
}
