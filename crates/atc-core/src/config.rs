use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config as cfg;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Environment variable the provider credential is read from when no
/// configuration source supplied one.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Upper bound for `llm.max_retries`; backoff doubles per attempt.
pub const MAX_RETRIES_LIMIT: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// Upstream chat-completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the API; `/chat/completions` is appended
    #[serde(default = "LlmConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "LlmConfig::default_model")]
    pub model: String,
    /// Sampling temperature; omitted from the upstream request when unset
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Completion length cap; omitted from the upstream request when unset
    #[serde(default)]
    pub max_tokens: Option<usize>,
    /// Explicit request timeout. Unset leaves it to the HTTP client defaults.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Extra attempts after a failed upstream call, with exponential backoff
    #[serde(default)]
    pub max_retries: u32,
}

impl LlmConfig {
    fn default_base_url() -> String {
        OPENAI_API_BASE.to_string()
    }

    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            temperature: None,
            max_tokens: None,
            timeout_secs: None,
            max_retries: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecretsConfig {
    // Do not serialize secrets; allow deserialization from config/env only.
    #[serde(default, skip_serializing)]
    pub openai_api_key: Option<SecretString>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "Settings::default_env")]
    pub env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Self::default_env(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            llm: LlmConfig::default(),
            secrets: SecretsConfig::default(),
        }
    }
}

impl Settings {
    fn default_env() -> String {
        env::var("APP_ENV")
            .ok()
            .or_else(|| env::var("RUST_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.server.host.trim().is_empty(),
            "server.host cannot be empty"
        );
        anyhow::ensure!(self.server.port > 0, "server.port must be > 0");
        anyhow::ensure!(
            !self.llm.base_url.trim().is_empty(),
            "llm.base_url cannot be empty"
        );
        anyhow::ensure!(!self.llm.model.trim().is_empty(), "llm.model cannot be empty");
        if let Some(t) = self.llm.temperature {
            anyhow::ensure!(
                (0.0..=2.0).contains(&t),
                "llm.temperature must be within 0.0..=2.0"
            );
        }
        if let Some(max) = self.llm.max_tokens {
            anyhow::ensure!(max > 0, "llm.max_tokens must be > 0");
        }
        if let Some(secs) = self.llm.timeout_secs {
            anyhow::ensure!(secs > 0, "llm.timeout_secs must be > 0");
        }
        anyhow::ensure!(
            self.llm.max_retries <= MAX_RETRIES_LIMIT,
            "llm.max_retries must be <= {}",
            MAX_RETRIES_LIMIT
        );
        Ok(())
    }

    /// Fill the credential from `value` unless a configuration source already set one.
    ///
    /// Both the existing and the fallback value are trimmed; blank values count as unset.
    pub fn with_fallback_credential(mut self, value: Option<String>) -> Self {
        let current = self
            .secrets
            .openai_api_key
            .take()
            .map(|k| k.expose_secret().to_string());
        self.secrets.openai_api_key = current
            .and_then(trimmed_non_blank)
            .or_else(|| value.and_then(trimmed_non_blank))
            .map(SecretString::from);
        self
    }
}

fn trimmed_non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Loads layered [`Settings`] once at process start.
#[derive(Debug)]
pub struct ConfigManager {
    settings: Settings,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Load `.env`, then every configuration source, then validate.
    pub fn load(env_override: Option<String>, dir_override: Option<PathBuf>) -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {:?}", path);
        }
        let env_name = env_override.unwrap_or_else(Settings::default_env);
        let config_dir = Self::get_config_dir(dir_override);
        let mut settings = Self::load_from_sources(&config_dir, &env_name)?
            .with_fallback_credential(env::var(OPENAI_API_KEY_ENV).ok());
        settings.env = env_name;
        settings.validate()?;
        Ok(Self {
            settings,
            config_dir,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Get the default configuration directory.
    ///
    /// Priority order:
    /// 1. ~/.atc-explain/ (user-level config)
    /// 2. ./config/ (project-level config)
    /// 3. Current directory (fallback)
    pub fn default_config_dir() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let user_dir = home_dir.join(".atc-explain");
            if user_dir.exists() {
                info!("Using config directory: {:?}", user_dir);
                return user_dir;
            }
        }

        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            info!("Using config directory: {:?}", project_config);
            return project_config;
        }

        info!("Using config directory: {:?}", cwd);
        cwd
    }

    pub fn get_config_dir(custom_path: Option<PathBuf>) -> PathBuf {
        custom_path.unwrap_or_else(Self::default_config_dir)
    }

    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Settings> {
        let settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(cfg::File::from(config_dir.join("default.yaml")).required(false))
            .add_source(cfg::File::from(config_dir.join("default.json")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.yaml", env_name))).required(false),
            )
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.json", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(cfg::Environment::with_prefix("ATC").separator("__"))
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")?;
        Ok(settings)
    }
}
