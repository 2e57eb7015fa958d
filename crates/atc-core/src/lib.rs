pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::{
    ConfigManager, LlmConfig, LoggingConfig, SecretsConfig, ServerConfig, Settings,
};
pub use error::*;
pub use types::*;
