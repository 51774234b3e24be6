mod loader;
mod options;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_env, load_config_from_str};
pub use options::{
    is_truthy, resolve_option, OptionSource, ResolvedOptions, AUTO_PLAY_KEY, CONVERTER_CMD_KEY,
    OPTION_PREFIX, PLAYER_CMD_KEY,
};
pub use types::*;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
