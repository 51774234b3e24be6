pub mod command;
pub mod config;
pub mod hook;
pub mod platform;
pub mod runner;
pub mod testing;

pub use command::{CommandTemplate, QuoteStyle, ResolvedCommands, TemplateError};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, BuildConfig,
    Config, ConfigError, OptionSource, OptionValue, ResolvedOptions,
};
pub use hook::{
    select_image, ArtifactPaths, BuildContext, ConversionHook, ConversionReport, HookError,
    HookState, Trigger, EXIT_CONFIG_ERROR,
};
pub use platform::{default_commands, HostPlatform, OsFamily, PlatformDefaults};
pub use runner::{ArgumentVector, ExecutionResult, ProcessRunner, SystemRunner};
