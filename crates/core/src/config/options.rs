//! Layered option lookup.
//!
//! Every option is looked up under its namespaced key first (`custom_` +
//! name), then under the bare legacy key, then falls back to a default.

use serde::{Deserialize, Serialize};

use super::types::Config;

/// Prefix of the preferred option keys.
pub const OPTION_PREFIX: &str = "custom_";

/// Converter command template. Empty or `auto` selects the bundled tool.
pub const CONVERTER_CMD_KEY: &str = "hex2wav_cmd";
/// Whether to play the WAV after a successful conversion.
pub const AUTO_PLAY_KEY: &str = "hex2wav_auto_play";
/// Player command template. Empty selects the platform player.
pub const PLAYER_CMD_KEY: &str = "hex2wav_player_cmd";

const TRUTHY: [&str; 4] = ["1", "yes", "true", "on"];

/// A key-value view of the project configuration.
pub trait OptionSource {
    /// Returns the value configured for `key`, or `None` if it is absent.
    fn get_option(&self, key: &str) -> Option<String>;
}

impl<T: OptionSource + ?Sized> OptionSource for &T {
    fn get_option(&self, key: &str) -> Option<String> {
        (**self).get_option(key)
    }
}

impl OptionSource for Config {
    fn get_option(&self, key: &str) -> Option<String> {
        self.options.get(key).map(|v| v.to_string())
    }
}

/// Looks up `name` under the namespaced key, then the bare key, then
/// returns `default`.
pub fn resolve_option(source: &impl OptionSource, name: &str, default: &str) -> String {
    source
        .get_option(&format!("{}{}", OPTION_PREFIX, name))
        .or_else(|| source.get_option(name))
        .unwrap_or_else(|| default.to_string())
}

/// Whether an option value means "enabled".
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    TRUTHY.contains(&value.as_str())
}

/// The three hook options, read once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOptions {
    /// Trimmed converter template; empty when unset.
    pub converter_template: String,
    /// Trimmed player template; empty when unset.
    pub player_template: String,
    pub auto_play: bool,
}

impl ResolvedOptions {
    pub fn from_source(source: &impl OptionSource) -> Self {
        let converter_template = resolve_option(source, CONVERTER_CMD_KEY, "")
            .trim()
            .to_string();
        let auto_play = is_truthy(&resolve_option(source, AUTO_PLAY_KEY, "no"));
        let player_template = resolve_option(source, PLAYER_CMD_KEY, "")
            .trim()
            .to_string();

        Self {
            converter_template,
            player_template,
            auto_play,
        }
    }
}
