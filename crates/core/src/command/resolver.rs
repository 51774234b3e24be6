//! Chooses the final converter and player templates.

use serde::{Deserialize, Serialize};

use crate::config::ResolvedOptions;
use crate::platform::{default_commands, HostPlatform, PlatformDefaults};

/// Converter value that asks for the bundled tool.
pub const AUTO_SENTINEL: &str = "auto";

/// The converter and player templates a run will use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCommands {
    pub converter: String,
    pub player: String,
}

/// Applies the auto/default rules to the configured templates.
///
/// - An empty or `auto` converter is replaced by the platform converter,
///   and an empty player by the platform player.
/// - An explicit converter is kept; an empty player still gets the
///   platform player.
/// - An explicit player is always kept.
///
/// The platform is only inspected when a default is actually needed.
pub fn resolve_commands(options: &ResolvedOptions, host: &HostPlatform) -> ResolvedCommands {
    let wants_auto_converter = options.converter_template.is_empty()
        || options.converter_template.eq_ignore_ascii_case(AUTO_SENTINEL);
    let wants_default_player = options.player_template.is_empty();

    if !wants_auto_converter && !wants_default_player {
        return ResolvedCommands {
            converter: options.converter_template.clone(),
            player: options.player_template.clone(),
        };
    }

    let PlatformDefaults { converter, player } = default_commands(host);
    ResolvedCommands {
        converter: if wants_auto_converter {
            converter
        } else {
            options.converter_template.clone()
        },
        player: if wants_default_player {
            player
        } else {
            options.player_template.clone()
        },
    }
}
