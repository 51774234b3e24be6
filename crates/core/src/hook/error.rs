//! Error types for the hook module.

use thiserror::Error;

use crate::command::TemplateError;

/// Errors that stop a conversion run before any program is started.
#[derive(Debug, Error)]
pub enum HookError {
    /// A converter or player template cannot be turned into a command.
    #[error("Invalid {step} command: {source}")]
    Configuration {
        step: &'static str,
        #[source]
        source: TemplateError,
    },

    /// The post-build action was not given a firmware image.
    #[error("No firmware image among post-build targets or sources")]
    NoImage,
}

impl HookError {
    /// Creates a configuration error for the given step ("converter" or "player").
    pub fn configuration(step: &'static str, source: TemplateError) -> Self {
        Self::Configuration { step, source }
    }
}
