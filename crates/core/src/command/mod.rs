//! Command resolution and template expansion.
//!
//! Turns the configured converter/player templates into concrete argument
//! vectors:
//!
//! 1. `resolve_commands` picks the templates (explicit, or platform default)
//! 2. `CommandTemplate::parse` validates quoting once
//! 3. `CommandTemplate::expand` splits the line into words using the host's
//!    quoting rules, then substitutes `{input}` / `{output}` in each word
//!
//! # Example
//!
//! ```ignore
//! use hexwav_core::command::{resolve_commands, CommandTemplate, QuoteStyle};
//!
//! let commands = resolve_commands(&options, &HostPlatform::current());
//! let template = CommandTemplate::parse(&commands.converter, QuoteStyle::native())?;
//! let argv = template.expand(Path::new("build/firmware.hex"), Path::new("build/firmware.wav"))?;
//! ```

mod error;
mod lexer;
mod resolver;
mod template;

pub use error::TemplateError;
pub use lexer::{join, tokenize, QuoteStyle};
pub use resolver::{resolve_commands, ResolvedCommands, AUTO_SENTINEL};
pub use template::{
    ensure_program_resolved, expand, substitute, CommandTemplate, INPUT_PLACEHOLDER,
    LEGACY_INPUT_PLACEHOLDER, LEGACY_OUTPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER,
};
