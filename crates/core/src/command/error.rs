//! Error types for command templates.

use thiserror::Error;

/// Errors that make a command template unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template (or its expansion) contains no words.
    #[error("Command template is empty")]
    Empty,

    /// Quoting or escaping could not be parsed.
    #[error("Malformed quoting in command: {command}")]
    Malformed { command: String },

    /// The program position still holds a `{placeholder}` after expansion.
    #[error("Unresolved placeholder used as program: {program}")]
    UnresolvedProgram { program: String },
}

impl TemplateError {
    /// Creates a malformed-quoting error for the given command string.
    pub fn malformed(command: impl Into<String>) -> Self {
        Self::Malformed {
            command: command.into(),
        }
    }

    /// Creates an unresolved-program error.
    pub fn unresolved_program(program: impl Into<String>) -> Self {
        Self::UnresolvedProgram {
            program: program.into(),
        }
    }
}
