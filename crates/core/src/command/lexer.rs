//! Shell-style word splitting.
//!
//! POSIX hosts use `shlex` (quotes and backslash escapes). Windows hosts use
//! `winsplit`, which follows the `CommandLineToArgvW` rules: double quotes
//! group words and backslashes are literal unless they precede a quote, so
//! paths like `C:\tools\hex2wav.exe` survive tokenization.

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;

use super::error::TemplateError;

/// Quoting convention used to split a command line into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// Single and double quotes, backslash escapes.
    Posix,
    /// `CommandLineToArgvW` rules: double quotes only, backslashes literal
    /// except before a quote.
    Windows,
}

impl QuoteStyle {
    /// The convention of the host this binary was built for.
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// Splits `command` into words.
pub fn tokenize(command: &str, style: QuoteStyle) -> Result<Vec<String>, TemplateError> {
    let words = match style {
        QuoteStyle::Posix => shlex::split(command),
        QuoteStyle::Windows if has_open_quote(command) => None,
        QuoteStyle::Windows => Some(winsplit::split(command)),
    };
    words.ok_or_else(|| TemplateError::malformed(command))
}

/// Renders words back into a single line, quoting where needed. Used for
/// logging only.
pub fn join<S: AsRef<OsStr>>(words: &[S], style: QuoteStyle) -> String {
    let words: Vec<String> = words
        .iter()
        .map(|w| w.as_ref().to_string_lossy().into_owned())
        .collect();
    match style {
        QuoteStyle::Posix => shlex::try_join(words.iter().map(String::as_str))
            .unwrap_or_else(|_| words.join(" ")),
        QuoteStyle::Windows => words
            .iter()
            .map(|w| quote_windows(w))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Whether a double-quoted part is left open at the end of `command`.
///
/// `winsplit` accepts such lines and runs the quote to the end; here they
/// are rejected like unbalanced POSIX quotes.
fn has_open_quote(command: &str) -> bool {
    let mut in_quote = false;
    let mut backslashes = 0usize;
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                backslashes += 1;
                continue;
            }
            '"' if backslashes % 2 == 0 => {
                if in_quote && chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quote = !in_quote;
                }
            }
            _ => {}
        }
        backslashes = 0;
    }

    in_quote
}

fn quote_windows(word: &str) -> String {
    if !word.is_empty() && !word.chars().any(|c| c.is_whitespace() || c == '"') {
        return word.to_string();
    }
    format!("\"{}\"", word.replace('"', "\\\""))
}
