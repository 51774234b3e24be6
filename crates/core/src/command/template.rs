//! Command templates with `{input}` / `{output}` placeholders.

use std::ffi::OsString;
use std::path::Path;

use super::error::TemplateError;
use super::lexer::{tokenize, QuoteStyle};
use crate::runner::ArgumentVector;

/// Replaced by the firmware image path.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Replaced by the WAV output path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";
/// Older spelling of `{input}`.
pub const LEGACY_INPUT_PLACEHOLDER: &str = "{hex}";
/// Older spelling of `{output}`.
pub const LEGACY_OUTPUT_PLACEHOLDER: &str = "{wav}";

/// A validated command template.
///
/// Validation happens once, when the template is parsed: it must contain at
/// least one word and its quoting must be well formed under `style`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    raw: String,
    style: QuoteStyle,
}

impl CommandTemplate {
    pub fn parse(raw: &str, style: QuoteStyle) -> Result<Self, TemplateError> {
        let raw = raw.trim();
        if tokenize(raw, style)?.is_empty() {
            return Err(TemplateError::Empty);
        }
        Ok(Self {
            raw: raw.to_string(),
            style,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the template mentions the input path in either spelling.
    pub fn uses_input(&self) -> bool {
        self.raw.contains(INPUT_PLACEHOLDER) || self.raw.contains(LEGACY_INPUT_PLACEHOLDER)
    }

    /// Whether the template mentions the output path in either spelling.
    pub fn uses_output(&self) -> bool {
        self.raw.contains(OUTPUT_PLACEHOLDER) || self.raw.contains(LEGACY_OUTPUT_PLACEHOLDER)
    }

    /// Splits the template into words and substitutes both placeholders.
    pub fn expand(&self, input: &Path, output: &Path) -> Result<ArgumentVector, TemplateError> {
        expand(&self.raw, input, output, self.style)
    }
}

/// Which path a placeholder stands for.
#[derive(Clone, Copy)]
enum Slot {
    Input,
    Output,
}

const PLACEHOLDERS: [(&str, Slot); 4] = [
    (INPUT_PLACEHOLDER, Slot::Input),
    (LEGACY_INPUT_PLACEHOLDER, Slot::Input),
    (OUTPUT_PLACEHOLDER, Slot::Output),
    (LEGACY_OUTPUT_PLACEHOLDER, Slot::Output),
];

/// Replaces the placeholders in one template word with the given paths.
///
/// The paths are spliced in as OS strings, so non-UTF-8 bytes and quote
/// characters in them reach the program unchanged.
pub fn substitute(word: &str, input: &Path, output: &Path) -> OsString {
    let mut result = OsString::with_capacity(word.len());
    let mut rest = word;

    while let Some((start, placeholder, slot)) = next_placeholder(rest) {
        result.push(&rest[..start]);
        result.push(match slot {
            Slot::Input => input.as_os_str(),
            Slot::Output => output.as_os_str(),
        });
        rest = &rest[start + placeholder.len()..];
    }
    result.push(rest);
    result
}

fn next_placeholder(text: &str) -> Option<(usize, &'static str, Slot)> {
    PLACEHOLDERS
        .iter()
        .filter_map(|&(placeholder, slot)| text.find(placeholder).map(|i| (i, placeholder, slot)))
        .min_by_key(|&(i, _, _)| i)
}

/// Tokenizes `template` and substitutes the placeholders in each word.
///
/// Splitting happens before substitution: a path always becomes part of
/// the word its placeholder was in, whatever characters it contains.
pub fn expand(
    template: &str,
    input: &Path,
    output: &Path,
    style: QuoteStyle,
) -> Result<ArgumentVector, TemplateError> {
    let words = tokenize(template, style)?;
    ArgumentVector::new(words.iter().map(|word| substitute(word, input, output)))
        .ok_or(TemplateError::Empty)
}

/// Rejects argument vectors whose program is still a `{placeholder}`.
pub fn ensure_program_resolved(argv: &ArgumentVector) -> Result<(), TemplateError> {
    let Some(program) = argv.program().to_str() else {
        return Ok(());
    };
    if program.len() > 2 && program.starts_with('{') && program.ends_with('}') {
        return Err(TemplateError::unresolved_program(program));
    }
    Ok(())
}
