//! Types for the runner module.

use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};

/// Exit code reported when the program could not be found or started.
pub const EXIT_NOT_FOUND: i32 = 127;

/// A program followed by its arguments. Never empty.
///
/// Words are OS strings so paths reach the child byte for byte. Serialized
/// as a list of strings; non-UTF-8 bytes are replaced in that form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ArgumentVector(Vec<OsString>);

impl ArgumentVector {
    /// Returns `None` if `words` is empty.
    pub fn new<I, S>(words: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let words: Vec<OsString> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            None
        } else {
            Some(Self(words))
        }
    }

    /// The executable name or path.
    pub fn program(&self) -> &OsStr {
        &self.0[0]
    }

    pub fn args(&self) -> &[OsString] {
        &self.0[1..]
    }

    pub fn as_slice(&self) -> &[OsString] {
        &self.0
    }
}

/// Error for an argument vector without a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyArgumentVector;

impl std::fmt::Display for EmptyArgumentVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("argument vector must contain a program")
    }
}

impl TryFrom<Vec<String>> for ArgumentVector {
    type Error = EmptyArgumentVector;

    fn try_from(words: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(words).ok_or(EmptyArgumentVector)
    }
}

impl From<ArgumentVector> for Vec<String> {
    fn from(argv: ArgumentVector) -> Self {
        argv.0
            .into_iter()
            .map(|word| word.to_string_lossy().into_owned())
            .collect()
    }
}

/// Outcome of running one external program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub exit_code: i32,
    /// stdout and stderr, interleaved in arrival order.
    pub combined_output: String,
}

impl ExecutionResult {
    pub fn new(exit_code: i32, combined_output: impl Into<String>) -> Self {
        Self {
            exit_code,
            combined_output: combined_output.into(),
        }
    }

    /// Result for a program that could not be located or started.
    pub fn not_found() -> Self {
        Self::new(EXIT_NOT_FOUND, "")
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
