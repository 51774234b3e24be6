//! External process execution.
//!
//! `ProcessRunner` runs an argument vector to completion and reports its
//! exit code with stdout and stderr merged. A program that cannot be found
//! or started is reported as exit code 127 instead of an error, so callers
//! can treat it like any other failed tool.

mod process;
mod traits;
mod types;

pub use process::SystemRunner;
pub use traits::ProcessRunner;
pub use types::{ArgumentVector, EmptyArgumentVector, ExecutionResult, EXIT_NOT_FOUND};
