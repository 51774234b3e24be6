//! Trait definitions for the runner module.

use async_trait::async_trait;

use super::types::{ArgumentVector, ExecutionResult};

/// Runs external programs to completion.
///
/// Implementations never fail: a program that cannot be started yields an
/// `ExecutionResult` with exit code 127.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs `argv` and waits for it to exit.
    async fn run(&self, argv: &ArgumentVector) -> ExecutionResult;
}
