//! Mock process runner for testing.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::runner::{ArgumentVector, ExecutionResult, ProcessRunner};

/// The canned outcome of one mocked invocation.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRun {
    pub exit_code: i32,
    pub output: String,
    /// File to create before returning, standing in for the tool's output.
    pub creates: Option<PathBuf>,
}

impl ScriptedRun {
    /// Exit code 0, no output.
    pub fn success() -> Self {
        Self::default()
    }

    /// Exits with `code`.
    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Default::default()
        }
    }

    /// Sets the combined output.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Creates `path` when the run happens.
    pub fn creating(mut self, path: impl Into<PathBuf>) -> Self {
        self.creates = Some(path.into());
        self
    }
}

/// Mock implementation of the ProcessRunner trait.
///
/// Provides controllable behavior for testing:
/// - Record every argument vector it is asked to run
/// - Answer with scripted exit codes and output, in order
/// - Create the expected output file, like a real converter would
/// - Report selected programs as missing (exit code 127)
///
/// Unscripted runs succeed with no output. Clones share state, so a test
/// can keep a handle after moving the runner into a hook.
///
/// # Example
///
/// ```rust,ignore
/// use hexwav_core::testing::{MockRunner, ScriptedRun};
///
/// let runner = MockRunner::new();
/// runner.push(ScriptedRun::success().creating("/build/firmware.wav")).await;
/// runner.push(ScriptedRun::exit(1)).await;
///
/// let hook = ConversionHook::new(runner.clone(), options);
/// hook.run(Trigger::OnDemand, &paths).await?;
///
/// assert_eq!(runner.call_count().await, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    /// Recorded invocations.
    calls: Arc<RwLock<Vec<ArgumentVector>>>,
    /// Outcomes for upcoming invocations.
    script: Arc<RwLock<VecDeque<ScriptedRun>>>,
    /// Programs that behave as if they were not installed.
    missing: Arc<RwLock<HashSet<OsString>>>,
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next unscripted invocation.
    pub async fn push(&self, run: ScriptedRun) {
        self.script.write().await.push_back(run);
    }

    /// Make `program` behave as if it were not installed.
    pub async fn set_missing(&self, program: impl Into<OsString>) {
        self.missing.write().await.insert(program.into());
    }

    /// Get all recorded invocations.
    pub async fn calls(&self) -> Vec<ArgumentVector> {
        self.calls.read().await.clone()
    }

    /// Get the number of invocations.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl ProcessRunner for MockRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(&self, argv: &ArgumentVector) -> ExecutionResult {
        self.calls.write().await.push(argv.clone());

        if self.missing.read().await.contains(argv.program()) {
            return ExecutionResult::not_found();
        }

        let run = self.script.write().await.pop_front().unwrap_or_default();
        if let Some(path) = run.creates {
            if let Some(parent) = path.parent() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
            let _ = tokio::fs::write(&path, b"RIFF").await;
        }

        ExecutionResult::new(run.exit_code, run.output)
    }
}
