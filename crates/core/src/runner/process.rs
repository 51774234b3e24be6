//! Process runner backed by `tokio::process`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::traits::ProcessRunner;
use super::types::{ArgumentVector, ExecutionResult};
use crate::command::{join, QuoteStyle};

/// Runs programs as child processes of the current process.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    working_dir: Option<PathBuf>,
    quote_style: QuoteStyle,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemRunner {
    /// Runs children in the caller's working directory.
    pub fn new() -> Self {
        Self {
            working_dir: None,
            quote_style: QuoteStyle::native(),
        }
    }

    /// Runs children in `dir` instead of the caller's working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the quoting used when logging command lines.
    pub fn with_quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote_style = style;
        self
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    fn name(&self) -> &str {
        "system"
    }

    async fn run(&self, argv: &ArgumentVector) -> ExecutionResult {
        info!("Running: {}", join(argv.as_slice(), self.quote_style));

        let program = argv.program().to_string_lossy();
        let mut command = Command::new(argv.program());
        command
            .args(argv.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = self.working_dir {
            command.current_dir(dir);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Command not found: {}", program);
                return ExecutionResult::not_found();
            }
            Err(e) => {
                warn!("Failed to start {}: {}", program, e);
                return ExecutionResult::not_found();
            }
        };

        let mut stdout = child.stdout.take().map(BufReader::new);
        let mut stderr = child.stderr.take().map(BufReader::new);
        let output = merge_output(&mut stdout, &mut stderr).await;

        let exit_code = match child.wait().await {
            Ok(status) => exit_code_of(status),
            Err(e) => {
                warn!("Failed to wait for {}: {}", program, e);
                1
            }
        };

        let text = String::from_utf8_lossy(&output).into_owned();
        if !text.trim().is_empty() {
            info!("{}", text.trim_end());
        }
        debug!("{} exited with code {}", program, exit_code);

        ExecutionResult::new(exit_code, text)
    }
}

/// Reads both streams to the end, interleaving lines as they arrive.
async fn merge_output<O, E>(stdout: &mut Option<O>, stderr: &mut Option<E>) -> Vec<u8>
where
    O: AsyncBufRead + Unpin,
    E: AsyncBufRead + Unpin,
{
    let mut merged = Vec::new();
    let mut out_line = Vec::new();
    let mut err_line = Vec::new();
    let mut out_open = stdout.is_some();
    let mut err_open = stderr.is_some();

    while out_open || err_open {
        tokio::select! {
            read = read_line(&mut *stdout, &mut out_line), if out_open => {
                if !matches!(read, Ok(n) if n > 0) {
                    out_open = false;
                }
                merged.append(&mut out_line);
            }
            read = read_line(&mut *stderr, &mut err_line), if err_open => {
                if !matches!(read, Ok(n) if n > 0) {
                    err_open = false;
                }
                merged.append(&mut err_line);
            }
        }
    }

    merged
}

async fn read_line<R>(reader: &mut Option<R>, buf: &mut Vec<u8>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    match reader {
        Some(r) => r.read_until(b'\n', buf).await,
        None => Ok(0),
    }
}

fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
