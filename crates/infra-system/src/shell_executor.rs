// Shell executor - runs rendered command lines through `<shell> -c`
use async_trait::async_trait;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command as Process;
use tracing::{debug, info, warn};

use batchrun_core::application::worker::constants::DEFAULT_SHELL;
use batchrun_core::domain::Command;
use batchrun_core::port::task_executor::{ExecutionError, TaskExecutor};

const STDERR_CHUNK_SIZE: usize = 4096;

/// Runs commands through a shell interpreter.
///
/// Stdout is inherited so operators see tool output live. Stderr is teed: it is
/// copied to this process's stderr and kept in memory for the failure report.
/// No timeout is applied; a hung command holds its worker until it exits.
pub struct ShellExecutor {
    shell: String,
    passthrough: bool,
}

impl ShellExecutor {
    /// Create an executor that runs `<shell> -c <line>`
    ///
    /// # Example
    /// ```ignore
    /// let executor = ShellExecutor::new("bash");
    /// ```
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            passthrough: true,
        }
    }

    /// Capture stderr without echoing anything to this process's streams
    pub fn quiet(mut self) -> Self {
        self.passthrough = false;
        self
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Spawn the shell and wait for it while teeing stderr
    async fn spawn_and_wait(&self, line: &str) -> Result<(ExitStatus, String), ExecutionError> {
        let stdout = if self.passthrough {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        let mut child = Process::new(&self.shell)
            .arg("-c")
            .arg(line)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", self.shell, e)))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExecutionError::IoError("stderr pipe not captured".to_string()))?;

        let passthrough = self.passthrough;
        let (status, captured) = tokio::join!(child.wait(), async move {
            if passthrough {
                tee(stderr, tokio::io::stderr()).await
            } else {
                tee(stderr, tokio::io::sink()).await
            }
        });

        let status = status.map_err(|e| ExecutionError::IoError(e.to_string()))?;
        Ok((status, captured))
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

/// Copy `source` into `sink` until EOF, returning everything read
async fn tee<R, W>(mut source: R, mut sink: W) -> String
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut captured = Vec::new();
    let mut chunk = [0u8; STDERR_CHUNK_SIZE];

    loop {
        match source.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                captured.extend_from_slice(&chunk[..n]);
                if let Err(e) = sink.write_all(&chunk[..n]).await {
                    debug!(error = %e, "Failed to echo stderr chunk");
                }
            }
            Err(e) => {
                warn!(error = %e, "Stopped reading child stderr");
                break;
            }
        }
    }
    let _ = sink.flush().await;

    String::from_utf8_lossy(&captured).into_owned()
}

fn status_to_result(status: ExitStatus, stderr: String) -> Result<(), ExecutionError> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(ExecutionError::NonZeroExit { code, stderr }),
        None => Err(ExecutionError::Terminated { stderr }),
    }
}

#[async_trait]
impl TaskExecutor for ShellExecutor {
    async fn execute(
        &self,
        command: &Command,
        domains_path: &Path,
        output_dir: &Path,
    ) -> Result<(), ExecutionError> {
        let rendered = command.render(domains_path, output_dir);

        info!(
            command = %command.name,
            output = %rendered.output_path.display(),
            "Starting shell execution"
        );
        debug!(command = %command.name, line = %rendered.line, shell = %self.shell, "Rendered command line");

        let (status, stderr) = self.spawn_and_wait(&rendered.line).await?;

        info!(
            command = %command.name,
            exit_code = ?status.code(),
            "Shell execution completed"
        );

        status_to_result(status, stderr)
    }
}
