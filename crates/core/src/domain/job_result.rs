// JobResult & ErrorInfo - the outcome of running one command

use std::fmt;

use super::command::Command;

/// Diagnostic detail for a failed command (message + captured stderr)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    pub stderr: String,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stderr: stderr.into(),
        }
    }

    /// Failure with no captured stderr (spawn errors, panics)
    pub fn message_only(message: impl Into<String>) -> Self {
        Self::new(message, String::new())
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            write!(f, "\n--- stderr ---\n{}", stderr)?;
        }
        Ok(())
    }
}

/// Outcome of one command. Produced once by a worker, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub command: Command,
    pub worker_id: usize,
    pub duration_ms: i64,
    pub error: Option<ErrorInfo>,
}

impl JobResult {
    pub fn success(command: Command, worker_id: usize, duration_ms: i64) -> Self {
        Self {
            command,
            worker_id,
            duration_ms,
            error: None,
        }
    }

    pub fn failure(command: Command, worker_id: usize, duration_ms: i64, error: ErrorInfo) -> Self {
        Self {
            command,
            worker_id,
            duration_ms,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
