// Task Executor Port
// Abstraction for running one command against the domains file

use crate::domain::{Command, ErrorInfo};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process exited with status {code}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Process terminated by signal")]
    Terminated { stderr: String },

    #[error("IO error: {0}")]
    IoError(String),
}

impl ExecutionError {
    /// Captured stderr, if the process got far enough to produce any
    pub fn stderr(&self) -> &str {
        match self {
            ExecutionError::NonZeroExit { stderr, .. } | ExecutionError::Terminated { stderr } => {
                stderr
            }
            ExecutionError::SpawnFailed(_) | ExecutionError::IoError(_) => "",
        }
    }
}

impl From<ExecutionError> for ErrorInfo {
    fn from(err: ExecutionError) -> Self {
        ErrorInfo::new(err.to_string(), err.stderr())
    }
}

/// Task Executor trait
///
/// Implementations:
/// - ShellExecutor (infra-system): runs the rendered line through a shell
/// - MockTaskExecutor: scripted behaviour per command name
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Run `command` with `{domains}` and `{output}` substituted
    ///
    /// Success means the process exited with status 0. Whether the output file
    /// was actually written is the command's own responsibility.
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the shell cannot be started
    /// - ExecutionError::NonZeroExit / Terminated carry the captured stderr
    async fn execute(
        &self,
        command: &Command,
        domains_path: &Path,
        output_dir: &Path,
    ) -> Result<(), ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit 0
        Success,
        /// Exit 0 after writing these lines to the command's output file
        WriteLines(Vec<String>),
        /// Non-zero exit with this stderr
        Fail { code: i32, stderr: String },
        /// Panic with message (for panic isolation testing)
        Panic(String),
        /// Sleep, then succeed
        Delay(Duration),
    }

    /// Mock Task Executor for testing
    ///
    /// Behaviour is looked up by command name, falling back to a default.
    pub struct MockTaskExecutor {
        default: MockBehavior,
        overrides: HashMap<String, MockBehavior>,
        call_count: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        executed: Mutex<Vec<String>>,
    }

    impl MockTaskExecutor {
        pub fn new(default: MockBehavior) -> Self {
            Self {
                default,
                overrides: HashMap::new(),
                call_count: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                executed: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn with(mut self, name: impl Into<String>, behavior: MockBehavior) -> Self {
            self.overrides.insert(name.into(), behavior);
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Highest number of concurrent `execute` calls observed
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        /// Names of executed commands, in call order
        pub fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }

        fn behavior_for(&self, name: &str) -> MockBehavior {
            self.overrides
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.default.clone())
        }
    }

    struct InFlight<'a>(&'a AtomicUsize);

    impl Drop for InFlight<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TaskExecutor for MockTaskExecutor {
        async fn execute(
            &self,
            command: &Command,
            _domains_path: &Path,
            output_dir: &Path,
        ) -> Result<(), ExecutionError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.executed.lock().unwrap().push(command.name.clone());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _guard = InFlight(&self.in_flight);

            match self.behavior_for(&command.name) {
                MockBehavior::Success => Ok(()),
                MockBehavior::WriteLines(lines) => {
                    let mut body = lines.join("\n");
                    body.push('\n');
                    tokio::fs::write(command.output_path(output_dir), body)
                        .await
                        .map_err(|e| ExecutionError::IoError(e.to_string()))
                }
                MockBehavior::Fail { code, stderr } => {
                    Err(ExecutionError::NonZeroExit { code, stderr })
                }
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
                MockBehavior::Delay(duration) => {
                    tokio::time::sleep(duration).await;
                    Ok(())
                }
            }
        }
    }
}
