// Reporter Port
// Injected collaborator for progress, warnings and the final summary

use crate::domain::{Command, ConsolidationReport, JobResult, SkipReason, Summary};
use std::path::Path;
use tracing::{error, info, warn};

/// Receives everything the pipeline wants an operator to see.
///
/// Components never log run events through ambient state; they call the
/// reporter they were constructed with.
pub trait Reporter: Send + Sync {
    fn workers_starting(&self, workers: usize, commands: usize);

    fn job_started(&self, worker_id: usize, command: &Command);

    fn job_finished(&self, result: &JobResult);

    /// Every worker has exited; `summary` covers all commands
    fn jobs_finished(&self, summary: &Summary);

    fn source_skipped(&self, command: &Command, path: &Path, reason: &SkipReason);

    fn consolidated(&self, report: &ConsolidationReport);

    fn consolidation_failed(&self, error: &str);

    fn summary(&self, summary: &Summary);
}

/// Reporter backed by `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn workers_starting(&self, workers: usize, commands: usize) {
        info!(workers, commands, "Starting workers");
    }

    fn job_started(&self, worker_id: usize, command: &Command) {
        info!(worker = worker_id, command = %command.name, "Command started");
    }

    fn job_finished(&self, result: &JobResult) {
        match &result.error {
            None => info!(
                worker = result.worker_id,
                command = %result.command.name,
                duration_ms = result.duration_ms,
                "Command finished"
            ),
            Some(err) => error!(
                worker = result.worker_id,
                command = %result.command.name,
                duration_ms = result.duration_ms,
                error = %err,
                "Command failed"
            ),
        }
    }

    fn jobs_finished(&self, summary: &Summary) {
        info!(
            total = summary.total,
            failed = summary.failed(),
            "All commands finished"
        );
    }

    fn source_skipped(&self, command: &Command, path: &Path, reason: &SkipReason) {
        warn!(
            command = %command.name,
            path = %path.display(),
            reason = %reason,
            "Skipping output file"
        );
    }

    fn consolidated(&self, report: &ConsolidationReport) {
        info!(
            path = %report.path.display(),
            sources_read = report.sources_read,
            sources_skipped = report.sources_skipped,
            unique_lines = report.unique_lines,
            "Results consolidated"
        );
    }

    fn consolidation_failed(&self, error: &str) {
        error!(error = %error, "Consolidation failed");
    }

    fn summary(&self, summary: &Summary) {
        info!("--- Execution summary ---");
        info!(total = summary.total, "Total commands");
        info!(succeeded = summary.succeeded, "Succeeded");
        info!(failed = summary.failed(), "Failed");
        for failure in &summary.failures {
            error!(command = %failure.name, error = %failure.error, "Failed command");
        }
        info!("-------------------------");
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Recorded reporter call
    #[derive(Debug, Clone, PartialEq)]
    pub enum ReportEvent {
        WorkersStarting { workers: usize, commands: usize },
        JobStarted { worker_id: usize, name: String },
        JobFinished { name: String, success: bool },
        JobsFinished { total: usize, failed: usize },
        SourceSkipped { name: String, path: PathBuf, reason: SkipReason },
        Consolidated { unique_lines: usize },
        ConsolidationFailed(String),
        Summary { total: usize, succeeded: usize, failed: Vec<String> },
    }

    /// Reporter that records every call for assertions
    #[derive(Default)]
    pub struct RecordingReporter {
        events: Mutex<Vec<ReportEvent>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ReportEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn skipped(&self) -> Vec<(String, SkipReason)> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    ReportEvent::SourceSkipped { name, reason, .. } => Some((name, reason)),
                    _ => None,
                })
                .collect()
        }

        fn push(&self, event: ReportEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl Reporter for RecordingReporter {
        fn workers_starting(&self, workers: usize, commands: usize) {
            self.push(ReportEvent::WorkersStarting { workers, commands });
        }

        fn job_started(&self, worker_id: usize, command: &Command) {
            self.push(ReportEvent::JobStarted {
                worker_id,
                name: command.name.clone(),
            });
        }

        fn job_finished(&self, result: &JobResult) {
            self.push(ReportEvent::JobFinished {
                name: result.command.name.clone(),
                success: result.is_success(),
            });
        }

        fn jobs_finished(&self, summary: &Summary) {
            self.push(ReportEvent::JobsFinished {
                total: summary.total,
                failed: summary.failed(),
            });
        }

        fn source_skipped(&self, command: &Command, path: &Path, reason: &SkipReason) {
            self.push(ReportEvent::SourceSkipped {
                name: command.name.clone(),
                path: path.to_path_buf(),
                reason: reason.clone(),
            });
        }

        fn consolidated(&self, report: &ConsolidationReport) {
            self.push(ReportEvent::Consolidated {
                unique_lines: report.unique_lines,
            });
        }

        fn consolidation_failed(&self, error: &str) {
            self.push(ReportEvent::ConsolidationFailed(error.to_string()));
        }

        fn summary(&self, summary: &Summary) {
            self.push(ReportEvent::Summary {
                total: summary.total,
                succeeded: summary.succeeded,
                failed: summary.failures.iter().map(|f| f.name.clone()).collect(),
            });
        }
    }
}
