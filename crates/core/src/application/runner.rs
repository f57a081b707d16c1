// Run Service - worker pool, then summary, then consolidation

use crate::application::consolidate::{consolidate, ConsolidateOptions};
use crate::application::worker::WorkerPool;
use crate::domain::{Config, ConsolidationReport, JobResult, Summary};
use crate::port::Reporter;
use std::path::PathBuf;
use std::sync::Arc;

/// Inputs for one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub domains_path: PathBuf,
    pub output_dir: PathBuf,
    pub sort: bool,
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunReport {
    pub results: Vec<JobResult>,
    pub summary: Summary,
    /// Consolidation outcome; an error here never affects `summary`
    pub consolidation: Result<ConsolidationReport, String>,
}

pub struct RunService {
    pool: WorkerPool,
    reporter: Arc<dyn Reporter>,
}

impl RunService {
    pub fn new(pool: WorkerPool, reporter: Arc<dyn Reporter>) -> Self {
        Self { pool, reporter }
    }

    /// Execute every command, merge their outputs and report the summary.
    ///
    /// Never fails: per-command and per-file problems are folded into the report.
    pub async fn run(&self, config: &Config, request: &RunRequest) -> RunReport {
        let results = self
            .pool
            .run(&config.commands, &request.domains_path, &request.output_dir)
            .await;

        let summary = Summary::from_results(&results);
        self.reporter.jobs_finished(&summary);

        let options = ConsolidateOptions {
            sorted: request.sort,
        };
        let consolidation = match consolidate(
            &request.output_dir,
            &config.commands,
            options,
            self.reporter.as_ref(),
        )
        .await
        {
            Ok(report) => Ok(report),
            Err(e) => {
                let message = e.to_string();
                self.reporter.consolidation_failed(&message);
                Err(message)
            }
        };

        self.reporter.summary(&summary);

        RunReport {
            results,
            summary,
            consolidation,
        }
    }
}
