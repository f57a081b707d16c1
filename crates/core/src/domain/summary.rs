// Run Summary - JobResults partitioned into counts and failure details

use super::job_result::{ErrorInfo, JobResult};

/// One failed command, as it appears in the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCommand {
    pub name: String,
    pub error: ErrorInfo,
}

/// Counts plus failure details for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<FailedCommand>,
}

impl Summary {
    pub fn from_results(results: &[JobResult]) -> Self {
        let failures: Vec<FailedCommand> = results
            .iter()
            .filter_map(|r| {
                r.error.as_ref().map(|error| FailedCommand {
                    name: r.command.name.clone(),
                    error: error.clone(),
                })
            })
            .collect();

        Self {
            total: results.len(),
            succeeded: results.len() - failures.len(),
            failures,
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
