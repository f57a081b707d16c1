// Worker Pool - fan-out over a shared queue, fan-in of JobResults

pub mod constants;
mod panic_guard;

pub use panic_guard::{describe_join_error, panic_message};

use crate::domain::{Command, ErrorInfo, JobResult};
use crate::error::{AppError, Result};
use crate::port::{Reporter, TaskExecutor, TimeProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Shared, read-only state handed to every worker
struct WorkerContext {
    executor: Arc<dyn TaskExecutor>,
    reporter: Arc<dyn Reporter>,
    time_provider: Arc<dyn TimeProvider>,
    domains_path: PathBuf,
    output_dir: PathBuf,
}

type JobQueue = Arc<Mutex<mpsc::Receiver<Command>>>;

/// Fixed-size pool of workers competing for commands on one queue
pub struct WorkerPool {
    executor: Arc<dyn TaskExecutor>,
    reporter: Arc<dyn Reporter>,
    time_provider: Arc<dyn TimeProvider>,
    concurrency: usize,
}

impl WorkerPool {
    /// Create a pool with `concurrency` workers (must be at least 1)
    pub fn new(
        executor: Arc<dyn TaskExecutor>,
        reporter: Arc<dyn Reporter>,
        time_provider: Arc<dyn TimeProvider>,
        concurrency: usize,
    ) -> Result<Self> {
        if concurrency == 0 {
            return Err(AppError::Validation(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            executor,
            reporter,
            time_provider,
            concurrency,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run every command exactly once and return one JobResult per command
    ///
    /// Blocks until all workers have exited. Individual failures (including a
    /// panicking executor) become failed JobResults; nothing aborts the run.
    /// Result order follows completion, not input order.
    pub async fn run(
        &self,
        commands: &[Command],
        domains_path: &Path,
        output_dir: &Path,
    ) -> Vec<JobResult> {
        let capacity = commands.len().max(1);
        let (job_tx, job_rx) = mpsc::channel::<Command>(capacity);
        let (result_tx, mut result_rx) = mpsc::channel::<JobResult>(capacity);

        self.reporter.workers_starting(self.concurrency, commands.len());

        // Queue holds every command, so the producer never blocks
        for command in commands {
            if let Err(e) = job_tx.try_send(command.clone()) {
                error!(command = %command.name, error = %e, "Failed to enqueue command");
            }
        }
        drop(job_tx);

        let jobs: JobQueue = Arc::new(Mutex::new(job_rx));
        let ctx = Arc::new(WorkerContext {
            executor: Arc::clone(&self.executor),
            reporter: Arc::clone(&self.reporter),
            time_provider: Arc::clone(&self.time_provider),
            domains_path: domains_path.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        });

        let mut workers = JoinSet::new();
        for worker_id in 1..=self.concurrency {
            workers.spawn(worker_loop(
                worker_id,
                Arc::clone(&jobs),
                result_tx.clone(),
                Arc::clone(&ctx),
            ));
        }
        drop(result_tx);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Worker task ended abnormally");
            }
        }

        let mut results = Vec::with_capacity(commands.len());
        while let Some(result) = result_rx.recv().await {
            results.push(result);
        }

        if results.len() != commands.len() {
            error!(
                expected = commands.len(),
                collected = results.len(),
                "Result count does not match command count"
            );
        }

        results
    }
}

async fn worker_loop(
    worker_id: usize,
    jobs: JobQueue,
    results: mpsc::Sender<JobResult>,
    ctx: Arc<WorkerContext>,
) {
    debug!(worker = worker_id, "Worker started");

    loop {
        // Lock is released before the command runs
        let next = jobs.lock().await.recv().await;
        let Some(command) = next else {
            break;
        };

        ctx.reporter.job_started(worker_id, &command);
        let result = execute_isolated(worker_id, command, &ctx).await;
        ctx.reporter.job_finished(&result);

        if results.send(result).await.is_err() {
            error!(worker = worker_id, "Result channel closed, worker stopping");
            break;
        }
    }

    debug!(worker = worker_id, "Worker stopped");
}

/// Execute one command in its own task so a panic cannot take the worker down
async fn execute_isolated(
    worker_id: usize,
    command: Command,
    ctx: &Arc<WorkerContext>,
) -> JobResult {
    let start = ctx.time_provider.now_millis();

    let exec_ctx = Arc::clone(ctx);
    let exec_command = command.clone();
    let handle = tokio::spawn(async move {
        exec_ctx
            .executor
            .execute(&exec_command, &exec_ctx.domains_path, &exec_ctx.output_dir)
            .await
    });
    let outcome = handle.await;

    let duration_ms = ctx.time_provider.now_millis() - start;

    match outcome {
        Ok(Ok(())) => JobResult::success(command, worker_id, duration_ms),
        Ok(Err(e)) => JobResult::failure(command, worker_id, duration_ms, e.into()),
        Err(join_err) => {
            let info = ErrorInfo::message_only(describe_join_error(join_err));
            JobResult::failure(command, worker_id, duration_ms, info)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::reporter::mocks::{RecordingReporter, ReportEvent};
    use crate::port::task_executor::mocks::{MockBehavior, MockTaskExecutor};
    use crate::port::time_provider::mocks::SteppingTimeProvider;
    use crate::port::time_provider::SystemTimeProvider;
    use std::collections::HashMap;
    use std::time::Duration;

    fn commands(n: usize) -> Vec<Command> {
        (0..n)
            .map(|i| Command::new(format!("cmd-{i}"), "true", format!("out-{i}.txt")))
            .collect()
    }

    fn pool(executor: Arc<MockTaskExecutor>, concurrency: usize) -> WorkerPool {
        WorkerPool::new(
            executor,
            Arc::new(RecordingReporter::new()),
            Arc::new(SystemTimeProvider),
            concurrency,
        )
        .unwrap()
    }

    fn name_counts(results: &[JobResult]) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for r in results {
            *counts.entry(r.command.name.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = WorkerPool::new(
            Arc::new(MockTaskExecutor::new_success()),
            Arc::new(RecordingReporter::new()),
            Arc::new(SystemTimeProvider),
            0,
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_every_command_yields_exactly_one_result() {
        for concurrency in [1, 3, 10] {
            let executor = Arc::new(MockTaskExecutor::new_success());
            let cmds = commands(25);

            let results = pool(executor.clone(), concurrency)
                .run(&cmds, Path::new("d.txt"), Path::new("out"))
                .await;

            assert_eq!(results.len(), 25);
            assert_eq!(executor.call_count(), 25);
            let counts = name_counts(&results);
            assert_eq!(counts.len(), 25);
            assert!(counts.values().all(|&c| c == 1));
        }
    }

    #[tokio::test]
    async fn test_more_workers_than_commands() {
        let executor = Arc::new(MockTaskExecutor::new_success());
        let cmds = commands(2);

        let results = pool(executor.clone(), 10)
            .run(&cmds, Path::new("d.txt"), Path::new("out"))
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(JobResult::is_success));
    }

    #[tokio::test]
    async fn test_empty_command_list() {
        let executor = Arc::new(MockTaskExecutor::new_success());

        let results = pool(executor.clone(), 4)
            .run(&[], Path::new("d.txt"), Path::new("out"))
            .await;

        assert!(results.is_empty());
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let executor = Arc::new(
            MockTaskExecutor::new_success()
                .with(
                    "cmd-1",
                    MockBehavior::Fail {
                        code: 2,
                        stderr: "resolver timeout".to_string(),
                    },
                )
                .with("cmd-3", MockBehavior::Panic("executor bug".to_string())),
        );
        let cmds = commands(5);

        let results = pool(executor.clone(), 2)
            .run(&cmds, Path::new("d.txt"), Path::new("out"))
            .await;

        assert_eq!(results.len(), 5);
        let by_name: HashMap<_, _> = results
            .iter()
            .map(|r| (r.command.name.as_str(), r))
            .collect();

        let failed = by_name["cmd-1"].error.as_ref().unwrap();
        assert_eq!(failed.stderr, "resolver timeout");

        let panicked = by_name["cmd-3"].error.as_ref().unwrap();
        assert!(panicked.message.contains("executor bug"));

        for name in ["cmd-0", "cmd-2", "cmd-4"] {
            assert!(by_name[name].is_success(), "{name} should succeed");
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let executor = Arc::new(MockTaskExecutor::new(MockBehavior::Delay(
            Duration::from_millis(20),
        )));
        let cmds = commands(12);

        let results = pool(executor.clone(), 3)
            .run(&cmds, Path::new("d.txt"), Path::new("out"))
            .await;

        assert_eq!(results.len(), 12);
        assert!(executor.max_in_flight() <= 3);
        assert!(executor.max_in_flight() >= 2);
    }

    #[tokio::test]
    async fn test_slow_command_does_not_block_other_workers() {
        let executor = Arc::new(
            MockTaskExecutor::new_success()
                .with("cmd-0", MockBehavior::Delay(Duration::from_millis(300))),
        );
        let cmds = commands(6);

        let results = pool(executor.clone(), 2)
            .run(&cmds, Path::new("d.txt"), Path::new("out"))
            .await;

        let slow_worker = results
            .iter()
            .find(|r| r.command.name == "cmd-0")
            .unwrap()
            .worker_id;
        let others_on_other_worker = results
            .iter()
            .filter(|r| r.command.name != "cmd-0" && r.worker_id != slow_worker)
            .count();
        assert_eq!(others_on_other_worker, 5);
    }

    #[tokio::test]
    async fn test_duration_measured_with_time_provider() {
        let pool = WorkerPool::new(
            Arc::new(MockTaskExecutor::new_success()),
            Arc::new(RecordingReporter::new()),
            Arc::new(SteppingTimeProvider::new(1_000, 7)),
            1,
        )
        .unwrap();

        let results = pool
            .run(&commands(1), Path::new("d.txt"), Path::new("out"))
            .await;

        assert_eq!(results[0].duration_ms, 7);
    }

    #[tokio::test]
    async fn test_reporter_sees_start_and_finish_per_command() {
        let reporter = Arc::new(RecordingReporter::new());
        let pool = WorkerPool::new(
            Arc::new(MockTaskExecutor::new_success().with(
                "cmd-2",
                MockBehavior::Fail {
                    code: 1,
                    stderr: String::new(),
                },
            )),
            reporter.clone(),
            Arc::new(SystemTimeProvider),
            2,
        )
        .unwrap();

        pool.run(&commands(3), Path::new("d.txt"), Path::new("out"))
            .await;

        let events = reporter.events();
        assert_eq!(
            events[0],
            ReportEvent::WorkersStarting {
                workers: 2,
                commands: 3
            }
        );
        let started = events
            .iter()
            .filter(|e| matches!(e, ReportEvent::JobStarted { .. }))
            .count();
        assert_eq!(started, 3);
        assert!(events.contains(&ReportEvent::JobFinished {
            name: "cmd-2".to_string(),
            success: false
        }));
    }
}
