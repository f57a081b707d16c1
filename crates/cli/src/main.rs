//! Batchrun - run a list of shell commands against one domains file with
//! bounded parallelism, then merge their outputs into one deduplicated file.

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use batchrun_core::application::worker::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_CONFIG_PATH, DEFAULT_DOMAINS_PATH, DEFAULT_OUTPUT_DIR,
    DEFAULT_SHELL,
};
use batchrun_core::application::{RunRequest, RunService, WorkerPool};
use batchrun_core::port::time_provider::SystemTimeProvider;
use batchrun_core::port::{Reporter, TracingReporter};
use batchrun_infra_system::{load_config, prepare_output_dir, ShellExecutor};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command templates are trusted input: `{domains}` and `{output}` are
/// substituted verbatim and the result is handed to the shell unescaped.
#[derive(Parser, Debug)]
#[command(name = "batchrun")]
#[command(about = "Run configured shell commands concurrently and merge their results", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML file with the `commands` list
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// File substituted for {domains}
    #[arg(long, default_value = DEFAULT_DOMAINS_PATH)]
    domains: PathBuf,

    /// Directory for per-command outputs and all_results.txt
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Number of commands to run at the same time
    #[arg(
        short = 'c',
        long,
        env = "BATCHRUN_CONCURRENCY",
        default_value_t = DEFAULT_CONCURRENCY,
        value_parser = parse_concurrency
    )]
    concurrency: usize,

    /// Remove the output directory before running
    #[arg(long)]
    clean: bool,

    /// Sort the merged results instead of writing them in arbitrary order
    #[arg(long)]
    sort: bool,

    /// Shell used as `<shell> -c <command line>`
    #[arg(long, env = "BATCHRUN_SHELL", default_value = DEFAULT_SHELL)]
    shell: String,
}

/// Worker count must be at least 1
fn parse_concurrency(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    let _log_guard = logging::init_logging().context("Failed to initialize logging")?;

    info!("Batchrun v{} starting...", VERSION);

    run(cli).await
}

/// Startup checks, then the run itself.
///
/// Everything that can reject the invocation happens before the output
/// directory is touched.
async fn run(cli: Cli) -> Result<()> {
    // 2. Load configuration (fatal on failure)
    let config = load_config(&cli.config)
        .await
        .with_context(|| format!("Failed to load config '{}'", cli.config.display()))?;

    // 3. Setup dependencies (DI wiring)
    let reporter: Arc<dyn Reporter> = Arc::new(TracingReporter);
    let executor = Arc::new(ShellExecutor::new(cli.shell));
    let pool = WorkerPool::new(
        executor,
        reporter.clone(),
        Arc::new(SystemTimeProvider),
        cli.concurrency,
    )
    .context("Invalid concurrency")?;
    let service = RunService::new(pool, reporter);

    // 4. Prepare output directory (fatal on failure)
    prepare_output_dir(&cli.output, cli.clean)
        .await
        .context("Failed to prepare output directory")?;

    if !cli.domains.exists() {
        warn!(path = %cli.domains.display(), "Domains file does not exist");
    }

    // 5. Run, consolidate, report. Per-command failures do not change the exit code.
    let request = RunRequest {
        domains_path: cli.domains,
        output_dir: cli.output,
        sort: cli.sort,
    };
    let report = service.run(&config, &request).await;

    if let Ok(consolidation) = &report.consolidation {
        info!(path = %consolidation.path.display(), "Done");
    }

    Ok(())
}
