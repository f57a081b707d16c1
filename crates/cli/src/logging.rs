//! Logging setup
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives (default: `batchrun=info`)
//! - `BATCHRUN_LOG_FORMAT`: `pretty` (default), `compact` or `json`
//! - `BATCHRUN_LOG_DIR`: also write plain-text logs to a daily-rolling file here
//!
//! Console logs go to stderr so stdout stays reserved for command output.

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "batchrun=info";
const LOG_FILE_PREFIX: &str = "batchrun.log";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must live until exit.
pub fn init_logging() -> Result<Option<WorkerGuard>> {
    let log_format =
        std::env::var("BATCHRUN_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;

    let (file_layer, guard) = match std::env::var("BATCHRUN_LOG_DIR") {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    match log_format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        "compact" => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()?,
        _ => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()?,
    }

    Ok(guard)
}
