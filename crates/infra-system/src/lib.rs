// Batchrun Infrastructure - System Adapters
// Implements: TaskExecutor (shell), YAML config loading, output directory setup

pub mod config_loader;
pub mod output_dir;
pub mod shell_executor;

pub use config_loader::{load_config, ConfigError};
pub use output_dir::{prepare_output_dir, OutputDirError};
pub use shell_executor::ShellExecutor;
