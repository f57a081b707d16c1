// Port Layer - Interfaces for external dependencies

pub mod reporter;
pub mod task_executor;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use reporter::{Reporter, TracingReporter};
pub use task_executor::{ExecutionError, TaskExecutor};
pub use time_provider::TimeProvider;
