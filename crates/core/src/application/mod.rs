// Application Layer - Use Cases

pub mod consolidate;
pub mod runner;
pub mod worker;

// Re-exports
pub use consolidate::{consolidate, ConsolidateOptions};
pub use runner::{RunReport, RunRequest, RunService};
pub use worker::WorkerPool;
