// Domain Layer - Pure entities, no I/O

pub mod command;
pub mod consolidation;
pub mod error;
pub mod job_result;
pub mod summary;

// Re-exports
pub use command::{Command, Config, RenderedCommand, DOMAINS_TOKEN, OUTPUT_TOKEN};
pub use consolidation::{ConsolidationReport, SkipReason};
pub use error::DomainError;
pub use job_result::{ErrorInfo, JobResult};
pub use summary::{FailedCommand, Summary};
