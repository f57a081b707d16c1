// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid command #{index}: {reason}")]
    InvalidCommand { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
