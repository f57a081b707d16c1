// Consolidation outcome types

use std::fmt;
use std::path::PathBuf;

/// Why a command's output file contributed nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// File does not exist
    Missing,
    /// File exists but could not be read
    Unreadable(String),
    /// Declared output collides with the consolidated file itself
    Reserved,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Missing => write!(f, "file not found"),
            SkipReason::Unreadable(err) => write!(f, "unreadable: {}", err),
            SkipReason::Reserved => write!(f, "name reserved for the merged results file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub path: PathBuf,
    pub sources_read: usize,
    pub sources_skipped: usize,
    pub unique_lines: usize,
}
