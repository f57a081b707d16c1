// Consolidation - merge every command's output file into one deduplicated file

use crate::application::worker::constants::{CONSOLIDATED_FILE_NAME, CONSOLIDATED_HEADER};
use crate::domain::Command;
use crate::error::Result;
use crate::port::Reporter;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub use crate::domain::{ConsolidationReport, SkipReason};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsolidateOptions {
    /// Sort lines before writing. Off by default: order is unspecified.
    pub sorted: bool,
}

/// Path of the merged file inside `output_dir`
pub fn consolidated_path(output_dir: &Path) -> PathBuf {
    output_dir.join(CONSOLIDATED_FILE_NAME)
}

/// Merge, trim and deduplicate the lines of every command's output file.
///
/// Missing or unreadable sources are reported and skipped. Only failing to
/// create or write the merged file is an error.
pub async fn consolidate(
    output_dir: &Path,
    commands: &[Command],
    options: ConsolidateOptions,
    reporter: &dyn Reporter,
) -> Result<ConsolidationReport> {
    let target = consolidated_path(output_dir);

    let mut unique: HashSet<String> = HashSet::new();
    let mut sources_read = 0;
    let mut sources_skipped = 0;

    for command in commands {
        let source = command.output_path(output_dir);

        if source == target {
            reporter.source_skipped(command, &source, &SkipReason::Reserved);
            sources_skipped += 1;
            continue;
        }

        match tokio::fs::read(&source).await {
            Ok(bytes) => {
                let before = unique.len();
                collect_lines(&String::from_utf8_lossy(&bytes), &mut unique);
                debug!(
                    command = %command.name,
                    new_lines = unique.len() - before,
                    "Collected output lines"
                );
                sources_read += 1;
            }
            Err(e) => {
                let reason = if e.kind() == ErrorKind::NotFound {
                    SkipReason::Missing
                } else {
                    SkipReason::Unreadable(e.to_string())
                };
                reporter.source_skipped(command, &source, &reason);
                sources_skipped += 1;
            }
        }
    }

    let mut lines: Vec<String> = unique.into_iter().collect();
    if options.sorted {
        lines.sort_unstable();
    }

    write_consolidated(&target, &lines).await?;

    let report = ConsolidationReport {
        path: target,
        sources_read,
        sources_skipped,
        unique_lines: lines.len(),
    };
    reporter.consolidated(&report);
    Ok(report)
}

/// Insert every trimmed, non-empty line of `content`
fn collect_lines(content: &str, unique: &mut HashSet<String>) {
    for line in content.lines() {
        let line = line.trim();
        if !line.is_empty() && !unique.contains(line) {
            unique.insert(line.to_string());
        }
    }
}

async fn write_consolidated(target: &Path, lines: &[String]) -> Result<()> {
    let mut body = String::with_capacity(
        CONSOLIDATED_HEADER.len() + 2 + lines.iter().map(|l| l.len() + 1).sum::<usize>(),
    );
    body.push_str(CONSOLIDATED_HEADER);
    body.push_str("\n\n");
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }

    let mut file = tokio::fs::File::create(target).await?;
    file.write_all(body.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::port::reporter::mocks::{RecordingReporter, ReportEvent};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("batchrun_consolidate_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn body_lines(path: &Path) -> Vec<String> {
        let text = std::fs::read_to_string(path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CONSOLIDATED_HEADER));
        assert_eq!(lines.next(), Some(""));
        lines.map(str::to_string).collect()
    }

    #[test]
    fn test_collect_lines_trims_and_drops_blanks() {
        let mut unique = HashSet::new();
        collect_lines("  a.example.com \n\n\t\nb.example.com\r\na.example.com\n", &mut unique);

        assert_eq!(unique.len(), 2);
        assert!(unique.contains("a.example.com"));
        assert!(unique.contains("b.example.com"));
    }

    #[tokio::test]
    async fn test_dedup_across_files() {
        let dir = temp_dir();
        std::fs::write(dir.join("one.txt"), "a\nb\na\n").unwrap();
        std::fs::write(dir.join("two.txt"), "b\nc\n\n").unwrap();
        let commands = vec![
            Command::new("one", "x", "one.txt"),
            Command::new("two", "y", "two.txt"),
        ];
        let reporter = RecordingReporter::new();

        let report = consolidate(&dir, &commands, ConsolidateOptions::default(), &reporter)
            .await
            .unwrap();

        assert_eq!(report.unique_lines, 3);
        assert_eq!(report.sources_read, 2);
        let mut lines = body_lines(&report.path);
        lines.sort();
        assert_eq!(lines, vec!["a", "b", "c"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_source_is_skipped() {
        let dir = temp_dir();
        std::fs::write(dir.join("present.txt"), "x.example.com\n").unwrap();
        let commands = vec![
            Command::new("present", "x", "present.txt"),
            Command::new("absent", "y", "absent.txt"),
        ];
        let reporter = RecordingReporter::new();

        let report = consolidate(&dir, &commands, ConsolidateOptions::default(), &reporter)
            .await
            .unwrap();

        assert_eq!(report.sources_skipped, 1);
        assert_eq!(body_lines(&report.path), vec!["x.example.com"]);
        assert_eq!(
            reporter.skipped(),
            vec![("absent".to_string(), SkipReason::Missing)]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_source_is_skipped() {
        let dir = temp_dir();
        // A directory where a file is expected cannot be read as one
        std::fs::create_dir_all(dir.join("subdir.txt")).unwrap();
        let commands = vec![Command::new("weird", "x", "subdir.txt")];
        let reporter = RecordingReporter::new();

        let report = consolidate(&dir, &commands, ConsolidateOptions::default(), &reporter)
            .await
            .unwrap();

        assert_eq!(report.unique_lines, 0);
        let skipped = reporter.skipped();
        assert_eq!(skipped.len(), 1);
        assert!(matches!(skipped[0].1, SkipReason::Unreadable(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_sorted_output() {
        let dir = temp_dir();
        std::fs::write(dir.join("s.txt"), "zeta\nalpha\nmu\nalpha\n").unwrap();
        let commands = vec![Command::new("s", "x", "s.txt")];

        let report = consolidate(
            &dir,
            &commands,
            ConsolidateOptions { sorted: true },
            &RecordingReporter::new(),
        )
        .await
        .unwrap();

        assert_eq!(body_lines(&report.path), vec!["alpha", "mu", "zeta"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_declared_output_colliding_with_merged_file() {
        let dir = temp_dir();
        std::fs::write(dir.join(CONSOLIDATED_FILE_NAME), "stale\n").unwrap();
        let commands = vec![Command::new("greedy", "x", CONSOLIDATED_FILE_NAME)];
        let reporter = RecordingReporter::new();

        let report = consolidate(&dir, &commands, ConsolidateOptions::default(), &reporter)
            .await
            .unwrap();

        assert_eq!(report.unique_lines, 0);
        assert_eq!(
            reporter.skipped(),
            vec![("greedy".to_string(), SkipReason::Reserved)]
        );
        assert!(body_lines(&report.path).is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_uncreatable_target_is_an_error() {
        let dir = temp_dir().join("does-not-exist");
        let reporter = RecordingReporter::new();

        let result = consolidate(&dir, &[], ConsolidateOptions::default(), &reporter).await;

        assert!(matches!(result, Err(AppError::Io(_))));
        assert!(!reporter
            .events()
            .iter()
            .any(|e| matches!(e, ReportEvent::Consolidated { .. })));
    }
}
