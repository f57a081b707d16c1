// Pipeline constants (no magic values)

/// Default number of concurrent workers
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default YAML command file
pub const DEFAULT_CONFIG_PATH: &str = "command.yml";

/// Default domains input file
pub const DEFAULT_DOMAINS_PATH: &str = "domains.txt";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "results";

/// Default shell used to run command lines (`<shell> -c <line>`)
/// From ShellExecutor (infra-system)
pub const DEFAULT_SHELL: &str = "bash";

/// Merged output file, written inside the output directory
/// From consolidate
pub const CONSOLIDATED_FILE_NAME: &str = "all_results.txt";

/// First line of the merged output file
pub const CONSOLIDATED_HEADER: &str = "--- Deduplicated results ---";
