// Command & Config - the unit of work and the loaded command list

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{DomainError, Result};

/// Token replaced with the domains input path
pub const DOMAINS_TOKEN: &str = "{domains}";

/// Token replaced with the command's joined output path
pub const OUTPUT_TOKEN: &str = "{output}";

/// One named shell command template plus its declared output file.
///
/// Templates are trusted configuration input. Rendering replaces exactly the two
/// literal tokens and performs no quoting or sanitization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(rename = "cmd")]
    pub template: String,
    /// Output file name, relative to the output directory
    pub output: String,
}

/// A command line ready to hand to a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    pub line: String,
    pub output_path: PathBuf,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            output: output.into(),
        }
    }

    /// Path of this command's output file under `output_dir`
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.output)
    }

    /// Substitute `{domains}` and `{output}` in the template
    pub fn render(&self, domains_path: &Path, output_dir: &Path) -> RenderedCommand {
        let output_path = self.output_path(output_dir);
        let line = self
            .template
            .replace(DOMAINS_TOKEN, &domains_path.to_string_lossy())
            .replace(OUTPUT_TOKEN, &output_path.to_string_lossy());

        RenderedCommand { line, output_path }
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.template.trim().is_empty() {
            return Err(DomainError::InvalidCommand {
                index,
                reason: format!("'cmd' of '{}' is empty", self.name),
            });
        }
        if self.output.trim().is_empty() {
            return Err(DomainError::InvalidCommand {
                index,
                reason: format!("'output' of '{}' is empty", self.name),
            });
        }
        if Path::new(&self.output).is_absolute() {
            return Err(DomainError::InvalidCommand {
                index,
                reason: format!(
                    "'output' of '{}' must be relative to the output directory",
                    self.name
                ),
            });
        }
        Ok(())
    }
}

/// Ordered list of commands, loaded once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Config {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// Reject entries that cannot be rendered into a meaningful command line.
    /// Names are only used for reporting and are not checked.
    pub fn validate(&self) -> Result<()> {
        self.commands
            .iter()
            .enumerate()
            .try_for_each(|(index, command)| command.validate(index))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
