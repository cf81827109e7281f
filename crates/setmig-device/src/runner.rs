//! External process execution

use crate::DeviceError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Captured output of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful, empty output.
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// A successful output with the given stdout.
    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed output with the given stderr.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// stderr if non-empty, otherwise stdout, trimmed. Used for error detail.
    pub fn detail(&self) -> String {
        let s = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        s.trim().to_string()
    }
}

/// Seam over external process execution.
///
/// Production uses [`SystemRunner`]; tests use [`crate::mock::MockRunner`].
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, DeviceError>;
}

/// Runs commands through `std::process`, resolving tools via `PATH`.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    overrides: HashMap<String, PathBuf>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit binary path for `program` instead of a `PATH` lookup.
    pub fn with_override(mut self, program: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(program.into(), path.into());
        self
    }

    fn resolve(&self, program: &str) -> Result<PathBuf, DeviceError> {
        if let Some(path) = self.overrides.get(program) {
            return Ok(path.clone());
        }
        which::which(program).map_err(|_| DeviceError::ToolNotFound(program.to_string()))
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, DeviceError> {
        let path = self.resolve(program)?;
        tracing::debug!("Running {} {}", path.display(), args.join(" "));

        let output = Command::new(&path)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
