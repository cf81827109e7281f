//! Scripted command runner for testing without real devices
//!
//! Rules match on program name plus a substring of the joined argument list;
//! the first matching rule supplies the output. Unmatched commands succeed
//! with empty output, so tests only script what they care about.
//!
//! # Usage
//!
//! ```
//! use setmig_device::mock::MockRunner;
//! use setmig_device::CommandRunner;
//!
//! let runner = MockRunner::new()
//!     .respond("adb", "devices", "List of devices attached\nSER1\tdevice\n")
//!     .fail("fastboot", "flash system", "FAILED (remote failure)");
//!
//! let out = runner.run("adb", &["devices"]).unwrap();
//! assert!(out.stdout.contains("SER1"));
//! ```

use crate::{CommandOutput, CommandRunner, DeviceError};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Rule {
    program: String,
    needle: String,
    output: CommandOutput,
}

/// Scripted [`CommandRunner`] recording every invocation.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    rules: Arc<Mutex<Vec<Rule>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with `stdout` when `program` is run with arguments containing
    /// `needle`.
    pub fn respond(
        self,
        program: impl Into<String>,
        needle: impl Into<String>,
        stdout: impl Into<String>,
    ) -> Self {
        self.push_rule(program, needle, CommandOutput::with_stdout(stdout));
        self
    }

    /// Fail with `stderr` when `program` is run with arguments containing
    /// `needle`.
    pub fn fail(
        self,
        program: impl Into<String>,
        needle: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        self.push_rule(program, needle, CommandOutput::failed(stderr));
        self
    }

    fn push_rule(
        &self,
        program: impl Into<String>,
        needle: impl Into<String>,
        output: CommandOutput,
    ) {
        self.rules.lock().unwrap().push(Rule {
            program: program.into(),
            needle: needle.into(),
            output,
        });
    }

    /// Every command run so far, as `"program arg arg ..."` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, DeviceError> {
        let joined = args.join(" ");
        self.calls
            .lock()
            .unwrap()
            .push(format!("{program} {joined}").trim_end().to_string());

        let rules = self.rules.lock().unwrap();
        for rule in rules.iter() {
            if rule.program == program && joined.contains(&rule.needle) {
                return Ok(rule.output.clone());
            }
        }
        Ok(CommandOutput::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_commands_succeed() {
        let runner = MockRunner::new();
        let out = runner.run("adb", &["reboot", "bootloader"]).unwrap();
        assert!(out.success);
        assert_eq!(runner.calls(), vec!["adb reboot bootloader"]);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let runner = MockRunner::new()
            .respond("adb", "getprop", "1\n")
            .fail("adb", "getprop", "unreachable");

        let out = runner.run("adb", &["shell", "getprop", "x"]).unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "1\n");
    }
}
