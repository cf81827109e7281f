//! adb command wrappers

use crate::{CommandOutput, CommandRunner, DeviceError};

/// Wraps the `adb` host tool, optionally pinned to one device serial.
#[derive(Debug, Clone)]
pub struct Adb<R> {
    runner: R,
    serial: Option<String>,
}

impl<R: CommandRunner> Adb<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            serial: None,
        }
    }

    /// Target a specific device (`adb -s <serial>`).
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput, DeviceError> {
        let mut full: Vec<&str> = Vec::with_capacity(args.len() + 2);
        if let Some(serial) = &self.serial {
            full.push("-s");
            full.push(serial);
        }
        full.extend_from_slice(args);

        let output = self.runner.run("adb", &full)?;
        if !output.success {
            return Err(DeviceError::Command {
                program: "adb".to_string(),
                detail: output.detail(),
            });
        }
        Ok(output)
    }

    /// Serials of connected devices in the `device` state.
    pub fn devices(&self) -> Result<Vec<String>, DeviceError> {
        let output = self.run(&["devices"])?;
        Ok(parse_device_list(&output.stdout))
    }

    /// Reboot the device into the bootloader.
    pub fn reboot_bootloader(&self) -> Result<(), DeviceError> {
        self.run(&["reboot", "bootloader"])?;
        tracing::info!("Rebooting device into bootloader");
        Ok(())
    }

    /// Probe whether the device reports boot completion.
    ///
    /// A failing command means the device is not reachable yet; callers
    /// polling during boot treat that the same as "not complete".
    pub fn boot_completed(&self) -> Result<bool, DeviceError> {
        let output = self.run(&["shell", "getprop", "sys.boot_completed"])?;
        Ok(output.stdout.trim() == "1")
    }

    /// Run an arbitrary `adb shell` command. Used by the provider store.
    pub fn shell(&self, args: &[&str]) -> Result<CommandOutput, DeviceError> {
        let mut full: Vec<&str> = Vec::with_capacity(args.len() + 1);
        full.push("shell");
        full.extend_from_slice(args);
        self.run(&full)
    }
}

/// Parse `adb devices` output into serials with the `device` state.
fn parse_device_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with("List of devices") {
                return None;
            }
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            match fields.next() {
                Some("device") => Some(serial.to_string()),
                _ => None,
            }
        })
        .collect()
}
