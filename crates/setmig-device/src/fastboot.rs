//! fastboot command wrappers

use crate::{CommandOutput, CommandRunner, DeviceError};
use std::path::Path;

/// Wraps the `fastboot` host tool, optionally pinned to one device serial.
#[derive(Debug, Clone)]
pub struct Fastboot<R> {
    runner: R,
    serial: Option<String>,
}

impl<R: CommandRunner> Fastboot<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            serial: None,
        }
    }

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

        let output = self.runner.run("fastboot", &full)?;
        if !output.success {
            return Err(DeviceError::Command {
                program: "fastboot".to_string(),
                detail: output.detail(),
            });
        }
        Ok(output)
    }

    /// Serials of devices currently in fastboot mode.
    pub fn devices(&self) -> Result<Vec<String>, DeviceError> {
        let output = self.run(&["devices"])?;
        let serials = output
            .stdout
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect();
        Ok(serials)
    }

    /// Flash an image into a named partition.
    pub fn flash(&self, partition: &str, image: &Path) -> Result<(), DeviceError> {
        let image_str = image.to_string_lossy();
        tracing::info!("Flashing {} into partition '{}'", image.display(), partition);
        self.run(&["flash", partition, &image_str])?;
        Ok(())
    }

    /// Reboot out of fastboot into the normal runtime.
    pub fn reboot(&self) -> Result<(), DeviceError> {
        self.run(&["reboot"])?;
        tracing::info!("Rebooting device into runtime");
        Ok(())
    }
}
