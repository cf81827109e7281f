//! Firmware update sequencing

use crate::{Adb, CommandRunner, DeviceError, Fastboot};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared cancellation flag checked during blocking waits.
///
/// Clones share the same flag; a signal handler holds one clone and the
/// driver's wait loop polls another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Steps of the update sequence, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStep {
    CheckAdb,
    RebootBootloader,
    CheckFastboot,
    FlashBoot,
    FlashSystem,
    RebootRuntime,
    WaitBootComplete,
}

impl UpdateStep {
    pub const SEQUENCE: [UpdateStep; 7] = [
        UpdateStep::CheckAdb,
        UpdateStep::RebootBootloader,
        UpdateStep::CheckFastboot,
        UpdateStep::FlashBoot,
        UpdateStep::FlashSystem,
        UpdateStep::RebootRuntime,
        UpdateStep::WaitBootComplete,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UpdateStep::CheckAdb => "check adb reachability",
            UpdateStep::RebootBootloader => "reboot to bootloader",
            UpdateStep::CheckFastboot => "check fastboot reachability",
            UpdateStep::FlashBoot => "flash boot image",
            UpdateStep::FlashSystem => "flash system image",
            UpdateStep::RebootRuntime => "reboot to runtime",
            UpdateStep::WaitBootComplete => "wait for boot complete",
        }
    }
}

/// Drives a device reflash: bootloader, flash boot+system, reboot, wait.
///
/// Steps run strictly in sequence and every failure is fatal to the
/// remaining steps. There are no retries; reflashing is not idempotent and a
/// failed flash leaves device state undefined.
pub struct UpdateDriver<R> {
    adb: Adb<R>,
    fastboot: Fastboot<R>,
    boot_timeout: Duration,
    poll_interval: Duration,
    cancel: CancelToken,
}

impl<R: CommandRunner> UpdateDriver<R> {
    pub fn new(adb: Adb<R>, fastboot: Fastboot<R>) -> Self {
        Self {
            adb,
            fastboot,
            boot_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(2),
            cancel: CancelToken::new(),
        }
    }

    /// Bound the boot-complete wait.
    pub fn with_timeout(mut self, boot_timeout: Duration, poll_interval: Duration) -> Self {
        self.boot_timeout = boot_timeout;
        self.poll_interval = poll_interval;
        self
    }

    /// Use an externally-owned cancel token (typically wired to SIGINT).
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Execute the full update sequence.
    pub fn run(&self, boot_image: &Path, system_image: &Path) -> Result<(), DeviceError> {
        let total = UpdateStep::SEQUENCE.len();
        for (i, step) in UpdateStep::SEQUENCE.iter().enumerate() {
            tracing::info!("Update step {}/{}: {}", i + 1, total, step.name());
            self.execute(*step, boot_image, system_image)?;
        }
        tracing::info!("Device update complete");
        Ok(())
    }

    fn execute(
        &self,
        step: UpdateStep,
        boot_image: &Path,
        system_image: &Path,
    ) -> Result<(), DeviceError> {
        match step {
            UpdateStep::CheckAdb => {
                let devices = self.adb.devices()?;
                if devices.is_empty() {
                    return Err(DeviceError::Unreachable("adb".to_string()));
                }
                tracing::debug!("adb devices: {:?}", devices);
                Ok(())
            }
            UpdateStep::RebootBootloader => self.adb.reboot_bootloader(),
            UpdateStep::CheckFastboot => {
                let devices = self.fastboot.devices()?;
                if devices.is_empty() {
                    return Err(DeviceError::Unreachable("fastboot".to_string()));
                }
                tracing::debug!("Fastboot devices: {:?}", devices);
                Ok(())
            }
            UpdateStep::FlashBoot => self.flash_checked("boot", boot_image),
            UpdateStep::FlashSystem => self.flash_checked("system", system_image),
            UpdateStep::RebootRuntime => self.fastboot.reboot(),
            UpdateStep::WaitBootComplete => self.wait_boot_complete(),
        }
    }

    fn flash_checked(&self, partition: &str, image: &Path) -> Result<(), DeviceError> {
        if !image.exists() {
            return Err(DeviceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("image not found: {}", image.display()),
            )));
        }
        self.fastboot.flash(partition, image)
    }

    /// Poll `sys.boot_completed` under a bounded deadline.
    ///
    /// adb errors while the device is still coming up count as "not ready";
    /// only the deadline or the cancel token ends the wait unsuccessfully.
    fn wait_boot_complete(&self) -> Result<(), DeviceError> {
        let deadline = Instant::now() + self.boot_timeout;

        loop {
            if self.cancel.is_cancelled() {
                return Err(DeviceError::Interrupted);
            }

            match self.adb.boot_completed() {
                Ok(true) => {
                    tracing::info!("Device reports boot complete");
                    return Ok(());
                }
                Ok(false) => tracing::debug!("Boot not complete yet"),
                Err(e) => tracing::debug!("Device not reachable yet: {}", e),
            }

            if Instant::now() >= deadline {
                return Err(DeviceError::Timeout(self.boot_timeout));
            }
            std::thread::sleep(self.poll_interval);
        }
    }
}
