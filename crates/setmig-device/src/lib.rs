//! Device control channel for setmig
//!
//! Everything that talks to a physical device lives here: process execution
//! behind the [`CommandRunner`] seam, `adb`/`fastboot` wrappers, the content
//! provider settings store, and the [`UpdateDriver`] that sequences a
//! reflash. All commands run strictly sequentially; a failed device command
//! is fatal to the remaining sequence because a half-flashed device is in an
//! undefined state and continuing would invalidate validation results.
//!
//! # Example
//!
//! ```no_run
//! use setmig_device::{Adb, Fastboot, SystemRunner, UpdateDriver};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let runner = SystemRunner::new();
//!     let driver = UpdateDriver::new(Adb::new(runner.clone()), Fastboot::new(runner));
//!     driver.run(Path::new("boot.img"), Path::new("system.img"))?;
//!     Ok(())
//! }
//! ```

mod adb;
mod driver;
mod fastboot;
pub mod mock;
mod provider;
mod runner;

pub use adb::Adb;
pub use driver::{CancelToken, UpdateDriver, UpdateStep};
pub use fastboot::Fastboot;
pub use provider::ProviderStore;
pub use runner::{CommandOutput, CommandRunner, SystemRunner};

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("{program} failed: {detail}")]
    Command { program: String, detail: String },

    #[error("No device reachable over {0}")]
    Unreachable(String),

    #[error("Timed out after {0:?} waiting for boot complete")]
    Timeout(Duration),

    #[error("Interrupted while waiting for device")]
    Interrupted,

    #[error("Malformed provider row: {0}")]
    MalformedRow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
