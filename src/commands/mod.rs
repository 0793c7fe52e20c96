//! Command Handlers Module
//!
//! This module contains handlers for all CLI subcommands. Device work is
//! blocking, so each handler moves it onto the blocking thread pool.

pub mod demo;
pub mod media;
pub mod position;
pub mod read;
pub mod sense;
pub mod write;

use scsi_tape::config::DeviceConfig;
use scsi_tape::display;
use scsi_tape::error::Result;
use scsi_tape::scsi::{Device, DeviceStatus};
use tracing::warn;

/// Settings shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub config: DeviceConfig,
    pub json: bool,
}

/// Run blocking work on the blocking pool and wait for it
pub async fn run_blocking<F, R>(work: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(anyhow::Error::from)?
}

/// Open `device`, run `work` against it, and close it again
pub async fn with_device<F, R>(device: String, options: &Options, work: F) -> Result<R>
where
    F: FnOnce(&mut Device) -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    let config = options.config.clone();
    run_blocking(move || {
        let mut handle = Device::open_with_config(&device, config)?;
        let result = work(&mut handle);
        handle.close();
        result
    })
    .await
}

/// Print a status and warn when the command did not succeed
pub fn report(label: &str, status: &DeviceStatus, options: &Options) -> Result<()> {
    display::print_status(label, status, options.json)?;
    if !status.is_success() {
        warn!("{} finished with outcome {:?}", status.kind(), status.outcome());
    }
    Ok(())
}
