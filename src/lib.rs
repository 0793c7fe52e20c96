//! scsi-tape Library
//!
//! Issue SCSI commands to sequential-access (tape) devices through the host
//! pass-through interface and decode the returned status and sense data.
//!
//! ```no_run
//! use scsi_tape::scsi::commands::{Read6, Rewind};
//! use scsi_tape::scsi::Device;
//!
//! # fn main() -> scsi_tape::Result<()> {
//! let mut device = Device::open("/dev/nst0")?;
//! println!("{}", device.issue_cmd(&Rewind::new())?);
//!
//! let mut buf = [0u8; 80];
//! let status = device.issue_cmd_with_output(&Read6::variable(80), &mut buf)?;
//! println!("{}", status);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logger;
pub mod scsi;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export key types for easier use
pub use config::DeviceConfig;
pub use error::{Result, ScsiTapeError, TransportError};
pub use scsi::{
    Command, CommandDetail, CommandKind, DataBuffer, Device, DeviceStatus, Outcome, Sense,
    SenseKey, Transport,
};
