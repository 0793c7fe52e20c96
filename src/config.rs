//! Device configuration
//!
//! Timeouts and transport tuning, loadable from a JSON file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, ScsiTapeError};
use crate::scsi::constants::{MAX_SENSE_LEN, MIN_SENSE_LEN, SENSE_INFO_LEN};
use crate::scsi::types::TimeoutClass;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Timeout for commands that complete without mechanical motion
    pub short_timeout_secs: u64,
    /// Timeout for rewind, space, locate, erase and load operations
    pub long_timeout_secs: u64,
    /// Bytes reserved for sense data on every command
    pub sense_buffer_len: u8,
    /// Open the device node with `O_EXCL`
    pub exclusive: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            short_timeout_secs: 30,
            long_timeout_secs: 600,
            sense_buffer_len: SENSE_INFO_LEN as u8,
            exclusive: false,
        }
    }
}

impl DeviceConfig {
    /// Read and validate a JSON configuration file. Missing keys keep their
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))?;
        let config: DeviceConfig = serde_json::from_str(&text)
            .map_err(|e| ScsiTapeError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.short_timeout_secs == 0 || self.long_timeout_secs == 0 {
            return Err(ScsiTapeError::config("timeouts must be at least one second"));
        }
        // SG_IO carries the timeout in milliseconds as a u32
        let max_secs = u64::from(u32::MAX) / 1000;
        if self.short_timeout_secs > max_secs || self.long_timeout_secs > max_secs {
            return Err(ScsiTapeError::config(format!(
                "timeouts must not exceed {} seconds",
                max_secs
            )));
        }
        if !(MIN_SENSE_LEN..=MAX_SENSE_LEN).contains(&usize::from(self.sense_buffer_len)) {
            return Err(ScsiTapeError::config(format!(
                "sense_buffer_len must be in the range {}..={}",
                MIN_SENSE_LEN, MAX_SENSE_LEN
            )));
        }
        Ok(())
    }

    pub fn timeout_for(&self, class: TimeoutClass) -> Duration {
        match class {
            TimeoutClass::Short => Duration::from_secs(self.short_timeout_secs),
            TimeoutClass::Long => Duration::from_secs(self.long_timeout_secs),
        }
    }
}
