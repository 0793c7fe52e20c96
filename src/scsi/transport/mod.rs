//! Transport Adapter
//!
//! Boundary to the host's generic SCSI pass-through facility. A transport
//! carries one serialized CDB plus an optional data buffer to the device and
//! returns the raw completion; it never retries and never interprets sense
//! data.

use std::time::Duration;

use crate::error::TransportError;

use super::types::DataDirection;

#[cfg(target_os = "linux")]
mod sg;
#[cfg(target_os = "linux")]
pub use sg::SgTransport;

#[cfg(windows)]
mod spt;
#[cfg(windows)]
pub use spt::SptTransport;

pub mod stub;

/// Transport used by `Device::open` on this platform
#[cfg(target_os = "linux")]
pub type PlatformTransport = SgTransport;
#[cfg(windows)]
pub type PlatformTransport = SptTransport;
#[cfg(not(any(target_os = "linux", windows)))]
pub type PlatformTransport = unsupported::UnsupportedTransport;

/// Data phase of a command, borrowing the caller's buffer for the call
#[derive(Debug)]
pub enum DataBuffer<'a> {
    None,
    ToDevice(&'a [u8]),
    FromDevice(&'a mut [u8]),
}

impl DataBuffer<'_> {
    pub fn direction(&self) -> DataDirection {
        match self {
            DataBuffer::None => DataDirection::None,
            DataBuffer::ToDevice(_) => DataDirection::ToDevice,
            DataBuffer::FromDevice(_) => DataDirection::FromDevice,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DataBuffer::None => 0,
            DataBuffer::ToDevice(buf) => buf.len(),
            DataBuffer::FromDevice(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw outcome of one pass-through call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// SAM status byte
    pub status: u8,
    /// Sense bytes actually written by the device (may be empty)
    pub sense: Vec<u8>,
    pub host_status: u16,
    pub driver_status: u16,
    /// Requested data bytes that were not transferred
    pub residual: usize,
}

impl Completion {
    /// Status byte followed by the sense buffer, the layout `decode` reads
    pub fn raw_status_bytes(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(1 + self.sense.len());
        raw.push(self.status);
        raw.extend_from_slice(&self.sense);
        raw
    }
}

/// One blocking command round trip
pub trait Transport {
    fn send(
        &mut self,
        cdb: &[u8],
        data: DataBuffer<'_>,
        timeout: Duration,
    ) -> Result<Completion, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(
        &mut self,
        cdb: &[u8],
        data: DataBuffer<'_>,
        timeout: Duration,
    ) -> Result<Completion, TransportError> {
        (**self).send(cdb, data, timeout)
    }
}

#[cfg(not(any(target_os = "linux", windows)))]
mod unsupported {
    use std::time::Duration;

    use super::{Completion, DataBuffer, Transport};
    use crate::config::DeviceConfig;
    use crate::error::{Result, ScsiTapeError, TransportError};

    const REASON: &str = "SCSI pass-through is not supported on this platform";

    #[derive(Debug)]
    pub struct UnsupportedTransport;

    impl UnsupportedTransport {
        pub fn open(path: &str, _config: &DeviceConfig) -> Result<Self> {
            Err(ScsiTapeError::open(path, REASON))
        }
    }

    impl Transport for UnsupportedTransport {
        fn send(
            &mut self,
            _cdb: &[u8],
            _data: DataBuffer<'_>,
            _timeout: Duration,
        ) -> std::result::Result<Completion, TransportError> {
            Err(TransportError::Unsupported(REASON.to_string()))
        }
    }
}
