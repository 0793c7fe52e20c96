//! SCSI Device Management
//!
//! A `Device` owns one open transport to a tape drive. Issuing a command
//! validates the descriptor and the caller's buffer, serializes the CDB,
//! sends it, and decodes the completion into a `DeviceStatus`.

use tracing::{debug, info, warn};

use crate::config::DeviceConfig;
use crate::error::{Result, ScsiTapeError};

use super::commands::{Command, DataIn, DataOut, NoData};
use super::status::{self, DeviceStatus};
use super::transport::{DataBuffer, PlatformTransport, Transport};
use super::types::{CommandKind, DataDirection};

/// Open connection to one sequential-access device
///
/// `issue` takes `&mut self`, so a handle serves one command at a time.
/// Sharing a handle between threads needs an external lock such as
/// `Arc<Mutex<Device>>`; otherwise give each thread its own handle.
#[derive(Debug)]
pub struct Device<T: Transport = PlatformTransport> {
    transport: Option<T>,
    path: String,
    config: DeviceConfig,
}

impl Device<PlatformTransport> {
    /// Open `path` with the default configuration
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_config(path, DeviceConfig::default())
    }

    pub fn open_with_config(path: &str, config: DeviceConfig) -> Result<Self> {
        config.validate()?;

        info!("Opening tape device: {}", path);
        let transport = PlatformTransport::open(path, &config)?;
        debug!("Device opened successfully: {}", path);

        Ok(Self {
            transport: Some(transport),
            path: path.to_string(),
            config,
        })
    }
}

impl<T: Transport> Device<T> {
    /// Wrap an already open transport
    pub fn with_transport(transport: T) -> Self {
        Self::with_transport_and_config(transport, DeviceConfig::default())
    }

    pub fn with_transport_and_config(transport: T, config: DeviceConfig) -> Self {
        let path = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or("transport")
            .to_string();

        Self {
            transport: Some(transport),
            path,
            config,
        }
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Device path, or the transport type name for a wrapped transport
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Release the transport. Closing a closed handle does nothing.
    pub fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            drop(transport);
            debug!("Device closed: {}", self.path);
        }
    }

    /// Issue a command with an optional data buffer.
    ///
    /// The buffer must match the command's data direction and hold at least
    /// `cmd.transfer_bytes()` bytes; only that prefix is passed on. Device
    /// errors are reported inside the returned status, not as `Err`.
    pub fn issue<C: Command + ?Sized>(
        &mut self,
        cmd: &C,
        data: DataBuffer<'_>,
    ) -> Result<DeviceStatus> {
        if self.transport.is_none() {
            return Err(ScsiTapeError::ClosedHandle);
        }

        let kind = cmd.kind();
        let cdb = cmd.to_bytes()?;
        let required = cmd.transfer_bytes()?;
        let data = fit_buffer(kind, cmd.direction(), required, data)?;
        let timeout = self.config.timeout_for(cmd.timeout_class());

        debug!(
            "Issuing {} to {}: cdb={}, transfer={} bytes, timeout={:?}",
            kind,
            self.path,
            hex::encode(&cdb),
            required,
            timeout
        );

        let transport = self.transport.as_mut().ok_or(ScsiTapeError::ClosedHandle)?;
        let completion = transport.send(&cdb, data, timeout).map_err(|e| {
            warn!(
                "{} failed on {}: {} (raw code {:?})",
                kind,
                self.path,
                e,
                e.raw_code()
            );
            ScsiTapeError::from(e)
        })?;

        Ok(status::decode_completion(&completion, kind))
    }

    /// Issue a command without a data phase
    pub fn issue_cmd<C: NoData>(&mut self, cmd: &C) -> Result<DeviceStatus> {
        self.issue(cmd, DataBuffer::None)
    }

    /// Issue a command that sends `data` to the device
    pub fn issue_cmd_with_input<C: DataOut>(
        &mut self,
        cmd: &C,
        data: &[u8],
    ) -> Result<DeviceStatus> {
        self.issue(cmd, DataBuffer::ToDevice(data))
    }

    /// Issue a command that fills `buf` from the device
    pub fn issue_cmd_with_output<C: DataIn>(
        &mut self,
        cmd: &C,
        buf: &mut [u8],
    ) -> Result<DeviceStatus> {
        self.issue(cmd, DataBuffer::FromDevice(buf))
    }
}

impl<T: Transport> Drop for Device<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Check the buffer against the command and cut it to the transfer size
fn fit_buffer<'a>(
    kind: CommandKind,
    direction: DataDirection,
    required: usize,
    data: DataBuffer<'a>,
) -> Result<DataBuffer<'a>> {
    match (direction, data) {
        (DataDirection::None, DataBuffer::None) => Ok(DataBuffer::None),
        (DataDirection::ToDevice, DataBuffer::ToDevice(buf)) => {
            check_capacity(kind, buf.len(), required)?;
            Ok(DataBuffer::ToDevice(&buf[..required]))
        }
        (DataDirection::FromDevice, DataBuffer::FromDevice(buf)) => {
            check_capacity(kind, buf.len(), required)?;
            Ok(DataBuffer::FromDevice(&mut buf[..required]))
        }
        (expected, data) => Err(ScsiTapeError::invalid_argument(format!(
            "{} expects a {:?} data phase, got {:?}",
            kind,
            expected,
            data.direction()
        ))),
    }
}

fn check_capacity(kind: CommandKind, capacity: usize, required: usize) -> Result<()> {
    if capacity < required {
        return Err(ScsiTapeError::invalid_argument(format!(
            "{} needs a buffer of {} bytes, got {}",
            kind, required, capacity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scsi::commands::{Read6, Rewind, Write6};
    use crate::scsi::status::Outcome;
    use crate::scsi::transport::stub::{StubReply, StubTransport};
    use crate::scsi::types::TimeoutClass;
    use std::time::Duration;

    #[test]
    fn passes_only_the_required_prefix() {
        let transport =
            StubTransport::with_replies([StubReply::good().with_data(vec![0xAB; 100])]);
        let log = transport.log();
        let mut device = Device::with_transport(transport);

        let mut buf = [0u8; 100];
        let status = device
            .issue_cmd_with_output(&Read6::variable(10), &mut buf)
            .unwrap();

        assert!(status.is_success());
        assert!(buf[..10].iter().all(|b| *b == 0xAB));
        assert!(buf[10..].iter().all(|b| *b == 0));
        assert_eq!(log.calls()[0].transfer_len, 10);
    }

    #[test]
    fn direction_mismatch_is_rejected_before_sending() {
        let transport = StubTransport::new();
        let log = transport.log();
        let mut device = Device::with_transport(transport);

        let err = device
            .issue(&Read6::variable(8), DataBuffer::ToDevice(&[0; 8]))
            .unwrap_err();
        assert!(matches!(err, ScsiTapeError::InvalidArgument(_)));

        let mut buf = [0u8; 8];
        let err = device
            .issue(&Rewind::new(), DataBuffer::FromDevice(&mut buf))
            .unwrap_err();
        assert!(matches!(err, ScsiTapeError::InvalidArgument(_)));
        assert_eq!(log.call_count(), 0);
    }

    #[test]
    fn write_sends_caller_data() {
        let transport = StubTransport::new();
        let log = transport.log();
        let mut device = Device::with_transport(transport);

        let status = device
            .issue_cmd_with_input(&Write6::variable(4), &[1, 2, 3, 4, 5])
            .unwrap();

        assert_eq!(status.outcome(), Outcome::Success);
        let call = &log.calls()[0];
        assert_eq!(call.direction, DataDirection::ToDevice);
        assert_eq!(call.written, vec![1, 2, 3, 4]);
    }

    #[test]
    fn timeout_follows_command_class() {
        let transport = StubTransport::new();
        let log = transport.log();
        let config = DeviceConfig {
            short_timeout_secs: 5,
            long_timeout_secs: 900,
            ..DeviceConfig::default()
        };
        let mut device = Device::with_transport_and_config(transport, config.clone());

        device.issue_cmd(&Rewind::new()).unwrap();
        let mut buf = [0u8; 4];
        device
            .issue_cmd_with_output(&Read6::variable(4), &mut buf)
            .unwrap();

        let calls = log.calls();
        assert_eq!(calls[0].timeout, Duration::from_secs(900));
        assert_eq!(calls[1].timeout, config.timeout_for(TimeoutClass::Short));
    }

    #[test]
    fn wrapped_transport_is_named_by_type() {
        let device = Device::with_transport(StubTransport::new());
        assert_eq!(device.path(), "StubTransport");
        assert!(device.is_open());
    }
}
