//! Read Command Handler
//!
//! Handles the `read` subcommand: one READ(6) at the current position.

use scsi_tape::display;
use scsi_tape::error::Result;
use scsi_tape::scsi::commands::{Command, Read6};
use scsi_tape::scsi::{Device, DeviceStatus, Transport};
use scsi_tape::utils::format_size;
use std::path::PathBuf;
use tracing::info;

use super::{report, with_device, Options};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    /// Bytes in variable mode, blocks in fixed mode
    pub length: u32,
    pub block_size: Option<u32>,
    pub sili: bool,
}

impl ReadRequest {
    pub fn command(&self) -> Read6 {
        let cmd = match self.block_size {
            Some(block_size) => Read6::fixed(self.length, block_size),
            None => Read6::variable(self.length),
        };
        Read6 {
            sili: self.sili,
            ..cmd
        }
    }
}

/// Issue the read into a buffer sized for the request; the returned data
/// holds only the bytes the transport reports as transferred.
pub fn run<T: Transport>(
    device: &mut Device<T>,
    request: ReadRequest,
) -> Result<(DeviceStatus, Vec<u8>)> {
    let cmd = request.command();
    let mut buf = vec![0u8; cmd.transfer_bytes()?];

    let status = device.issue_cmd_with_output(&cmd, &mut buf)?;
    let transferred = buf.len().saturating_sub(status.residual());
    buf.truncate(transferred);

    Ok((status, buf))
}

pub async fn execute(
    device: String,
    request: ReadRequest,
    output: Option<PathBuf>,
    options: Options,
) -> Result<()> {
    info!("Reading from {}: {:?}", device, request);

    let (status, data) = with_device(device, &options, move |handle| run(handle, request)).await?;
    report("READ(6)", &status, &options)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, &data).await?;
            info!("Wrote {} to {}", format_size(data.len() as u64), path.display());
        }
        None if !options.json => {
            println!("Data ({}):", format_size(data.len() as u64));
            print!("{}", display::hex_dump(&data));
        }
        None => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scsi_tape::scsi::transport::stub::{StubReply, StubTransport};

    #[test]
    fn fixed_request_sizes_buffer_by_blocks() {
        let request = ReadRequest {
            length: 2,
            block_size: Some(512),
            sili: true,
        };
        let cmd = request.command();
        assert!(cmd.fixed && cmd.sili);
        assert_eq!(cmd.transfer_bytes().unwrap(), 1024);
    }

    #[test]
    fn short_read_keeps_only_transferred_bytes() {
        let mut device = Device::with_transport(StubTransport::with_replies([
            StubReply::good().with_data(vec![1, 2, 3]),
        ]));
        let request = ReadRequest {
            length: 80,
            block_size: None,
            sili: false,
        };

        let (status, data) = run(&mut device, request).unwrap();
        assert_eq!(status.residual(), 77);
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn read_to_missing_device_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nst9").to_string_lossy().to_string();
        let request = ReadRequest {
            length: 80,
            block_size: None,
            sili: false,
        };

        let err = execute(path, request, None, Options::default())
            .await
            .unwrap_err();
        assert!(matches!(err, scsi_tape::ScsiTapeError::Open { .. }));
    }
}
