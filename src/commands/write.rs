//! Write Command Handlers
//!
//! Handles the `write` and `write-filemarks` subcommands.

use scsi_tape::error::{Result, ScsiTapeError};
use scsi_tape::scsi::commands::{Write6, WriteFilemarks6};
use scsi_tape::scsi::{Device, DeviceStatus, Transport};
use scsi_tape::utils::format_size;
use std::path::PathBuf;
use tracing::info;

use super::{report, with_device, Options};

/// WRITE(6) covering all of `len` bytes. In fixed mode `len` must be a
/// whole number of blocks.
pub fn write_command(len: usize, block_size: Option<u32>) -> Result<Write6> {
    let too_long =
        |_| ScsiTapeError::invalid_argument(format!("{} bytes is too long for WRITE(6)", len));

    match block_size {
        None => Ok(Write6::variable(u32::try_from(len).map_err(too_long)?)),
        Some(0) => Err(ScsiTapeError::invalid_argument(
            "Block size must be non-zero",
        )),
        Some(block_size) => {
            let block = block_size as usize;
            if len % block != 0 {
                return Err(ScsiTapeError::invalid_argument(format!(
                    "{} bytes is not a multiple of the {} byte block size",
                    len, block_size
                )));
            }
            let blocks = u32::try_from(len / block).map_err(too_long)?;
            Ok(Write6::fixed(blocks, block_size))
        }
    }
}

pub fn run<T: Transport>(
    device: &mut Device<T>,
    data: &[u8],
    block_size: Option<u32>,
) -> Result<DeviceStatus> {
    let cmd = write_command(data.len(), block_size)?;
    device.issue_cmd_with_input(&cmd, data)
}

pub async fn write(
    device: String,
    input: PathBuf,
    block_size: Option<u32>,
    options: Options,
) -> Result<()> {
    let data = tokio::fs::read(&input).await?;
    info!(
        "Writing {} from {} to {}",
        format_size(data.len() as u64),
        input.display(),
        device
    );

    let status =
        with_device(device, &options, move |handle| run(handle, &data, block_size)).await?;

    report("WRITE(6)", &status, &options)
}

pub async fn filemarks(device: String, count: u32, immed: bool, options: Options) -> Result<()> {
    info!("Writing {} filemark(s) on {}", count, device);

    let cmd = WriteFilemarks6 {
        immed,
        filemark_count: count,
    };
    let status = with_device(device, &options, move |handle| handle.issue_cmd(&cmd)).await?;

    report("WRITE FILEMARKS(6)", &status, &options)
}
