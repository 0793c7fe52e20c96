//! Positioning Command Handlers
//!
//! Handles the `rewind`, `space`, `locate` and `position` subcommands.

use scsi_tape::display;
use scsi_tape::error::Result;
use scsi_tape::scsi::commands::{Locate10, ReadPosition, ReadPositionForm, Rewind, Space6};
use scsi_tape::scsi::{Device, DeviceStatus, SpaceType, TapePosition, Transport};
use tracing::{debug, info};

use super::{report, with_device, Options};

pub async fn rewind(device: String, immed: bool, options: Options) -> Result<()> {
    info!("Rewinding {}", device);

    let cmd = Rewind { immed };
    let status = with_device(device, &options, move |handle| handle.issue_cmd(&cmd)).await?;

    report("REWIND", &status, &options)
}

pub async fn space(device: String, code: SpaceType, count: i32, options: Options) -> Result<()> {
    info!("Spacing {} {:?} on {}", count, code, device);

    let cmd = Space6::new(code, count);
    let status = with_device(device, &options, move |handle| handle.issue_cmd(&cmd)).await?;

    report("SPACE(6)", &status, &options)
}

pub async fn locate(
    device: String,
    block: u32,
    partition: Option<u8>,
    immed: bool,
    options: Options,
) -> Result<()> {
    info!("Locating {} to block {} (partition {:?})", device, block, partition);

    let mut cmd = Locate10::new(block);
    if let Some(partition) = partition {
        cmd = cmd.in_partition(partition);
    }
    cmd.immed = immed;

    let status = with_device(device, &options, move |handle| handle.issue_cmd(&cmd)).await?;

    report("LOCATE(10)", &status, &options)
}

/// Issue READ POSITION and parse the response when the command succeeded
pub fn read_position<T: Transport>(
    device: &mut Device<T>,
    form: ReadPositionForm,
) -> Result<(DeviceStatus, Option<TapePosition>)> {
    let cmd = ReadPosition::new(form);
    let mut buf = [0u8; ReadPosition::LONG_FORM_LEN];

    let status = device.issue_cmd_with_output(&cmd, &mut buf)?;
    let position = if status.is_success() {
        cmd.parse(&buf)
    } else {
        None
    };
    debug!("Parsed position: {:?}", position);

    Ok((status, position))
}

pub async fn position(device: String, long: bool, options: Options) -> Result<()> {
    let form = if long {
        ReadPositionForm::Long
    } else {
        ReadPositionForm::Short
    };

    let (status, position) =
        with_device(device, &options, move |handle| read_position(handle, form)).await?;

    report("READ POSITION", &status, &options)?;
    if let Some(position) = position {
        println!("{}", display::render_position(&position, options.json)?);
    }

    Ok(())
}
