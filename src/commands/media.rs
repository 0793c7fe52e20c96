//! Media Command Handlers
//!
//! Handles the `status`, `load`, `erase`, `format-medium`,
//! `allow-overwrite` and `density` subcommands.

use scsi_tape::display;
use scsi_tape::error::{Result, ScsiTapeError};
use scsi_tape::scsi::commands::{
    AllowOverwrite, Erase16, Erase6, FormatMedium, LoadUnload, ReadBlockLimits,
    ReportDensitySupport, TestUnitReady,
};
use scsi_tape::scsi::{BlockLimits, DensityDescriptor, Device, DeviceStatus, Transport};
use std::path::PathBuf;
use tracing::{info, warn};

use super::{report, with_device, Options};

#[derive(Debug)]
pub struct UnitStatus {
    pub ready: DeviceStatus,
    /// Absent when the unit was not ready
    pub limits: Option<(DeviceStatus, Option<BlockLimits>)>,
}

/// TEST UNIT READY, followed by READ BLOCK LIMITS once the unit is ready
pub fn unit_status<T: Transport>(device: &mut Device<T>) -> Result<UnitStatus> {
    let ready = device.issue_cmd(&TestUnitReady)?;
    if !ready.is_success() {
        return Ok(UnitStatus {
            ready,
            limits: None,
        });
    }

    let cmd = ReadBlockLimits::new();
    let mut buf = [0u8; ReadBlockLimits::BLOCK_LIMITS_SIZE];
    let status = device.issue_cmd_with_output(&cmd, &mut buf)?;
    let limits = if status.is_success() {
        cmd.parse(&buf)
    } else {
        None
    };

    Ok(UnitStatus {
        ready,
        limits: Some((status, limits)),
    })
}

pub async fn status(device: String, options: Options) -> Result<()> {
    info!("Checking unit status: {}", device);

    let unit = with_device(device, &options, |handle| unit_status(handle)).await?;

    report("TEST UNIT READY", &unit.ready, &options)?;
    if let Some((status, limits)) = unit.limits {
        report("READ BLOCK LIMITS", &status, &options)?;
        if let Some(limits) = limits {
            println!("{}", display::render_block_limits(&limits, options.json)?);
        }
    }

    Ok(())
}

pub async fn load(device: String, unload: bool, immed: bool, options: Options) -> Result<()> {
    let cmd = LoadUnload {
        immed,
        ..if unload {
            LoadUnload::unload()
        } else {
            LoadUnload::load()
        }
    };
    info!("{} medium on {}", if unload { "Unloading" } else { "Loading" }, device);

    let status = with_device(device, &options, move |handle| handle.issue_cmd(&cmd)).await?;

    report("LOAD UNLOAD", &status, &options)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EraseRequest {
    pub long: bool,
    pub immed: bool,
    pub method: u8,
    /// Erase from this partition and object instead of the current position
    pub partition: Option<u8>,
    pub object: Option<u64>,
}

/// ERASE(16) when a position is given, ERASE(6) otherwise
pub fn erase_medium<T: Transport>(
    device: &mut Device<T>,
    request: EraseRequest,
) -> Result<DeviceStatus> {
    if request.partition.is_none() && request.object.is_none() {
        return device.issue_cmd(&Erase6 {
            immed: request.immed,
            long: request.long,
            method: request.method,
            ..Erase6::new()
        });
    }

    device.issue_cmd(&Erase16 {
        immed: request.immed,
        long: request.long,
        method: request.method,
        partition: request.partition.unwrap_or_default(),
        logical_object_identifier: request.object.unwrap_or_default(),
        ..Default::default()
    })
}

pub async fn erase(device: String, request: EraseRequest, options: Options) -> Result<()> {
    if request.long {
        warn!("Erasing {} to the end of the partition", device);
    } else {
        info!("Erasing {}: {:?}", device, request);
    }

    let status = with_device(device, &options, move |handle| erase_medium(handle, request)).await?;

    report(&status.kind().to_string(), &status, &options)
}

/// FORMAT MEDIUM, sending `parameters` when there are any
pub fn format_medium<T: Transport>(
    device: &mut Device<T>,
    cmd: FormatMedium,
    parameters: &[u8],
) -> Result<DeviceStatus> {
    let transfer_length = u16::try_from(parameters.len()).map_err(|_| {
        ScsiTapeError::invalid_argument(format!(
            "Format parameters must be under 64 KiB, got {} bytes",
            parameters.len()
        ))
    })?;
    let cmd = FormatMedium {
        transfer_length,
        ..cmd
    };

    if parameters.is_empty() {
        device.issue_cmd(&cmd)
    } else {
        device.issue_cmd_with_input(&cmd, parameters)
    }
}

pub async fn format(
    device: String,
    cmd: FormatMedium,
    input: Option<PathBuf>,
    options: Options,
) -> Result<()> {
    let parameters = match input {
        Some(path) => tokio::fs::read(&path).await?,
        None => Vec::new(),
    };
    warn!("Formatting medium in {} (format {})", device, cmd.format);

    let status = with_device(device, &options, move |handle| {
        format_medium(handle, cmd, &parameters)
    })
    .await?;

    report("FORMAT MEDIUM", &status, &options)
}

pub async fn allow_overwrite(device: String, cmd: AllowOverwrite, options: Options) -> Result<()> {
    info!("Allow overwrite on {}: {:?}", device, cmd);

    let status = with_device(device, &options, move |handle| handle.issue_cmd(&cmd)).await?;

    report("ALLOW OVERWRITE", &status, &options)
}

/// REPORT DENSITY SUPPORT, parsed when the command succeeded
pub fn report_density<T: Transport>(
    device: &mut Device<T>,
    media: bool,
) -> Result<(DeviceStatus, Option<Vec<DensityDescriptor>>)> {
    let cmd = ReportDensitySupport {
        media,
        ..ReportDensitySupport::new()
    };
    let mut buf = vec![0u8; usize::from(cmd.allocation_length)];

    let status = device.issue_cmd_with_output(&cmd, &mut buf)?;
    let densities = if status.is_success() {
        buf.truncate(buf.len().saturating_sub(status.residual()));
        cmd.parse(&buf)
    } else {
        None
    };

    Ok((status, densities))
}

pub async fn density(device: String, media: bool, options: Options) -> Result<()> {
    let (status, densities) =
        with_device(device, &options, move |handle| report_density(handle, media)).await?;

    report("REPORT DENSITY SUPPORT", &status, &options)?;
    if let Some(densities) = densities {
        println!("{}", display::render_densities(&densities, options.json)?);
    }

    Ok(())
}
