//! SCSI Commands Module
//!
//! Command descriptors for sequential-access devices. Each descriptor is a
//! plain value that serializes itself into a CDB; it never owns the data
//! buffer used to issue it.

use crate::error::{Result, ScsiTapeError};

use super::constants::MAX_TRANSFER_LENGTH_6;
use super::types::{CommandKind, DataDirection, TimeoutClass};

pub mod basic;
pub mod io;
pub mod medium;
pub mod positioning;
pub mod verify;

pub use basic::{LoadUnload, PreventAllowMediumRemoval, ReadBlockLimits, TestUnitReady};
pub use io::{
    Erase16, Erase6, Read16, Read6, ReadReverse16, ReadReverse6, RecoverBufferedData, Write16,
    Write6, WriteFilemarks16, WriteFilemarks6,
};
pub use medium::{AllowOverwrite, FormatMedium, ReportDensitySupport, SetCapacity};
pub use positioning::{
    Locate10, Locate16, LocateDestination, ReadPosition, ReadPositionForm, Rewind, Space16,
    Space6, SpacePositioning,
};
pub use verify::{Verify16, Verify6, VerifyFlags};

/// SCSI command descriptors implement this trait
pub trait Command {
    fn kind(&self) -> CommandKind;

    fn direction(&self) -> DataDirection {
        DataDirection::None
    }

    /// Serialize into the CDB wire layout
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Number of data bytes the command moves; the buffer supplied at issue
    /// time must hold at least this many.
    fn transfer_bytes(&self) -> Result<usize> {
        Ok(0)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Short
    }
}

/// Command marker trait: no data phase
///
/// Commands whose data phase depends on their fields (VERIFY with a byte
/// compare, FORMAT MEDIUM with parameters, SPACE(16) with a starting
/// position) carry both `NoData` and `DataOut`; `Device::issue` rejects a
/// buffer that does not match `direction()`.
pub trait NoData: Command {}

/// Command marker trait: data flows from the host to the device
pub trait DataOut: Command {}

/// Command marker trait: data flows from the device to the host
pub trait DataIn: Command {}

fn flag(set: bool, bit: u8) -> u8 {
    if set {
        bit
    } else {
        0x0
    }
}

/// Reject values that do not fit a 24-bit length or count field
fn check_length_24(name: &str, value: u32) -> Result<()> {
    if value > MAX_TRANSFER_LENGTH_6 {
        return Err(ScsiTapeError::invalid_argument(format!(
            "{} must be in the range 0..2^24, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Buffer bytes for a stream transfer in fixed-block or variable mode
fn stream_transfer_bytes(
    kind: CommandKind,
    fixed: bool,
    transfer_length: u32,
    block_length: u32,
) -> Result<usize> {
    if !fixed {
        return Ok(transfer_length as usize);
    }
    if block_length == 0 && transfer_length > 0 {
        return Err(ScsiTapeError::invalid_argument(format!(
            "{} in fixed-block mode needs a block length",
            kind
        )));
    }
    (transfer_length as usize)
        .checked_mul(block_length as usize)
        .ok_or_else(|| {
            ScsiTapeError::invalid_argument(format!("{} transfer size overflows", kind))
        })
}
