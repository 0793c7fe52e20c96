//! SCSI Data Commands
//!
//! READ, WRITE, WRITE FILEMARKS and ERASE in their 6 and 16 byte forms,
//! plus READ REVERSE and RECOVER BUFFERED DATA.
//!
//! The 16 byte forms carry an explicit partition and logical object
//! identifier; the device moves there before transferring.

use crate::error::{Result, ScsiTapeError};

use super::super::constants::op_codes;
use super::super::types::{CommandKind, DataDirection, TimeoutClass};
use super::{check_length_24, flag, stream_transfer_bytes, Command, DataIn, DataOut, NoData};

/// SSC-4 Section 6.4
///
/// In variable mode `transfer_length` is a byte count. In fixed mode it is a
/// count of blocks of `block_length` bytes; `block_length` is not sent to the
/// device and only sizes the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Read6 {
    /// Suppress incorrect length indicator
    pub sili: bool,
    pub fixed: bool,
    pub transfer_length: u32,
    pub block_length: u32,
}

impl Read6 {
    pub fn new() -> Self {
        Default::default()
    }

    /// Variable-mode read of up to `bytes` bytes
    pub fn variable(bytes: u32) -> Self {
        Self {
            transfer_length: bytes,
            ..Default::default()
        }
    }

    /// Fixed-mode read of `blocks` blocks of `block_length` bytes
    pub fn fixed(blocks: u32, block_length: u32) -> Self {
        Self {
            fixed: true,
            transfer_length: blocks,
            block_length,
            ..Default::default()
        }
    }
}

impl DataIn for Read6 {}

impl Command for Read6 {
    fn kind(&self) -> CommandKind {
        CommandKind::Read6
    }

    fn direction(&self) -> DataDirection {
        DataDirection::FromDevice
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Transfer length", self.transfer_length)?;

        let mut data = vec![0; 6];

        data[0] = op_codes::READ_6;
        data[1] = flag(self.sili, 0x2) | flag(self.fixed, 0x1);
        data[2..5].copy_from_slice(&self.transfer_length.to_be_bytes()[1..]);

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        stream_transfer_bytes(
            self.kind(),
            self.fixed,
            self.transfer_length,
            self.block_length,
        )
    }
}

/// SSC-4 Section 6.8
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Write6 {
    pub fixed: bool,
    pub transfer_length: u32,
    /// Only used to size the buffer in fixed mode
    pub block_length: u32,
}

impl Write6 {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn variable(bytes: u32) -> Self {
        Self {
            transfer_length: bytes,
            ..Default::default()
        }
    }

    pub fn fixed(blocks: u32, block_length: u32) -> Self {
        Self {
            fixed: true,
            transfer_length: blocks,
            block_length,
        }
    }
}

impl DataOut for Write6 {}

impl Command for Write6 {
    fn kind(&self) -> CommandKind {
        CommandKind::Write6
    }

    fn direction(&self) -> DataDirection {
        DataDirection::ToDevice
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Transfer length", self.transfer_length)?;

        let mut data = vec![0; 6];

        data[0] = op_codes::WRITE_6;
        data[1] = flag(self.fixed, 0x1);
        data[2..5].copy_from_slice(&self.transfer_length.to_be_bytes()[1..]);

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        stream_transfer_bytes(
            self.kind(),
            self.fixed,
            self.transfer_length,
            self.block_length,
        )
    }
}

/// SSC-4 Section 6.9
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteFilemarks6 {
    pub immed: bool,
    pub filemark_count: u32,
}

impl WriteFilemarks6 {
    pub fn new(filemark_count: u32) -> Self {
        Self {
            filemark_count,
            ..Default::default()
        }
    }
}

impl NoData for WriteFilemarks6 {}

impl Command for WriteFilemarks6 {
    fn kind(&self) -> CommandKind {
        CommandKind::WriteFilemarks6
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Filemark count", self.filemark_count)?;

        let mut data = vec![0; 6];

        data[0] = op_codes::WRITE_FILEMARKS_6;
        data[1] = flag(self.immed, 0x1);
        data[2..5].copy_from_slice(&self.filemark_count.to_be_bytes()[1..]);

        Ok(data)
    }
}

/// SSC-4 Section 6.2
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Erase6 {
    pub immed: bool,
    /// Erase from the current position to the end of the partition
    pub long: bool,
    pub method: u8,
    pub smd: bool,
    pub vcm: bool,
}

impl Erase6 {
    pub fn new() -> Self {
        Default::default()
    }
}

impl NoData for Erase6 {}

impl Command for Erase6 {
    fn kind(&self) -> CommandKind {
        CommandKind::Erase6
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_erase_method(self.method)?;

        let mut data = vec![0; 6];

        data[0] = op_codes::ERASE_6;
        data[1] = flag(self.immed, 0x2) | flag(self.long, 0x1);
        data[2] = self.method << 4 | flag(self.smd, 0x2) | flag(self.vcm, 0x1);

        Ok(data)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 5.3
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Read16 {
    pub sili: bool,
    pub fixed: bool,
    pub partition: u8,
    pub logical_object_identifier: u64,
    pub transfer_length: u32,
    /// Only used to size the buffer in fixed mode
    pub block_length: u32,
}

impl Read16 {
    pub fn new() -> Self {
        Default::default()
    }

    /// Variable-mode read of up to `bytes` bytes at `logical_object_identifier`
    pub fn variable(partition: u8, logical_object_identifier: u64, bytes: u32) -> Self {
        Self {
            partition,
            logical_object_identifier,
            transfer_length: bytes,
            ..Default::default()
        }
    }
}

impl DataIn for Read16 {}

impl Command for Read16 {
    fn kind(&self) -> CommandKind {
        CommandKind::Read16
    }

    fn direction(&self) -> DataDirection {
        DataDirection::FromDevice
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Transfer length", self.transfer_length)?;

        let mut data = vec![0; 16];

        data[0] = op_codes::READ_16;
        data[1] = flag(self.sili, 0x2) | flag(self.fixed, 0x1);
        data[3] = self.partition;
        data[4..12].copy_from_slice(&self.logical_object_identifier.to_be_bytes());
        data[12..15].copy_from_slice(&self.transfer_length.to_be_bytes()[1..]);

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        stream_transfer_bytes(
            self.kind(),
            self.fixed,
            self.transfer_length,
            self.block_length,
        )
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 5.6
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Write16 {
    /// First command in sequence
    pub fcs: bool,
    /// Last command in sequence
    pub lcs: bool,
    pub fixed: bool,
    pub partition: u8,
    pub logical_object_identifier: u64,
    pub transfer_length: u32,
    /// Only used to size the buffer in fixed mode
    pub block_length: u32,
}

impl Write16 {
    pub fn new() -> Self {
        Default::default()
    }
}

impl DataOut for Write16 {}

impl Command for Write16 {
    fn kind(&self) -> CommandKind {
        CommandKind::Write16
    }

    fn direction(&self) -> DataDirection {
        DataDirection::ToDevice
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Transfer length", self.transfer_length)?;

        let mut data = vec![0; 16];

        data[0] = op_codes::WRITE_16;
        data[1] = flag(self.fcs, 0x8) | flag(self.lcs, 0x4) | flag(self.fixed, 0x1);
        data[3] = self.partition;
        data[4..12].copy_from_slice(&self.logical_object_identifier.to_be_bytes());
        data[12..15].copy_from_slice(&self.transfer_length.to_be_bytes()[1..]);

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        stream_transfer_bytes(
            self.kind(),
            self.fixed,
            self.transfer_length,
            self.block_length,
        )
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 5.7
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteFilemarks16 {
    pub fcs: bool,
    pub lcs: bool,
    pub immed: bool,
    pub partition: u8,
    pub logical_object_identifier: u64,
    pub filemark_count: u32,
}

impl NoData for WriteFilemarks16 {}

impl Command for WriteFilemarks16 {
    fn kind(&self) -> CommandKind {
        CommandKind::WriteFilemarks16
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Filemark count", self.filemark_count)?;

        let mut data = vec![0; 16];

        data[0] = op_codes::WRITE_FILEMARKS_16;
        data[1] = flag(self.fcs, 0x8) | flag(self.lcs, 0x4) | flag(self.immed, 0x1);
        data[3] = self.partition;
        data[4..12].copy_from_slice(&self.logical_object_identifier.to_be_bytes());
        data[12..15].copy_from_slice(&self.filemark_count.to_be_bytes()[1..]);

        Ok(data)
    }
}

/// SSC-4 Section 5.2
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Erase16 {
    pub fcs: bool,
    pub lcs: bool,
    pub immed: bool,
    pub long: bool,
    pub method: u8,
    pub smd: bool,
    pub vcm: bool,
    pub partition: u8,
    pub logical_object_identifier: u64,
}

impl NoData for Erase16 {}

impl Command for Erase16 {
    fn kind(&self) -> CommandKind {
        CommandKind::Erase16
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_erase_method(self.method)?;

        let mut data = vec![0; 16];

        data[0] = op_codes::ERASE_16;
        data[1] = flag(self.fcs, 0x8)
            | flag(self.lcs, 0x4)
            | flag(self.immed, 0x2)
            | flag(self.long, 0x1);
        data[2] = self.method << 4 | flag(self.smd, 0x2) | flag(self.vcm, 0x1);
        data[3] = self.partition;
        data[4..12].copy_from_slice(&self.logical_object_identifier.to_be_bytes());

        Ok(data)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 6.5
///
/// Reads toward the beginning of the partition. With `bytord` set the
/// bytes of each block are returned in the order they were written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadReverse6 {
    pub bytord: bool,
    pub sili: bool,
    pub fixed: bool,
    pub transfer_length: u32,
    pub block_length: u32,
}

impl DataIn for ReadReverse6 {}

impl Command for ReadReverse6 {
    fn kind(&self) -> CommandKind {
        CommandKind::ReadReverse6
    }

    fn direction(&self) -> DataDirection {
        DataDirection::FromDevice
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Transfer length", self.transfer_length)?;

        let mut data = vec![0; 6];

        data[0] = op_codes::READ_REVERSE_6;
        data[1] = flag(self.bytord, 0x4) | flag(self.sili, 0x2) | flag(self.fixed, 0x1);
        data[2..5].copy_from_slice(&self.transfer_length.to_be_bytes()[1..]);

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        stream_transfer_bytes(
            self.kind(),
            self.fixed,
            self.transfer_length,
            self.block_length,
        )
    }
}

/// SSC-4 Section 5.4
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadReverse16 {
    pub bytord: bool,
    pub sili: bool,
    pub fixed: bool,
    pub partition: u8,
    pub logical_object_identifier: u64,
    pub transfer_length: u32,
    pub block_length: u32,
}

impl DataIn for ReadReverse16 {}

impl Command for ReadReverse16 {
    fn kind(&self) -> CommandKind {
        CommandKind::ReadReverse16
    }

    fn direction(&self) -> DataDirection {
        DataDirection::FromDevice
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Transfer length", self.transfer_length)?;

        let mut data = vec![0; 16];

        data[0] = op_codes::READ_REVERSE_16;
        data[1] = flag(self.bytord, 0x4) | flag(self.sili, 0x2) | flag(self.fixed, 0x1);
        data[3] = self.partition;
        data[4..12].copy_from_slice(&self.logical_object_identifier.to_be_bytes());
        data[12..15].copy_from_slice(&self.transfer_length.to_be_bytes()[1..]);

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        stream_transfer_bytes(
            self.kind(),
            self.fixed,
            self.transfer_length,
            self.block_length,
        )
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 7.9
///
/// Returns data that was written to the device buffer but not yet to the
/// medium, typically after a write error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoverBufferedData {
    pub sili: bool,
    pub fixed: bool,
    pub transfer_length: u32,
    pub block_length: u32,
}

impl DataIn for RecoverBufferedData {}

impl Command for RecoverBufferedData {
    fn kind(&self) -> CommandKind {
        CommandKind::RecoverBufferedData
    }

    fn direction(&self) -> DataDirection {
        DataDirection::FromDevice
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Transfer length", self.transfer_length)?;

        let mut data = vec![0; 6];

        data[0] = op_codes::RECOVER_BUFFERED_DATA;
        data[1] = flag(self.sili, 0x2) | flag(self.fixed, 0x1);
        data[2..5].copy_from_slice(&self.transfer_length.to_be_bytes()[1..]);

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        stream_transfer_bytes(
            self.kind(),
            self.fixed,
            self.transfer_length,
            self.block_length,
        )
    }
}

fn check_erase_method(method: u8) -> Result<()> {
    if method > 0x03 {
        return Err(ScsiTapeError::invalid_argument(
            "Erase method must be in the range 0..4",
        ));
    }
    Ok(())
}
