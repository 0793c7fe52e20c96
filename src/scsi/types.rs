use serde::Serialize;
use std::fmt;

use super::constants::{op_codes, status_codes};

/// SAM-5 status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScsiStatus {
    Good,
    CheckCondition,
    ConditionMet,
    Busy,
    ReservationConflict,
    TaskSetFull,
    AcaActive,
    TaskAborted,
    Unknown(u8),
}

impl ScsiStatus {
    pub fn from_u8(val: u8) -> Self {
        match val {
            status_codes::GOOD => ScsiStatus::Good,
            status_codes::CHECK_CONDITION => ScsiStatus::CheckCondition,
            status_codes::CONDITION_MET => ScsiStatus::ConditionMet,
            status_codes::BUSY => ScsiStatus::Busy,
            status_codes::RESERVATION_CONFLICT => ScsiStatus::ReservationConflict,
            status_codes::TASK_SET_FULL => ScsiStatus::TaskSetFull,
            status_codes::ACA_ACTIVE => ScsiStatus::AcaActive,
            status_codes::TASK_ABORTED => ScsiStatus::TaskAborted,
            _ => ScsiStatus::Unknown(val),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            ScsiStatus::Good => status_codes::GOOD,
            ScsiStatus::CheckCondition => status_codes::CHECK_CONDITION,
            ScsiStatus::ConditionMet => status_codes::CONDITION_MET,
            ScsiStatus::Busy => status_codes::BUSY,
            ScsiStatus::ReservationConflict => status_codes::RESERVATION_CONFLICT,
            ScsiStatus::TaskSetFull => status_codes::TASK_SET_FULL,
            ScsiStatus::AcaActive => status_codes::ACA_ACTIVE,
            ScsiStatus::TaskAborted => status_codes::TASK_ABORTED,
            ScsiStatus::Unknown(val) => val,
        }
    }
}

/// Host adapter status, as reported by the Linux sg driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HostStatus {
    Ok,
    NoConnect,
    BusBusy,
    TimeOut,
    BadTarget,
    Abort,
    Parity,
    Error,
    Reset,
    BadIntr,
    Passthrough,
    SoftError,
    ImmRetry,
    Requeue,
    Unknown(u16),
}

impl HostStatus {
    pub fn from_u16(val: u16) -> Self {
        match val {
            0x00 => HostStatus::Ok,
            0x01 => HostStatus::NoConnect,
            0x02 => HostStatus::BusBusy,
            0x03 => HostStatus::TimeOut,
            0x04 => HostStatus::BadTarget,
            0x05 => HostStatus::Abort,
            0x06 => HostStatus::Parity,
            0x07 => HostStatus::Error,
            0x08 => HostStatus::Reset,
            0x09 => HostStatus::BadIntr,
            0x0A => HostStatus::Passthrough,
            0x0B => HostStatus::SoftError,
            0x0C => HostStatus::ImmRetry,
            0x0D => HostStatus::Requeue,
            _ => HostStatus::Unknown(val),
        }
    }
}

/// Driver status (low nibble of the sg `driver_status` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriverStatus {
    Ok,
    Busy,
    Soft,
    Media,
    Error,
    Invalid,
    Timeout,
    Hard,
    Sense,
    Unknown(u16),
}

impl DriverStatus {
    pub fn from_u16(val: u16) -> Self {
        match val & 0x0F {
            0x00 => DriverStatus::Ok,
            0x01 => DriverStatus::Busy,
            0x02 => DriverStatus::Soft,
            0x03 => DriverStatus::Media,
            0x04 => DriverStatus::Error,
            0x05 => DriverStatus::Invalid,
            0x06 => DriverStatus::Timeout,
            0x07 => DriverStatus::Hard,
            0x08 => DriverStatus::Sense,
            _ => DriverStatus::Unknown(val),
        }
    }
}

/// Driver suggested action (high nibble of the sg `driver_status` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriverSuggest {
    Nothing,
    Retry,
    Abort,
    Remap,
    Die,
    Sense,
    Unknown(u16),
}

impl DriverSuggest {
    pub fn from_u16(val: u16) -> Self {
        match val & 0xF0 {
            0x00 => DriverSuggest::Nothing,
            0x10 => DriverSuggest::Retry,
            0x20 => DriverSuggest::Abort,
            0x30 => DriverSuggest::Remap,
            0x40 => DriverSuggest::Die,
            0x80 => DriverSuggest::Sense,
            _ => DriverSuggest::Unknown(val),
        }
    }
}

/// Direction of the data phase of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataDirection {
    None,
    ToDevice,
    FromDevice,
}

/// Which timeout from the device configuration applies to a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    Short,
    Long,
}

/// Identifies the command that produced a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandKind {
    TestUnitReady,
    Rewind,
    ReadBlockLimits,
    Read6,
    Write6,
    WriteFilemarks6,
    Space6,
    Erase6,
    LoadUnload,
    PreventAllowMediumRemoval,
    Locate10,
    ReadPosition,
    FormatMedium,
    SetCapacity,
    ReadReverse6,
    Verify6,
    RecoverBufferedData,
    ReportDensitySupport,
    WriteFilemarks16,
    ReadReverse16,
    AllowOverwrite,
    Read16,
    Write16,
    Verify16,
    Space16,
    Locate16,
    Erase16,
}

impl CommandKind {
    pub fn op_code(self) -> u8 {
        match self {
            CommandKind::TestUnitReady => op_codes::TEST_UNIT_READY,
            CommandKind::Rewind => op_codes::REWIND,
            CommandKind::ReadBlockLimits => op_codes::READ_BLOCK_LIMITS,
            CommandKind::Read6 => op_codes::READ_6,
            CommandKind::Write6 => op_codes::WRITE_6,
            CommandKind::WriteFilemarks6 => op_codes::WRITE_FILEMARKS_6,
            CommandKind::Space6 => op_codes::SPACE_6,
            CommandKind::Erase6 => op_codes::ERASE_6,
            CommandKind::LoadUnload => op_codes::LOAD_UNLOAD,
            CommandKind::PreventAllowMediumRemoval => op_codes::PREVENT_ALLOW_MEDIUM_REMOVAL,
            CommandKind::Locate10 => op_codes::LOCATE_10,
            CommandKind::ReadPosition => op_codes::READ_POSITION,
            CommandKind::FormatMedium => op_codes::FORMAT_MEDIUM,
            CommandKind::SetCapacity => op_codes::SET_CAPACITY,
            CommandKind::ReadReverse6 => op_codes::READ_REVERSE_6,
            CommandKind::Verify6 => op_codes::VERIFY_6,
            CommandKind::RecoverBufferedData => op_codes::RECOVER_BUFFERED_DATA,
            CommandKind::ReportDensitySupport => op_codes::REPORT_DENSITY_SUPPORT,
            CommandKind::WriteFilemarks16 => op_codes::WRITE_FILEMARKS_16,
            CommandKind::ReadReverse16 => op_codes::READ_REVERSE_16,
            CommandKind::AllowOverwrite => op_codes::ALLOW_OVERWRITE,
            CommandKind::Read16 => op_codes::READ_16,
            CommandKind::Write16 => op_codes::WRITE_16,
            CommandKind::Verify16 => op_codes::VERIFY_16,
            CommandKind::Space16 => op_codes::SPACE_16,
            CommandKind::Locate16 => op_codes::LOCATE_16,
            CommandKind::Erase16 => op_codes::ERASE_16,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::TestUnitReady => "TEST UNIT READY",
            CommandKind::Rewind => "REWIND",
            CommandKind::ReadBlockLimits => "READ BLOCK LIMITS",
            CommandKind::Read6 => "READ(6)",
            CommandKind::Write6 => "WRITE(6)",
            CommandKind::WriteFilemarks6 => "WRITE FILEMARKS(6)",
            CommandKind::Space6 => "SPACE(6)",
            CommandKind::Erase6 => "ERASE(6)",
            CommandKind::LoadUnload => "LOAD UNLOAD",
            CommandKind::PreventAllowMediumRemoval => "PREVENT ALLOW MEDIUM REMOVAL",
            CommandKind::Locate10 => "LOCATE(10)",
            CommandKind::ReadPosition => "READ POSITION",
            CommandKind::FormatMedium => "FORMAT MEDIUM",
            CommandKind::SetCapacity => "SET CAPACITY",
            CommandKind::ReadReverse6 => "READ REVERSE(6)",
            CommandKind::Verify6 => "VERIFY(6)",
            CommandKind::RecoverBufferedData => "RECOVER BUFFERED DATA",
            CommandKind::ReportDensitySupport => "REPORT DENSITY SUPPORT",
            CommandKind::WriteFilemarks16 => "WRITE FILEMARKS(16)",
            CommandKind::ReadReverse16 => "READ REVERSE(16)",
            CommandKind::AllowOverwrite => "ALLOW OVERWRITE",
            CommandKind::Read16 => "READ(16)",
            CommandKind::Write16 => "WRITE(16)",
            CommandKind::Verify16 => "VERIFY(16)",
            CommandKind::Space16 => "SPACE(16)",
            CommandKind::Locate16 => "LOCATE(16)",
            CommandKind::Erase16 => "ERASE(16)",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Space codes for SPACE(6) and SPACE(16)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpaceType {
    #[default]
    Blocks = 0,
    FileMarks = 1,
    SequentialFileMarks = 2,
    EndOfData = 3,
}

/// Tape position information structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapePosition {
    pub partition: u32,
    pub block_number: u64,
    /// Only reported by the long form
    pub file_number: Option<u64>,
    /// Only reported by the long form
    pub set_number: Option<u64>,
    pub beginning_of_partition: bool,
    pub end_of_partition: bool,
    /// Block number of the last object written to the medium (short form)
    pub last_block_number: Option<u64>,
    pub objects_in_buffer: Option<u32>,
    pub bytes_in_buffer: Option<u32>,
}

/// READ BLOCK LIMITS response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockLimits {
    Range {
        granularity: u8,
        maximum_block_length: u32,
        minimum_block_length: u16,
    },
    MaximumLogicalObjectIdentifier(u64),
}

/// One density descriptor of a REPORT DENSITY SUPPORT response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DensityDescriptor {
    pub primary_density_code: u8,
    pub secondary_density_code: u8,
    /// The drive can write this density
    pub write_ok: bool,
    pub duplicate: bool,
    /// Used when no density is selected
    pub default: bool,
    pub bits_per_mm: u32,
    /// Tenths of a millimetre
    pub media_width: u16,
    pub tracks: u16,
    /// Megabytes
    pub capacity: u32,
    pub assigning_organization: String,
    pub density_name: String,
    pub description: String,
}
