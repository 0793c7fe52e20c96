//! SCSI Basic Commands
//!
//! TEST UNIT READY, READ BLOCK LIMITS, LOAD UNLOAD and PREVENT ALLOW
//! MEDIUM REMOVAL.

use crate::error::{Result, ScsiTapeError};

use super::super::constants::op_codes;
use super::super::types::{BlockLimits, CommandKind, DataDirection, TimeoutClass};
use super::{flag, Command, DataIn, NoData};

/// SPC-4 Section 6.47
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestUnitReady;

impl NoData for TestUnitReady {}

impl Command for TestUnitReady {
    fn kind(&self) -> CommandKind {
        CommandKind::TestUnitReady
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = vec![0; 6];
        data[0] = op_codes::TEST_UNIT_READY;
        Ok(data)
    }
}

/// SSC-4 Section 7.6
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadBlockLimits {
    /// Request the maximum logical object identifier instead of block limits
    pub mloi: bool,
}

impl ReadBlockLimits {
    pub const BLOCK_LIMITS_SIZE: usize = 6;
    pub const MLOI_SIZE: usize = 20;

    pub fn new() -> Self {
        Default::default()
    }

    pub fn parse(&self, buf: &[u8]) -> Option<BlockLimits> {
        if self.mloi {
            if buf.len() < Self::MLOI_SIZE {
                return None;
            }
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&buf[12..20]);
            Some(BlockLimits::MaximumLogicalObjectIdentifier(u64::from_be_bytes(raw)))
        } else {
            if buf.len() < Self::BLOCK_LIMITS_SIZE {
                return None;
            }
            Some(BlockLimits::Range {
                granularity: buf[0] & 0x1F,
                maximum_block_length: u32::from_be_bytes([0, buf[1], buf[2], buf[3]]),
                minimum_block_length: u16::from_be_bytes([buf[4], buf[5]]),
            })
        }
    }
}

impl DataIn for ReadBlockLimits {}

impl Command for ReadBlockLimits {
    fn kind(&self) -> CommandKind {
        CommandKind::ReadBlockLimits
    }

    fn direction(&self) -> DataDirection {
        DataDirection::FromDevice
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = vec![0; 6];

        data[0] = op_codes::READ_BLOCK_LIMITS;
        data[1] = flag(self.mloi, 0x1);

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        Ok(if self.mloi {
            Self::MLOI_SIZE
        } else {
            Self::BLOCK_LIMITS_SIZE
        })
    }
}

/// SSC-4 Section 7.3
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadUnload {
    pub immed: bool,
    pub hold: bool,
    /// Unload at end of tape
    pub eot: bool,
    /// Retension
    pub reten: bool,
    pub load: bool,
}

impl LoadUnload {
    pub fn load() -> Self {
        Self {
            load: true,
            ..Default::default()
        }
    }

    pub fn unload() -> Self {
        Default::default()
    }
}

impl NoData for LoadUnload {}

impl Command for LoadUnload {
    fn kind(&self) -> CommandKind {
        CommandKind::LoadUnload
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = vec![0; 6];

        data[0] = op_codes::LOAD_UNLOAD;
        data[1] = flag(self.immed, 0x1);
        data[4] = flag(self.hold, 0x8)
            | flag(self.eot, 0x4)
            | flag(self.reten, 0x2)
            | flag(self.load, 0x1);

        Ok(data)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 7.5
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreventAllowMediumRemoval {
    pub prevent: u8,
}

impl PreventAllowMediumRemoval {
    pub const ALLOWED: u8 = 0x0;
    pub const PREVENTED: u8 = 0x1;

    pub fn new(prevent: u8) -> Self {
        Self { prevent }
    }
}

impl NoData for PreventAllowMediumRemoval {}

impl Command for PreventAllowMediumRemoval {
    fn kind(&self) -> CommandKind {
        CommandKind::PreventAllowMediumRemoval
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.prevent > 0x03 {
            return Err(ScsiTapeError::invalid_argument(
                "Prevent code must be in the range 0..4",
            ));
        }

        let mut data = vec![0; 6];

        data[0] = op_codes::PREVENT_ALLOW_MEDIUM_REMOVAL;
        data[4] = self.prevent;

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_ready_is_all_zero() {
        assert_eq!(TestUnitReady.to_bytes().unwrap(), vec![0; 6]);
        assert_eq!(TestUnitReady.transfer_bytes().unwrap(), 0);
    }

    #[test]
    fn parses_block_limits() {
        let cmd = ReadBlockLimits::new();
        assert_eq!(cmd.transfer_bytes().unwrap(), 6);

        let limits = cmd.parse(&[0x02, 0x08, 0x00, 0x00, 0x00, 0x01]).unwrap();
        assert_eq!(
            limits,
            BlockLimits::Range {
                granularity: 2,
                maximum_block_length: 0x08_0000,
                minimum_block_length: 1,
            }
        );
        assert!(cmd.parse(&[0; 5]).is_none());
    }

    #[test]
    fn parses_maximum_logical_object_identifier() {
        let cmd = ReadBlockLimits { mloi: true };
        assert_eq!(cmd.to_bytes().unwrap(), vec![0x05, 0x01, 0, 0, 0, 0]);

        let mut buf = [0u8; 20];
        buf[12..20].copy_from_slice(&0xDEAD_BEEFu64.to_be_bytes());
        assert_eq!(
            cmd.parse(&buf),
            Some(BlockLimits::MaximumLogicalObjectIdentifier(0xDEAD_BEEF))
        );
    }

    #[test]
    fn load_unload_flags_in_byte_four() {
        assert_eq!(LoadUnload::load().to_bytes().unwrap(), vec![0x1B, 0, 0, 0, 0x01, 0]);
        let cmd = LoadUnload {
            immed: true,
            eot: true,
            ..LoadUnload::unload()
        };
        assert_eq!(cmd.to_bytes().unwrap(), vec![0x1B, 0x01, 0, 0, 0x04, 0]);
    }

    #[test]
    fn prevent_code_is_range_checked() {
        let cmd = PreventAllowMediumRemoval::new(PreventAllowMediumRemoval::PREVENTED);
        assert_eq!(cmd.to_bytes().unwrap(), vec![0x1E, 0, 0, 0, 0x01, 0]);
        assert!(PreventAllowMediumRemoval::new(4).to_bytes().is_err());
    }
}
