//! SCSI Verify Commands
//!
//! VERIFY(6) and VERIFY(16). With `bytcmp` clear the device only checks
//! that the data can be read. With it set, the data to compare against is
//! sent along with the command.

use crate::error::Result;

use super::super::constants::op_codes;
use super::super::types::{CommandKind, DataDirection, TimeoutClass};
use super::{check_length_24, flag, stream_transfer_bytes, Command, DataOut, NoData};

/// Flags shared by both VERIFY forms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyFlags {
    /// Verify to end-of-data
    pub vte: bool,
    /// Verify logical block protection information
    pub vlbpm: bool,
    /// Verify by filemarks
    pub vbf: bool,
    pub immed: bool,
    /// Compare against data sent by the host
    pub bytcmp: bool,
    pub fixed: bool,
}

impl VerifyFlags {
    fn byte(&self) -> u8 {
        flag(self.vte, 0x20)
            | flag(self.vlbpm, 0x10)
            | flag(self.vbf, 0x08)
            | flag(self.immed, 0x04)
            | flag(self.bytcmp, 0x02)
            | flag(self.fixed, 0x01)
    }

    fn direction(&self) -> DataDirection {
        if self.bytcmp {
            DataDirection::ToDevice
        } else {
            DataDirection::None
        }
    }

    fn transfer_bytes(&self, kind: CommandKind, length: u32, block_length: u32) -> Result<usize> {
        if !self.bytcmp {
            return Ok(0);
        }
        stream_transfer_bytes(kind, self.fixed, length, block_length)
    }
}

/// SSC-4 Section 6.10
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verify6 {
    pub flags: VerifyFlags,
    /// Bytes in variable mode, blocks in fixed mode
    pub verification_length: u32,
    /// Only used to size the compare buffer in fixed mode
    pub block_length: u32,
}

impl Verify6 {
    pub fn new(verification_length: u32) -> Self {
        Self {
            verification_length,
            ..Default::default()
        }
    }
}

impl NoData for Verify6 {}
impl DataOut for Verify6 {}

impl Command for Verify6 {
    fn kind(&self) -> CommandKind {
        CommandKind::Verify6
    }

    fn direction(&self) -> DataDirection {
        self.flags.direction()
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Verification length", self.verification_length)?;

        let mut data = vec![0; 6];

        data[0] = op_codes::VERIFY_6;
        data[1] = self.flags.byte();
        data[2..5].copy_from_slice(&self.verification_length.to_be_bytes()[1..]);

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        self.flags
            .transfer_bytes(self.kind(), self.verification_length, self.block_length)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 5.8
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verify16 {
    pub flags: VerifyFlags,
    pub partition: u8,
    pub logical_object_identifier: u64,
    pub verification_length: u32,
    pub block_length: u32,
}

impl NoData for Verify16 {}
impl DataOut for Verify16 {}

impl Command for Verify16 {
    fn kind(&self) -> CommandKind {
        CommandKind::Verify16
    }

    fn direction(&self) -> DataDirection {
        self.flags.direction()
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        check_length_24("Verification length", self.verification_length)?;

        let mut data = vec![0; 16];

        data[0] = op_codes::VERIFY_16;
        data[1] = self.flags.byte();
        data[3] = self.partition;
        data[4..12].copy_from_slice(&self.logical_object_identifier.to_be_bytes());
        data[12..15].copy_from_slice(&self.verification_length.to_be_bytes()[1..]);

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        self.flags
            .transfer_bytes(self.kind(), self.verification_length, self.block_length)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify6_without_compare_has_no_data_phase() {
        let cmd = Verify6 {
            flags: VerifyFlags {
                immed: true,
                fixed: true,
                ..Default::default()
            },
            ..Verify6::new(4)
        };
        assert_eq!(cmd.to_bytes().unwrap(), vec![0x13, 0x05, 0x00, 0x00, 0x04, 0x00]);
        assert_eq!(cmd.direction(), DataDirection::None);
        assert_eq!(cmd.transfer_bytes().unwrap(), 0);
    }

    #[test]
    fn verify_with_bytcmp_sends_compare_data() {
        let cmd = Verify16 {
            flags: VerifyFlags {
                bytcmp: true,
                fixed: true,
                ..Default::default()
            },
            partition: 1,
            logical_object_identifier: 0x20,
            verification_length: 2,
            block_length: 512,
        };
        let bytes = cmd.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0x8F, 0x03, 0x00, 0x01]);
        assert_eq!(bytes[11], 0x20);
        assert_eq!(&bytes[12..15], &[0x00, 0x00, 0x02]);
        assert_eq!(cmd.direction(), DataDirection::ToDevice);
        assert_eq!(cmd.transfer_bytes().unwrap(), 1024);
    }

    #[test]
    fn verify_rejects_oversized_length() {
        assert!(Verify6::new(1 << 24).to_bytes().is_err());
    }
}
