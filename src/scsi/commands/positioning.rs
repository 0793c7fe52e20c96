//! SCSI Positioning Commands
//!
//! REWIND, SPACE, LOCATE and READ POSITION.

use crate::error::{Result, ScsiTapeError};

use super::super::constants::op_codes;
use super::super::types::{
    CommandKind, DataDirection, SpaceType, TapePosition, TimeoutClass,
};
use super::{flag, Command, DataIn, DataOut, NoData};

/// SSC-4 Section 7.10
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rewind {
    /// Report completion before the tape has finished moving
    pub immed: bool,
}

impl Rewind {
    pub fn new() -> Self {
        Default::default()
    }
}

impl NoData for Rewind {}

impl Command for Rewind {
    fn kind(&self) -> CommandKind {
        CommandKind::Rewind
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = vec![0; 6];

        data[0] = op_codes::REWIND;
        data[1] = flag(self.immed, 0x1);

        Ok(data)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 6.6
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Space6 {
    pub code: SpaceType,
    /// Signed: negative counts move toward the beginning of the partition
    pub count: i32,
}

impl Space6 {
    const MIN_COUNT: i32 = -(1 << 23);
    const MAX_COUNT: i32 = (1 << 23) - 1;

    pub fn new(code: SpaceType, count: i32) -> Self {
        Self { code, count }
    }
}

impl NoData for Space6 {}

impl Command for Space6 {
    fn kind(&self) -> CommandKind {
        CommandKind::Space6
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        if !(Self::MIN_COUNT..=Self::MAX_COUNT).contains(&self.count) {
            return Err(ScsiTapeError::invalid_argument(format!(
                "Space count must be in the range -2^23..2^23, got {}",
                self.count
            )));
        }

        let mut data = vec![0; 6];

        data[0] = op_codes::SPACE_6;
        data[1] = self.code as u8;
        // 24-bit two's complement
        data[2..5].copy_from_slice(&self.count.to_be_bytes()[1..]);

        Ok(data)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 6.3
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Locate10 {
    /// Block address type: device-specific rather than logical object id
    pub bt: bool,
    /// Change partition before locating
    pub cp: bool,
    pub immed: bool,
    pub logical_object_identifier: u32,
    pub partition: u8,
}

impl Locate10 {
    pub fn new(logical_object_identifier: u32) -> Self {
        Self {
            logical_object_identifier,
            ..Default::default()
        }
    }

    pub fn in_partition(mut self, partition: u8) -> Self {
        self.cp = true;
        self.partition = partition;
        self
    }
}

impl NoData for Locate10 {}

impl Command for Locate10 {
    fn kind(&self) -> CommandKind {
        CommandKind::Locate10
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = vec![0; 10];

        data[0] = op_codes::LOCATE_10;
        data[1] = flag(self.bt, 0x4) | flag(self.cp, 0x2) | flag(self.immed, 0x1);
        data[3..7].copy_from_slice(&self.logical_object_identifier.to_be_bytes());
        data[8] = self.partition;

        Ok(data)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// Where SPACE(16) should move before spacing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpacePositioning {
    pub partition: u8,
    pub logical_object_identifier: u64,
}

/// SSC-4 Section 5.5
///
/// Without `positioning` the command has no data phase. With it, a 16 byte
/// parameter list naming the starting position is sent to the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Space16 {
    pub code: SpaceType,
    pub count: i64,
    pub positioning: Option<SpacePositioning>,
}

impl Space16 {
    pub const PARAMETER_LIST_LEN: usize = 16;

    pub fn new(code: SpaceType, count: i64) -> Self {
        Self {
            code,
            count,
            positioning: None,
        }
    }

    pub fn starting_at(mut self, partition: u8, logical_object_identifier: u64) -> Self {
        self.positioning = Some(SpacePositioning {
            partition,
            logical_object_identifier,
        });
        self
    }

    /// Data to send with the command; empty without positioning
    pub fn parameter_list(&self) -> Vec<u8> {
        match self.positioning {
            Some(pos) => {
                let mut data = vec![0; Self::PARAMETER_LIST_LEN];
                data[7] = pos.partition;
                data[8..16].copy_from_slice(&pos.logical_object_identifier.to_be_bytes());
                data
            }
            None => Vec::new(),
        }
    }
}

impl NoData for Space16 {}
impl DataOut for Space16 {}

impl Command for Space16 {
    fn kind(&self) -> CommandKind {
        CommandKind::Space16
    }

    fn direction(&self) -> DataDirection {
        if self.positioning.is_some() {
            DataDirection::ToDevice
        } else {
            DataDirection::None
        }
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = vec![0; 16];

        data[0] = op_codes::SPACE_16;
        data[1] = self.code as u8;
        data[4..12].copy_from_slice(&self.count.to_be_bytes());
        let parameter_length = self.transfer_bytes()? as u16;
        data[12..14].copy_from_slice(&parameter_length.to_be_bytes());

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        Ok(if self.positioning.is_some() {
            Self::PARAMETER_LIST_LEN
        } else {
            0
        })
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// Destination type of LOCATE(16)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocateDestination {
    #[default]
    LogicalObject = 0,
    LogicalFile = 1,
    EndOfData = 3,
}

/// SSC-4 Section 7.5
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Locate16 {
    pub dest_type: LocateDestination,
    pub cp: bool,
    pub immed: bool,
    /// Block address mode: implicit rather than explicit addressing
    pub bam: bool,
    pub partition: u8,
    pub logical_object_identifier: u64,
}

impl Locate16 {
    pub fn new(logical_object_identifier: u64) -> Self {
        Self {
            logical_object_identifier,
            ..Default::default()
        }
    }

    pub fn in_partition(mut self, partition: u8) -> Self {
        self.cp = true;
        self.partition = partition;
        self
    }
}

impl NoData for Locate16 {}

impl Command for Locate16 {
    fn kind(&self) -> CommandKind {
        CommandKind::Locate16
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = vec![0; 16];

        data[0] = op_codes::LOCATE_16;
        data[1] = (self.dest_type as u8) << 3 | flag(self.cp, 0x2) | flag(self.immed, 0x1);
        data[2] = flag(self.bam, 0x1);
        data[3] = self.partition;
        data[4..12].copy_from_slice(&self.logical_object_identifier.to_be_bytes());

        Ok(data)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// Service actions of READ POSITION this crate can parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadPositionForm {
    #[default]
    Short,
    Long,
}

/// SSC-4 Section 7.7
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadPosition {
    pub form: ReadPositionForm,
}

impl ReadPosition {
    pub const SHORT_FORM_BLOCK: u8 = 0x00;
    pub const LONG_FORM: u8 = 0x06;

    pub const SHORT_FORM_LEN: usize = 20;
    pub const LONG_FORM_LEN: usize = 32;

    pub fn new(form: ReadPositionForm) -> Self {
        Self { form }
    }

    /// Parse the returned position data; `None` when `buf` is too short
    pub fn parse(&self, buf: &[u8]) -> Option<TapePosition> {
        match self.form {
            ReadPositionForm::Short => {
                if buf.len() < Self::SHORT_FORM_LEN {
                    return None;
                }
                let flags = buf[0];
                // Block location unknown
                let location_unknown = flags & 0x04 != 0;
                Some(TapePosition {
                    partition: u32::from(buf[1]),
                    block_number: u64::from(be_u32(&buf[4..8])),
                    file_number: None,
                    set_number: None,
                    beginning_of_partition: flags & 0x80 != 0,
                    end_of_partition: flags & 0x40 != 0,
                    last_block_number: (!location_unknown).then(|| u64::from(be_u32(&buf[8..12]))),
                    objects_in_buffer: (flags & 0x20 == 0)
                        .then(|| u32::from_be_bytes([0, buf[13], buf[14], buf[15]])),
                    bytes_in_buffer: (flags & 0x10 == 0).then(|| be_u32(&buf[16..20])),
                })
            }
            ReadPositionForm::Long => {
                if buf.len() < Self::LONG_FORM_LEN {
                    return None;
                }
                let flags = buf[0];
                Some(TapePosition {
                    partition: be_u32(&buf[4..8]),
                    block_number: be_u64(&buf[8..16]),
                    file_number: Some(be_u64(&buf[16..24])),
                    set_number: Some(be_u64(&buf[24..32])),
                    beginning_of_partition: flags & 0x80 != 0,
                    end_of_partition: flags & 0x40 != 0,
                    last_block_number: None,
                    objects_in_buffer: None,
                    bytes_in_buffer: None,
                })
            }
        }
    }
}

impl DataIn for ReadPosition {}

impl Command for ReadPosition {
    fn kind(&self) -> CommandKind {
        CommandKind::ReadPosition
    }

    fn direction(&self) -> DataDirection {
        DataDirection::FromDevice
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = vec![0; 10];

        data[0] = op_codes::READ_POSITION;
        data[1] = match self.form {
            ReadPositionForm::Short => Self::SHORT_FORM_BLOCK,
            ReadPositionForm::Long => Self::LONG_FORM,
        };

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        Ok(match self.form {
            ReadPositionForm::Short => Self::SHORT_FORM_LEN,
            ReadPositionForm::Long => Self::LONG_FORM_LEN,
        })
    }
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn be_u64(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewind_immed_sets_only_bit_zero_of_byte_one() {
        let bytes = Rewind { immed: true }.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x01, 0x01, 0x00, 0x00, 0x00, 0x00]);

        // Decode against the wire layout
        assert_eq!(bytes[0], op_codes::REWIND);
        assert_eq!(bytes[1] & 0x01, 0x01);
        assert!(bytes[1..].iter().skip(1).all(|b| *b == 0));
        assert_eq!(bytes[1] & !0x01, 0);
    }

    #[test]
    fn rewind_without_immed_is_opcode_only() {
        assert_eq!(Rewind::new().to_bytes().unwrap(), vec![0x01, 0, 0, 0, 0, 0]);
        assert_eq!(Rewind::new().timeout_class(), TimeoutClass::Long);
    }

    #[test]
    fn space_encodes_negative_count_as_24_bit_twos_complement() {
        let bytes = Space6::new(SpaceType::FileMarks, -1).to_bytes().unwrap();
        assert_eq!(bytes, vec![0x11, 0x01, 0xFF, 0xFF, 0xFF, 0x00]);

        let bytes = Space6::new(SpaceType::Blocks, 300).to_bytes().unwrap();
        assert_eq!(bytes, vec![0x11, 0x00, 0x00, 0x01, 0x2C, 0x00]);
    }

    #[test]
    fn space_rejects_out_of_range_count() {
        assert!(Space6::new(SpaceType::Blocks, 1 << 23).to_bytes().is_err());
        assert!(Space6::new(SpaceType::Blocks, -(1 << 23)).to_bytes().is_ok());
    }

    #[test]
    fn locate_places_partition_in_byte_eight() {
        let bytes = Locate10::new(0x0102_0304).in_partition(1).to_bytes().unwrap();
        assert_eq!(
            bytes,
            vec![0x2B, 0x02, 0x00, 0x01, 0x02, 0x03, 0x04, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn parses_short_form_position() {
        let mut buf = [0u8; 20];
        buf[0] = 0x80;
        buf[1] = 0x01;
        buf[4..8].copy_from_slice(&42u32.to_be_bytes());
        buf[8..12].copy_from_slice(&40u32.to_be_bytes());
        buf[15] = 3;
        buf[16..20].copy_from_slice(&4096u32.to_be_bytes());

        let position = ReadPosition::default().parse(&buf).unwrap();
        assert!(position.beginning_of_partition);
        assert_eq!(position.partition, 1);
        assert_eq!(position.block_number, 42);
        assert_eq!(position.last_block_number, Some(40));
        assert_eq!(position.objects_in_buffer, Some(3));
        assert_eq!(position.bytes_in_buffer, Some(4096));
        assert_eq!(position.file_number, None);
    }

    #[test]
    fn parses_long_form_position() {
        let mut buf = [0u8; 32];
        buf[0] = 0x40;
        buf[4..8].copy_from_slice(&1u32.to_be_bytes());
        buf[8..16].copy_from_slice(&1_000_000u64.to_be_bytes());
        buf[16..24].copy_from_slice(&7u64.to_be_bytes());

        let cmd = ReadPosition::new(ReadPositionForm::Long);
        assert_eq!(cmd.to_bytes().unwrap()[1], 0x06);
        assert_eq!(cmd.transfer_bytes().unwrap(), 32);

        let position = cmd.parse(&buf).unwrap();
        assert!(position.end_of_partition);
        assert_eq!(position.block_number, 1_000_000);
        assert_eq!(position.file_number, Some(7));
        assert_eq!(position.set_number, Some(0));
        assert!(cmd.parse(&buf[..20]).is_none());
    }

    #[test]
    fn space16_takes_a_signed_64_bit_count() {
        let cmd = Space16::new(SpaceType::FileMarks, -2);
        let bytes = cmd.to_bytes().unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 0x91);
        assert_eq!(bytes[1], 0x01);
        assert_eq!(&bytes[4..12], &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(&bytes[12..14], &[0x00, 0x00]);
        assert_eq!(cmd.direction(), DataDirection::None);
        assert!(cmd.parameter_list().is_empty());
    }

    #[test]
    fn space16_with_positioning_sends_parameter_list() {
        let cmd = Space16::new(SpaceType::Blocks, 10).starting_at(1, 0x0A0B);
        let bytes = cmd.to_bytes().unwrap();
        assert_eq!(&bytes[12..14], &[0x00, 0x10]);
        assert_eq!(cmd.direction(), DataDirection::ToDevice);
        assert_eq!(cmd.transfer_bytes().unwrap(), 16);

        let params = cmd.parameter_list();
        assert_eq!(params.len(), 16);
        assert_eq!(params[7], 1);
        assert_eq!(&params[14..16], &[0x0A, 0x0B]);
    }

    #[test]
    fn locate16_encodes_destination_type_and_bam() {
        let cmd = Locate16 {
            dest_type: LocateDestination::LogicalFile,
            bam: true,
            immed: true,
            ..Locate16::new(0x0102).in_partition(2)
        };
        let bytes = cmd.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0x92, 0x0B, 0x01, 0x02]);
        assert_eq!(&bytes[10..12], &[0x01, 0x02]);
        assert!(bytes[12..].iter().all(|b| *b == 0));
    }
}
