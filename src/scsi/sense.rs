//! SCSI Sense Data Parsing
//!
//! Decodes fixed and descriptor format sense data (SPC-4 4.5). Parsing is
//! total: anything the device or driver hands back yields a `Sense`, with
//! unreadable buffers flagged as malformed instead of rejected.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::constants::response_codes;

/// Sense key (SPC-4 table 48)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SenseKey {
    NoSense,
    RecoveredError,
    NotReady,
    MediumError,
    HardwareError,
    IllegalRequest,
    UnitAttention,
    DataProtect,
    BlankCheck,
    VendorSpecific,
    CopyAborted,
    AbortedCommand,
    Reserved,
    VolumeOverflow,
    Miscompare,
    Completed,
}

impl SenseKey {
    /// Decode the low nibble of `val`
    pub fn from_u8(val: u8) -> Self {
        match val & 0x0F {
            0x00 => SenseKey::NoSense,
            0x01 => SenseKey::RecoveredError,
            0x02 => SenseKey::NotReady,
            0x03 => SenseKey::MediumError,
            0x04 => SenseKey::HardwareError,
            0x05 => SenseKey::IllegalRequest,
            0x06 => SenseKey::UnitAttention,
            0x07 => SenseKey::DataProtect,
            0x08 => SenseKey::BlankCheck,
            0x09 => SenseKey::VendorSpecific,
            0x0A => SenseKey::CopyAborted,
            0x0B => SenseKey::AbortedCommand,
            0x0C => SenseKey::Reserved,
            0x0D => SenseKey::VolumeOverflow,
            0x0E => SenseKey::Miscompare,
            _ => SenseKey::Completed,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SenseKey::NoSense => "no sense",
            SenseKey::RecoveredError => "recovered error",
            SenseKey::NotReady => "not ready",
            SenseKey::MediumError => "medium error",
            SenseKey::HardwareError => "hardware error",
            SenseKey::IllegalRequest => "illegal request",
            SenseKey::UnitAttention => "unit attention",
            SenseKey::DataProtect => "data protect",
            SenseKey::BlankCheck => "blank check",
            SenseKey::VendorSpecific => "vendor specific",
            SenseKey::CopyAborted => "copy aborted",
            SenseKey::AbortedCommand => "aborted command",
            SenseKey::Reserved => "reserved",
            SenseKey::VolumeOverflow => "volume overflow",
            SenseKey::Miscompare => "miscompare",
            SenseKey::Completed => "completed",
        }
    }
}

impl fmt::Display for SenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SenseFormat {
    Fixed,
    Descriptor,
    Unrecognized,
}

/// Decoded sense data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sense {
    pub format: SenseFormat,
    pub response_code: u8,
    pub deferred: bool,
    /// The information field holds a value defined by the command
    pub valid: bool,
    pub key: SenseKey,
    pub asc: u8,
    pub ascq: u8,
    /// 4 bytes in fixed format, 8 bytes in descriptor format
    pub information: u64,
    pub command_specific_information: u64,
    pub field_replaceable_unit: u8,
    pub sense_key_specific: Option<[u8; 3]>,
    pub filemark: bool,
    pub end_of_medium: bool,
    pub incorrect_length: bool,
    /// Set when the buffer could not be fully decoded
    pub malformed: bool,
    pub raw: Vec<u8>,
}

impl Sense {
    /// Minimum fixed-format length that still contains ASC and ASCQ
    const FIXED_MIN_LEN: usize = 14;
    const DESCRIPTOR_HEADER_LEN: usize = 8;

    pub fn from_buf(buf: &[u8]) -> Sense {
        let mut sense = Sense {
            format: SenseFormat::Unrecognized,
            response_code: 0,
            deferred: false,
            valid: false,
            key: SenseKey::NoSense,
            asc: 0,
            ascq: 0,
            information: 0,
            command_specific_information: 0,
            field_replaceable_unit: 0,
            sense_key_specific: None,
            filemark: false,
            end_of_medium: false,
            incorrect_length: false,
            malformed: false,
            raw: buf.to_vec(),
        };

        let Some(&first) = buf.first() else {
            debug!("Empty sense buffer");
            sense.malformed = true;
            return sense;
        };

        sense.response_code = first & 0x7F;
        match sense.response_code {
            response_codes::FIXED_CURRENT | response_codes::FIXED_DEFERRED => {
                sense.parse_fixed(buf)
            }
            response_codes::DESCRIPTOR_CURRENT | response_codes::DESCRIPTOR_DEFERRED => {
                sense.parse_descriptor(buf)
            }
            other => {
                debug!("Unrecognized sense response code 0x{:02X}", other);
                sense.malformed = true;
            }
        }

        debug!(
            "Sense data - Key: 0x{:02X}, ASC: 0x{:02X}, ASCQ: 0x{:02X}, malformed: {}",
            sense.key.to_u8(),
            sense.asc,
            sense.ascq,
            sense.malformed
        );

        sense
    }

    fn parse_fixed(&mut self, buf: &[u8]) {
        self.format = SenseFormat::Fixed;
        self.deferred = self.response_code == response_codes::FIXED_DEFERRED;
        self.valid = buf[0] & 0x80 != 0;
        if buf.len() < Self::FIXED_MIN_LEN {
            self.malformed = true;
        }

        let flags = byte_at(buf, 2);
        self.filemark = flags & 0x80 != 0;
        self.end_of_medium = flags & 0x40 != 0;
        self.incorrect_length = flags & 0x20 != 0;
        self.key = SenseKey::from_u8(flags);

        self.information = u64::from(be_u32_at(buf, 3));
        self.command_specific_information = u64::from(be_u32_at(buf, 8));
        self.asc = byte_at(buf, 12);
        self.ascq = byte_at(buf, 13);
        self.field_replaceable_unit = byte_at(buf, 14);

        // SKSV
        if buf.len() >= 18 && buf[15] & 0x80 != 0 {
            self.sense_key_specific = Some([buf[15], buf[16], buf[17]]);
        }
    }

    fn parse_descriptor(&mut self, buf: &[u8]) {
        self.format = SenseFormat::Descriptor;
        self.deferred = self.response_code == response_codes::DESCRIPTOR_DEFERRED;
        if buf.len() < 4 {
            self.malformed = true;
        }

        self.key = SenseKey::from_u8(byte_at(buf, 1));
        self.asc = byte_at(buf, 2);
        self.ascq = byte_at(buf, 3);

        let additional = usize::from(byte_at(buf, 7));
        let end = buf.len().min(Self::DESCRIPTOR_HEADER_LEN + additional);
        let mut offset = Self::DESCRIPTOR_HEADER_LEN;

        while offset + 2 <= end {
            let descriptor_type = buf[offset];
            let body_end = offset + 2 + usize::from(buf[offset + 1]);
            if body_end > end {
                debug!(
                    "Sense descriptor 0x{:02X} at offset {} overruns the buffer",
                    descriptor_type, offset
                );
                self.malformed = true;
                break;
            }
            let body = &buf[offset + 2..body_end];

            match descriptor_type {
                // Information
                0x00 if body.len() >= 10 => {
                    self.valid = body[0] & 0x80 != 0;
                    self.information = be_u64_at(body, 2);
                }
                // Command-specific information
                0x01 if body.len() >= 10 => {
                    self.command_specific_information = be_u64_at(body, 2);
                }
                // Sense key specific
                0x02 if body.len() >= 5 => {
                    if body[2] & 0x80 != 0 {
                        self.sense_key_specific = Some([body[2], body[3], body[4]]);
                    }
                }
                // Field replaceable unit
                0x03 if body.len() >= 2 => {
                    self.field_replaceable_unit = body[1];
                }
                // Stream commands
                0x04 if body.len() >= 2 => {
                    self.filemark = body[1] & 0x80 != 0;
                    self.end_of_medium = body[1] & 0x40 != 0;
                    self.incorrect_length = body[1] & 0x20 != 0;
                }
                _ => {}
            }

            offset = body_end;
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// ASC and ASCQ combined as `asc << 8 | ascq`
    pub fn additional_sense_code(&self) -> u16 {
        (u16::from(self.asc) << 8) | u16::from(self.ascq)
    }

    /// Information field interpreted as a signed quantity. Stream commands
    /// report a negative residue when the block on tape was larger than
    /// the requested length.
    pub fn signed_information(&self) -> i64 {
        match self.format {
            SenseFormat::Fixed => i64::from(self.information as u32 as i32),
            _ => self.information as i64,
        }
    }

    pub fn description(&self) -> Option<&'static str> {
        additional_sense_description(self.asc, self.ascq)
    }

    /// Field name to rendered value, in wire order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let origin = if self.deferred { "deferred" } else { "current" };
        let format = match self.format {
            SenseFormat::Fixed => "fixed format",
            SenseFormat::Descriptor => "descriptor format",
            SenseFormat::Unrecognized => "unrecognized format",
        };

        let mut fields = vec![
            (
                "response_code",
                format!("0x{:02X} ({}, {})", self.response_code, origin, format),
            ),
            ("valid", self.valid.to_string()),
            (
                "sense_key",
                format!("{} (0x{:X})", self.key, self.key.to_u8()),
            ),
            (
                "asc_ascq",
                match self.description() {
                    Some(text) => format!("0x{:02X}/0x{:02X} ({})", self.asc, self.ascq, text),
                    None => format!("0x{:02X}/0x{:02X}", self.asc, self.ascq),
                },
            ),
            (
                "information",
                format!("0x{:X} ({})", self.information, self.signed_information()),
            ),
            (
                "command_specific_information",
                format!("0x{:X}", self.command_specific_information),
            ),
            (
                "field_replaceable_unit",
                format!("0x{:02X}", self.field_replaceable_unit),
            ),
        ];

        let mut flags = Vec::new();
        if self.filemark {
            flags.push("FILEMARK");
        }
        if self.end_of_medium {
            flags.push("EOM");
        }
        if self.incorrect_length {
            flags.push("ILI");
        }
        if !flags.is_empty() {
            fields.push(("flags", flags.join(" ")));
        }

        if let Some(sks) = self.sense_key_specific {
            fields.push((
                "sense_key_specific",
                format!("{:02X} {:02X} {:02X}", sks[0], sks[1], sks[2]),
            ));
        }

        if self.malformed {
            fields.push(("malformed", "true".to_string()));
        }

        fields
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields();
        for (i, (name, value)) in fields.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:<30} {}", format!("{}:", name), value)?;
        }
        Ok(())
    }
}

/// Text for the ASC/ASCQ pairs a sequential-access device commonly reports
pub fn additional_sense_description(asc: u8, ascq: u8) -> Option<&'static str> {
    let text = match (asc, ascq) {
        (0x00, 0x00) => "no additional sense information",
        (0x00, 0x01) => "filemark detected",
        (0x00, 0x02) => "end-of-partition/medium detected",
        (0x00, 0x03) => "setmark detected",
        (0x00, 0x04) => "beginning-of-partition/medium detected",
        (0x00, 0x05) => "end-of-data detected",
        (0x00, 0x16) => "operation in progress",
        (0x00, 0x17) => "cleaning requested",
        (0x04, 0x00) => "logical unit not ready, cause not reportable",
        (0x04, 0x01) => "logical unit is in process of becoming ready",
        (0x04, 0x02) => "logical unit not ready, initializing command required",
        (0x04, 0x03) => "logical unit not ready, manual intervention required",
        (0x0C, 0x00) => "write error",
        (0x11, 0x00) => "unrecovered read error",
        (0x14, 0x00) => "recorded entity not found",
        (0x14, 0x03) => "end-of-data not found",
        (0x1A, 0x00) => "parameter list length error",
        (0x20, 0x00) => "invalid command operation code",
        (0x24, 0x00) => "invalid field in cdb",
        (0x25, 0x00) => "logical unit not supported",
        (0x26, 0x00) => "invalid field in parameter list",
        (0x27, 0x00) => "write protected",
        (0x28, 0x00) => "not ready to ready change, medium may have changed",
        (0x29, 0x00) => "power on, reset, or bus device reset occurred",
        (0x2A, 0x01) => "mode parameters changed",
        (0x30, 0x00) => "incompatible medium installed",
        (0x30, 0x03) => "cleaning cartridge installed",
        (0x31, 0x00) => "medium format corrupted",
        (0x33, 0x00) => "tape length error",
        (0x3A, 0x00) => "medium not present",
        (0x3B, 0x00) => "sequential positioning error",
        (0x3B, 0x08) => "reposition error",
        (0x3B, 0x0D) => "medium destination element full",
        (0x3B, 0x0E) => "medium source element empty",
        (0x44, 0x00) => "internal target failure",
        (0x50, 0x00) => "write append error",
        (0x51, 0x00) => "erase failure",
        (0x52, 0x00) => "cartridge fault",
        (0x53, 0x00) => "media load or eject failed",
        (0x53, 0x02) => "medium removal prevented",
        _ => return None,
    };
    Some(text)
}

fn byte_at(buf: &[u8], offset: usize) -> u8 {
    buf.get(offset).copied().unwrap_or(0)
}

/// Big-endian u32 at `offset`; bytes past the end read as zero
fn be_u32_at(buf: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = byte_at(buf, offset + i);
    }
    u32::from_be_bytes(bytes)
}

fn be_u64_at(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = byte_at(buf, offset + i);
    }
    u64::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(key: u8, asc: u8, ascq: u8) -> Vec<u8> {
        let mut data = vec![0u8; 18];
        data[0] = 0x70;
        data[2] = key;
        data[7] = 10;
        data[12] = asc;
        data[13] = ascq;
        data
    }

    #[test]
    fn parses_fixed_filemark_with_residue() {
        let mut data = fixed(0x00, 0x00, 0x01);
        data[0] |= 0x80;
        data[2] |= 0x80;
        data[3..7].copy_from_slice(&80u32.to_be_bytes());

        let sense = Sense::from_buf(&data);
        assert_eq!(sense.format, SenseFormat::Fixed);
        assert!(sense.valid);
        assert!(sense.filemark);
        assert!(!sense.malformed);
        assert_eq!(sense.key, SenseKey::NoSense);
        assert_eq!(sense.information, 80);
        assert_eq!(sense.signed_information(), 80);
        assert_eq!(sense.description(), Some("filemark detected"));
    }

    #[test]
    fn negative_residue_is_sign_extended() {
        // Block on tape was 16 bytes longer than requested
        let mut data = fixed(0x00, 0x00, 0x00);
        data[0] |= 0x80;
        data[2] |= 0x20;
        data[3..7].copy_from_slice(&(-16i32).to_be_bytes());

        let sense = Sense::from_buf(&data);
        assert!(sense.incorrect_length);
        assert_eq!(sense.signed_information(), -16);
    }

    #[test]
    fn parses_fixed_sense_key_specific() {
        let mut data = fixed(0x05, 0x24, 0x00);
        data[15] = 0xC0;
        data[16] = 0x00;
        data[17] = 0x02;

        let sense = Sense::from_buf(&data);
        assert_eq!(sense.key, SenseKey::IllegalRequest);
        assert_eq!(sense.sense_key_specific, Some([0xC0, 0x00, 0x02]));
        assert_eq!(sense.additional_sense_code(), 0x2400);
    }

    #[test]
    fn parses_descriptor_format() {
        let data = vec![
            0x72, 0x03, 0x11, 0x00, 0x00, 0x00, 0x00, 0x10, // header, 16 bytes follow
            0x00, 0x0A, 0x80, 0x00, 0, 0, 0, 0, 0, 0, 0x01, 0x00, // information = 256
            0x04, 0x02, 0x00, 0x40, // stream commands: EOM
        ];

        let sense = Sense::from_buf(&data);
        assert_eq!(sense.format, SenseFormat::Descriptor);
        assert_eq!(sense.key, SenseKey::MediumError);
        assert_eq!(sense.asc, 0x11);
        assert!(sense.valid);
        assert_eq!(sense.information, 256);
        assert!(sense.end_of_medium);
        assert!(!sense.malformed);
    }

    #[test]
    fn overrunning_descriptor_is_flagged() {
        let data = vec![0x72, 0x03, 0x11, 0x00, 0, 0, 0, 0x04, 0x00, 0x0A, 0x80, 0x00];
        let sense = Sense::from_buf(&data);
        assert_eq!(sense.key, SenseKey::MediumError);
        assert!(sense.malformed);
    }

    #[test]
    fn short_and_unknown_buffers_are_flagged() {
        assert!(Sense::from_buf(&[]).malformed);

        let truncated = Sense::from_buf(&[0x70, 0x00, 0x02, 0x00, 0x00]);
        assert!(truncated.malformed);
        assert_eq!(truncated.key, SenseKey::NotReady);

        let garbage = Sense::from_buf(&[0x12, 0x34, 0x56]);
        assert_eq!(garbage.format, SenseFormat::Unrecognized);
        assert!(garbage.malformed);
        assert_eq!(garbage.raw, vec![0x12, 0x34, 0x56]);
    }

    #[test]
    fn decoding_never_panics() {
        for len in 0..48usize {
            for seed in [0x00u8, 0x70, 0x72, 0xFF, 0xF2] {
                let data: Vec<u8> = (0..len)
                    .map(|i| if i == 0 { seed } else { (i as u8).wrapping_mul(37) ^ seed })
                    .collect();
                let sense = Sense::from_buf(&data);
                assert_eq!(sense.raw.len(), len);
            }
        }
    }

    #[test]
    fn display_lists_named_fields() {
        let sense = Sense::from_buf(&fixed(0x02, 0x3A, 0x00));
        let text = sense.to_string();
        assert!(text.contains("sense_key:"));
        assert!(text.contains("not ready"));
        assert!(text.contains("medium not present"));
    }
}
