//! SCSI Medium Commands
//!
//! FORMAT MEDIUM, SET CAPACITY, ALLOW OVERWRITE and REPORT DENSITY SUPPORT.

use crate::error::{Result, ScsiTapeError};

use super::super::constants::op_codes;
use super::super::types::{CommandKind, DataDirection, DensityDescriptor, TimeoutClass};
use super::{flag, Command, DataIn, DataOut, NoData};

/// SSC-4 Section 7.2
///
/// A non-zero `transfer_length` sends that many bytes of format parameters
/// (a MODE SELECT style partition page) with the command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatMedium {
    pub verify: bool,
    pub immed: bool,
    pub format: u8,
    pub transfer_length: u16,
}

impl FormatMedium {
    pub const DEFAULT: u8 = 0x0;
    pub const PARTITION_VOLUME: u8 = 0x1;
    pub const DEFAULT_THEN_PARTITION: u8 = 0x2;

    pub fn new(format: u8) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }
}

impl NoData for FormatMedium {}
impl DataOut for FormatMedium {}

impl Command for FormatMedium {
    fn kind(&self) -> CommandKind {
        CommandKind::FormatMedium
    }

    fn direction(&self) -> DataDirection {
        if self.transfer_length > 0 {
            DataDirection::ToDevice
        } else {
            DataDirection::None
        }
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.format > 0x0F {
            return Err(ScsiTapeError::invalid_argument(format!(
                "Format must be in the range 0..16, got {}",
                self.format
            )));
        }

        let mut data = vec![0; 6];

        data[0] = op_codes::FORMAT_MEDIUM;
        data[1] = flag(self.verify, 0x2) | flag(self.immed, 0x1);
        data[2] = self.format;
        data[3..5].copy_from_slice(&self.transfer_length.to_be_bytes());

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        Ok(usize::from(self.transfer_length))
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 7.11
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetCapacity {
    pub immed: bool,
    /// Fraction of the native capacity to use, in units of 1/65535
    pub capacity_proportion_value: u16,
}

impl NoData for SetCapacity {}

impl Command for SetCapacity {
    fn kind(&self) -> CommandKind {
        CommandKind::SetCapacity
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = vec![0; 6];

        data[0] = op_codes::SET_CAPACITY;
        data[1] = flag(self.immed, 0x1);
        data[3..5].copy_from_slice(&self.capacity_proportion_value.to_be_bytes());

        Ok(data)
    }

    fn timeout_class(&self) -> TimeoutClass {
        TimeoutClass::Long
    }
}

/// SSC-4 Section 5.1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllowOverwrite {
    pub allow_overwrite: u8,
    pub partition: u8,
    pub logical_object_identifier: u64,
}

impl AllowOverwrite {
    pub const DISABLED: u8 = 0x0;
    pub const CURRENT_POSITION: u8 = 0x1;
    pub const FORMAT: u8 = 0x2;
}

impl NoData for AllowOverwrite {}

impl Command for AllowOverwrite {
    fn kind(&self) -> CommandKind {
        CommandKind::AllowOverwrite
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.allow_overwrite > 0x0F {
            return Err(ScsiTapeError::invalid_argument(format!(
                "Allow overwrite must be in the range 0..16, got {}",
                self.allow_overwrite
            )));
        }

        let mut data = vec![0; 16];

        data[0] = op_codes::ALLOW_OVERWRITE;
        data[2] = self.allow_overwrite;
        data[3] = self.partition;
        data[4..12].copy_from_slice(&self.logical_object_identifier.to_be_bytes());

        Ok(data)
    }
}

/// SSC-4 Section 7.8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDensitySupport {
    /// Report medium types instead of densities
    pub medium_type: bool,
    /// Report only what the mounted medium supports
    pub media: bool,
    pub allocation_length: u16,
}

impl Default for ReportDensitySupport {
    fn default() -> Self {
        Self {
            medium_type: false,
            media: false,
            allocation_length: Self::DEFAULT_ALLOCATION_LEN,
        }
    }
}

impl ReportDensitySupport {
    pub const DEFAULT_ALLOCATION_LEN: u16 = 1024;
    const HEADER_LEN: usize = 4;
    const DESCRIPTOR_LEN: usize = 52;

    pub fn new() -> Self {
        Default::default()
    }

    /// Parse density descriptors. Medium type reports use a different
    /// layout and yield `None`, as does a buffer without a full header.
    pub fn parse(&self, buf: &[u8]) -> Option<Vec<DensityDescriptor>> {
        if self.medium_type || buf.len() < Self::HEADER_LEN {
            return None;
        }

        // Available length counts the bytes after its own field
        let available = usize::from(u16::from_be_bytes([buf[0], buf[1]]));
        let end = buf.len().min(2 + available);
        let body = buf.get(Self::HEADER_LEN..end).unwrap_or_default();

        Some(
            body.chunks_exact(Self::DESCRIPTOR_LEN)
                .map(|d| DensityDescriptor {
                    primary_density_code: d[0],
                    secondary_density_code: d[1],
                    write_ok: d[2] & 0x80 != 0,
                    duplicate: d[2] & 0x40 != 0,
                    default: d[2] & 0x20 != 0,
                    bits_per_mm: u32::from_be_bytes([0, d[5], d[6], d[7]]),
                    media_width: u16::from_be_bytes([d[8], d[9]]),
                    tracks: u16::from_be_bytes([d[10], d[11]]),
                    capacity: u32::from_be_bytes([d[12], d[13], d[14], d[15]]),
                    assigning_organization: ascii_field(&d[16..24]),
                    density_name: ascii_field(&d[24..32]),
                    description: ascii_field(&d[32..52]),
                })
                .collect(),
        )
    }
}

impl DataIn for ReportDensitySupport {}

impl Command for ReportDensitySupport {
    fn kind(&self) -> CommandKind {
        CommandKind::ReportDensitySupport
    }

    fn direction(&self) -> DataDirection {
        DataDirection::FromDevice
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = vec![0; 10];

        data[0] = op_codes::REPORT_DENSITY_SUPPORT;
        data[1] = flag(self.medium_type, 0x2) | flag(self.media, 0x1);
        data[7..9].copy_from_slice(&self.allocation_length.to_be_bytes());

        Ok(data)
    }

    fn transfer_bytes(&self) -> Result<usize> {
        Ok(usize::from(self.allocation_length))
    }
}

/// Space or NUL padded ASCII
fn ascii_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(|c: char| c == ' ' || c == '\0')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_medium_with_parameters_is_data_out() {
        let cmd = FormatMedium {
            verify: true,
            transfer_length: 0x0102,
            ..FormatMedium::new(FormatMedium::PARTITION_VOLUME)
        };
        assert_eq!(cmd.to_bytes().unwrap(), vec![0x04, 0x02, 0x01, 0x01, 0x02, 0x00]);
        assert_eq!(cmd.direction(), DataDirection::ToDevice);
        assert_eq!(cmd.transfer_bytes().unwrap(), 0x0102);

        let plain = FormatMedium::new(FormatMedium::DEFAULT);
        assert_eq!(plain.direction(), DataDirection::None);
        assert!(FormatMedium::new(16).to_bytes().is_err());
    }

    #[test]
    fn set_capacity_and_allow_overwrite_layout() {
        let cmd = SetCapacity {
            immed: true,
            capacity_proportion_value: 0x8000,
        };
        assert_eq!(cmd.to_bytes().unwrap(), vec![0x0B, 0x01, 0x00, 0x80, 0x00, 0x00]);

        let cmd = AllowOverwrite {
            allow_overwrite: AllowOverwrite::CURRENT_POSITION,
            partition: 1,
            logical_object_identifier: 0x33,
        };
        let bytes = cmd.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0x82, 0x00, 0x01, 0x01]);
        assert_eq!(bytes[11], 0x33);
        assert!(AllowOverwrite {
            allow_overwrite: 0x10,
            ..Default::default()
        }
        .to_bytes()
        .is_err());
    }

    #[test]
    fn parses_density_descriptors() {
        let mut buf = vec![0u8; 4 + 52];
        buf[0..2].copy_from_slice(&54u16.to_be_bytes());
        let d = &mut buf[4..];
        d[0] = 0x5A;
        d[1] = 0x5A;
        d[2] = 0xA0;
        d[5..8].copy_from_slice(&[0x00, 0x4E, 0x20]);
        d[8..10].copy_from_slice(&127u16.to_be_bytes());
        d[10..12].copy_from_slice(&6656u16.to_be_bytes());
        d[12..16].copy_from_slice(&12_000_000u32.to_be_bytes());
        d[16..24].copy_from_slice(b"LTO-CVE ");
        d[24..32].copy_from_slice(b"U-832   ");
        d[32..38].copy_from_slice(b"Ultriu");

        let cmd = ReportDensitySupport::new();
        assert_eq!(&cmd.to_bytes().unwrap()[7..9], &[0x04, 0x00]);

        let densities = cmd.parse(&buf).unwrap();
        assert_eq!(densities.len(), 1);
        let density = &densities[0];
        assert_eq!(density.primary_density_code, 0x5A);
        assert!(density.write_ok);
        assert!(density.default);
        assert!(!density.duplicate);
        assert_eq!(density.bits_per_mm, 20000);
        assert_eq!(density.capacity, 12_000_000);
        assert_eq!(density.assigning_organization, "LTO-CVE");
        assert_eq!(density.density_name, "U-832");
        assert_eq!(density.description, "Ultriu");
    }

    #[test]
    fn truncated_density_report_yields_whole_descriptors_only() {
        let mut buf = vec![0u8; 30];
        buf[0..2].copy_from_slice(&106u16.to_be_bytes());
        let cmd = ReportDensitySupport::new();
        assert_eq!(cmd.parse(&buf), Some(Vec::new()));
        assert!(cmd.parse(&buf[..2]).is_none());

        let types = ReportDensitySupport {
            medium_type: true,
            ..Default::default()
        };
        assert!(types.parse(&buf).is_none());
    }
}
