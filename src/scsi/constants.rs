// SCSI constant definitions

/// Default sense buffer size reserved per command
pub const SENSE_INFO_LEN: usize = 64;
/// Smallest sense buffer that holds a complete fixed-format record
pub const MIN_SENSE_LEN: usize = 18;
pub const MAX_SENSE_LEN: usize = 255;

/// Largest value representable in a 24-bit CDB length/count field
pub const MAX_TRANSFER_LENGTH_6: u32 = (1 << 24) - 1;

// SCSI operation codes (SPC / SSC)
pub mod op_codes {
    pub const TEST_UNIT_READY: u8 = 0x00;
    pub const REWIND: u8 = 0x01;
    pub const FORMAT_MEDIUM: u8 = 0x04;
    pub const READ_BLOCK_LIMITS: u8 = 0x05;
    pub const READ_6: u8 = 0x08;
    pub const WRITE_6: u8 = 0x0A;
    pub const SET_CAPACITY: u8 = 0x0B;
    pub const READ_REVERSE_6: u8 = 0x0F;
    pub const WRITE_FILEMARKS_6: u8 = 0x10;
    pub const SPACE_6: u8 = 0x11;
    pub const VERIFY_6: u8 = 0x13;
    pub const RECOVER_BUFFERED_DATA: u8 = 0x14;
    pub const ERASE_6: u8 = 0x19;
    pub const LOAD_UNLOAD: u8 = 0x1B;
    pub const PREVENT_ALLOW_MEDIUM_REMOVAL: u8 = 0x1E;
    pub const LOCATE_10: u8 = 0x2B;
    pub const READ_POSITION: u8 = 0x34;
    pub const REPORT_DENSITY_SUPPORT: u8 = 0x44;
    pub const WRITE_FILEMARKS_16: u8 = 0x80;
    pub const READ_REVERSE_16: u8 = 0x81;
    pub const ALLOW_OVERWRITE: u8 = 0x82;
    pub const READ_16: u8 = 0x88;
    pub const WRITE_16: u8 = 0x8A;
    pub const VERIFY_16: u8 = 0x8F;
    pub const SPACE_16: u8 = 0x91;
    pub const LOCATE_16: u8 = 0x92;
    pub const ERASE_16: u8 = 0x93;
}

// SAM status byte values
pub mod status_codes {
    pub const GOOD: u8 = 0x00;
    pub const CHECK_CONDITION: u8 = 0x02;
    pub const CONDITION_MET: u8 = 0x04;
    pub const BUSY: u8 = 0x08;
    pub const RESERVATION_CONFLICT: u8 = 0x18;
    pub const TASK_SET_FULL: u8 = 0x28;
    pub const ACA_ACTIVE: u8 = 0x30;
    pub const TASK_ABORTED: u8 = 0x40;
}

// Sense data response codes
pub mod response_codes {
    pub const FIXED_CURRENT: u8 = 0x70;
    pub const FIXED_DEFERRED: u8 = 0x71;
    pub const DESCRIPTOR_CURRENT: u8 = 0x72;
    pub const DESCRIPTOR_DEFERRED: u8 = 0x73;
}

// Linux sg driver interface (include/scsi/sg.h)
#[cfg(target_os = "linux")]
pub mod sg {
    pub const SG_IO: u32 = 0x2285;
    pub const SG_INTERFACE_ID: i32 = b'S' as i32;
    pub const SG_DXFER_NONE: i32 = -1;
    pub const SG_DXFER_TO_DEV: i32 = -2;
    pub const SG_DXFER_FROM_DEV: i32 = -3;

    pub const DID_TIME_OUT: u16 = 0x03;
    pub const DRIVER_TIMEOUT: u16 = 0x06;
}

// Windows SCSI pass-through data direction
#[cfg(windows)]
pub const SCSI_IOCTL_DATA_OUT: u8 = 0;
#[cfg(windows)]
pub const SCSI_IOCTL_DATA_IN: u8 = 1;
#[cfg(windows)]
pub const SCSI_IOCTL_DATA_UNSPECIFIED: u8 = 2;

#[cfg(windows)]
pub const IOCTL_SCSI_PASS_THROUGH_DIRECT: u32 = 0x0004D014;
