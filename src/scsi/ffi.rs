// Pass-through request structures shared with the OS

/// Linux `sg_io_hdr_t` (include/scsi/sg.h)
#[cfg(target_os = "linux")]
#[repr(C)]
#[derive(Debug)]
pub struct SgIoHdr {
    pub interface_id: libc::c_int,
    pub dxfer_direction: libc::c_int,
    pub cmd_len: libc::c_uchar,
    pub mx_sb_len: libc::c_uchar,
    pub iovec_count: libc::c_ushort,
    pub dxfer_len: libc::c_uint,
    pub dxferp: *mut libc::c_void,
    pub cmdp: *mut libc::c_uchar,
    pub sbp: *mut libc::c_uchar,
    pub timeout: libc::c_uint,
    pub flags: libc::c_uint,
    pub pack_id: libc::c_int,
    pub usr_ptr: *mut libc::c_void,
    pub status: libc::c_uchar,
    pub masked_status: libc::c_uchar,
    pub msg_status: libc::c_uchar,
    pub sb_len_wr: libc::c_uchar,
    pub host_status: libc::c_ushort,
    pub driver_status: libc::c_ushort,
    pub resid: libc::c_int,
    pub duration: libc::c_uint,
    pub info: libc::c_uint,
}

#[cfg(target_os = "linux")]
impl Default for SgIoHdr {
    fn default() -> Self {
        Self {
            interface_id: super::constants::sg::SG_INTERFACE_ID,
            dxfer_direction: super::constants::sg::SG_DXFER_NONE,
            cmd_len: 0,
            mx_sb_len: 0,
            iovec_count: 0,
            dxfer_len: 0,
            dxferp: std::ptr::null_mut(),
            cmdp: std::ptr::null_mut(),
            sbp: std::ptr::null_mut(),
            timeout: 0,
            flags: 0,
            pack_id: 0,
            usr_ptr: std::ptr::null_mut(),
            status: 0,
            masked_status: 0,
            msg_status: 0,
            sb_len_wr: 0,
            host_status: 0,
            driver_status: 0,
            resid: 0,
            duration: 0,
            info: 0,
        }
    }
}

#[cfg(windows)]
use winapi::shared::{
    minwindef::{UCHAR, ULONG, USHORT},
    ntdef::PVOID,
};

/// SCSI Pass Through Direct structure (SCSI_PASS_THROUGH_DIRECT in ntddscsi.h)
#[cfg(windows)]
#[repr(C)]
#[derive(Debug)]
pub struct ScsiPassThroughDirect {
    pub length: USHORT,
    pub scsi_status: UCHAR,
    pub path_id: UCHAR,
    pub target_id: UCHAR,
    pub lun: UCHAR,
    pub cdb_length: UCHAR,
    pub sense_info_length: UCHAR,
    pub data_in: UCHAR,
    pub data_transfer_length: ULONG,
    pub timeout_value: ULONG,
    pub data_buffer: PVOID,
    pub sense_info_offset: ULONG,
    pub cdb: [UCHAR; 16],
}

/// Request block with the sense area appended, as passed to DeviceIoControl
#[cfg(windows)]
#[repr(C)]
pub struct ScsiPassThroughDirectWithSense {
    pub sptd: ScsiPassThroughDirect,
    pub sense: [UCHAR; super::constants::MAX_SENSE_LEN],
}
