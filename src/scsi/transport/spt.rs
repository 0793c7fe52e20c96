//! Windows SCSI pass-through transport
//!
//! Issues commands through `IOCTL_SCSI_PASS_THROUGH_DIRECT` on a tape
//! device handle such as `\\.\TAPE0`.

use std::ffi::CString;
use std::time::Duration;
use tracing::{debug, warn};

use winapi::{
    shared::{
        minwindef::{DWORD, UCHAR, ULONG, USHORT},
        ntdef::{HANDLE, PVOID},
        winerror::ERROR_SEM_TIMEOUT,
    },
    um::{
        errhandlingapi::GetLastError,
        fileapi::{CreateFileA, OPEN_EXISTING},
        handleapi::{CloseHandle, INVALID_HANDLE_VALUE},
        ioapiset::DeviceIoControl,
        winnt::{FILE_SHARE_READ, FILE_SHARE_WRITE, GENERIC_READ, GENERIC_WRITE},
    },
};

use super::{Completion, DataBuffer, Transport};
use crate::config::DeviceConfig;
use crate::error::{Result, ScsiTapeError, TransportError};
use crate::scsi::constants::*;
use crate::scsi::ffi::{ScsiPassThroughDirect, ScsiPassThroughDirectWithSense};

#[derive(Debug)]
pub struct SptTransport {
    handle: HANDLE,
    path: String,
    sense_len: usize,
}

// The handle is exclusively owned and only used through `&mut self`
unsafe impl Send for SptTransport {}

impl SptTransport {
    /// Open a tape device, accepting `TAPE0` as shorthand for `\\.\TAPE0`
    pub fn open(device_path: &str, config: &DeviceConfig) -> Result<Self> {
        debug!("Opening tape device: {}", device_path);

        let full_path = if device_path.starts_with("TAPE") {
            format!(r"\\.\{}", device_path)
        } else {
            device_path.to_string()
        };

        let path_cstring = CString::new(full_path.clone())
            .map_err(|e| ScsiTapeError::open(&full_path, format!("invalid path: {}", e)))?;

        let share_mode = if config.exclusive {
            0
        } else {
            FILE_SHARE_READ | FILE_SHARE_WRITE
        };

        let handle = unsafe {
            CreateFileA(
                path_cstring.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                share_mode,
                std::ptr::null_mut(),
                OPEN_EXISTING,
                0,
                std::ptr::null_mut(),
            )
        };

        if handle == INVALID_HANDLE_VALUE {
            let error_code = unsafe { GetLastError() };
            return Err(ScsiTapeError::open(
                full_path,
                format!("Windows error code 0x{:08X}", error_code),
            ));
        }

        debug!("Device opened successfully: {}", full_path);
        Ok(Self {
            handle,
            path: full_path,
            sense_len: usize::from(config.sense_buffer_len),
        })
    }
}

impl Transport for SptTransport {
    fn send(
        &mut self,
        cdb: &[u8],
        mut data: DataBuffer<'_>,
        timeout: Duration,
    ) -> std::result::Result<Completion, TransportError> {
        if cdb.len() > 16 {
            return Err(TransportError::Unsupported(format!(
                "CDB of {} bytes exceeds pass-through limit",
                cdb.len()
            )));
        }

        let requested = data.len();
        let (data_in, data_ptr) = match &mut data {
            DataBuffer::None => (SCSI_IOCTL_DATA_UNSPECIFIED, std::ptr::null_mut()),
            DataBuffer::ToDevice(buf) => (SCSI_IOCTL_DATA_OUT, buf.as_ptr() as PVOID),
            DataBuffer::FromDevice(buf) => (SCSI_IOCTL_DATA_IN, buf.as_mut_ptr() as PVOID),
        };

        let header_len = std::mem::size_of::<ScsiPassThroughDirect>();
        // SAFETY: plain-old-data request block, all-zero is a valid value
        let mut request: ScsiPassThroughDirectWithSense = unsafe { std::mem::zeroed() };

        request.sptd.length = header_len as USHORT;
        request.sptd.cdb_length = cdb.len() as UCHAR;
        request.sptd.data_buffer = data_ptr;
        request.sptd.sense_info_length = self.sense_len as UCHAR;
        request.sptd.sense_info_offset =
            std::mem::offset_of!(ScsiPassThroughDirectWithSense, sense) as ULONG;
        request.sptd.data_transfer_length = requested as ULONG;
        request.sptd.timeout_value = timeout.as_secs().clamp(1, u64::from(u32::MAX)) as ULONG;
        request.sptd.data_in = data_in;
        request.sptd.cdb[..cdb.len()].copy_from_slice(cdb);

        let request_len = std::mem::size_of::<ScsiPassThroughDirectWithSense>() as DWORD;
        let request_ptr = &mut request as *mut ScsiPassThroughDirectWithSense as PVOID;
        let mut bytes_returned: DWORD = 0;

        // SAFETY: `request` and the data buffer stay alive for the whole call
        let ok = unsafe {
            DeviceIoControl(
                self.handle,
                IOCTL_SCSI_PASS_THROUGH_DIRECT,
                request_ptr,
                request_len,
                request_ptr,
                request_len,
                &mut bytes_returned,
                std::ptr::null_mut(),
            ) != 0
        };

        if !ok {
            let error_code = unsafe { GetLastError() };
            warn!(
                "SCSI command failed on {}: Windows error code 0x{:08X}, CDB: {:02X?}",
                self.path, error_code, cdb
            );
            if error_code == ERROR_SEM_TIMEOUT {
                return Err(TransportError::Timeout);
            }
            return Err(TransportError::Os {
                code: error_code as i32,
            });
        }

        let sense_written = usize::from(request.sptd.sense_info_length).min(self.sense_len);
        let transferred = (request.sptd.data_transfer_length as usize).min(requested);

        Ok(Completion {
            status: request.sptd.scsi_status,
            sense: request.sense[..sense_written].to_vec(),
            host_status: 0,
            driver_status: 0,
            residual: requested - transferred,
        })
    }
}

impl Drop for SptTransport {
    fn drop(&mut self) {
        unsafe {
            if self.handle != INVALID_HANDLE_VALUE {
                CloseHandle(self.handle);
                debug!("Device handle closed: {}", self.path);
            }
        }
    }
}
