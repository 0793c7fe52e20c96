//! Linux sg transport
//!
//! Issues commands with the `SG_IO` ioctl, which both the sg and st drivers
//! accept.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::os::unix::io::AsRawFd;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Completion, DataBuffer, Transport};
use crate::config::DeviceConfig;
use crate::error::{Result, ScsiTapeError, TransportError};
use crate::scsi::constants::sg::*;
use crate::scsi::ffi::SgIoHdr;

#[derive(Debug)]
pub struct SgTransport {
    file: File,
    path: String,
    sense_len: u8,
}

impl SgTransport {
    /// Open a SCSI character device read/write
    pub fn open(path: &str, config: &DeviceConfig) -> Result<Self> {
        debug!("Opening SCSI device: {}", path);

        let metadata =
            std::fs::metadata(path).map_err(|e| ScsiTapeError::open(path, e.to_string()))?;
        if !metadata.file_type().is_char_device() {
            return Err(ScsiTapeError::open(path, "not a character device"));
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true);
        if config.exclusive {
            options.custom_flags(libc::O_EXCL);
        }
        let file = options
            .open(path)
            .map_err(|e| ScsiTapeError::open(path, e.to_string()))?;

        debug!("Device opened successfully: {}", path);
        Ok(Self {
            file,
            path: path.to_string(),
            sense_len: config.sense_buffer_len,
        })
    }
}

impl Transport for SgTransport {
    fn send(
        &mut self,
        cdb: &[u8],
        data: DataBuffer<'_>,
        timeout: Duration,
    ) -> std::result::Result<Completion, TransportError> {
        let mut cdb = cdb.to_vec();
        let mut sense_buffer = vec![0u8; usize::from(self.sense_len)];
        let requested = data.len();

        let mut header = SgIoHdr {
            cmd_len: cdb.len() as libc::c_uchar,
            cmdp: cdb.as_mut_ptr(),
            mx_sb_len: self.sense_len,
            sbp: sense_buffer.as_mut_ptr(),
            timeout: timeout.as_millis().min(u128::from(u32::MAX)) as libc::c_uint,
            dxfer_len: requested as libc::c_uint,
            ..SgIoHdr::default()
        };

        match data {
            DataBuffer::None => header.dxfer_direction = SG_DXFER_NONE,
            DataBuffer::ToDevice(buf) => {
                header.dxfer_direction = SG_DXFER_TO_DEV;
                // The driver only reads from this buffer
                header.dxferp = buf.as_ptr() as *mut libc::c_void;
            }
            DataBuffer::FromDevice(buf) => {
                header.dxfer_direction = SG_DXFER_FROM_DEV;
                header.dxferp = buf.as_mut_ptr() as *mut libc::c_void;
            }
        }

        // SAFETY: every pointer in `header` refers to a buffer that outlives
        // the call, with lengths matching the declared sizes.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), SG_IO as _, &mut header) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            warn!(
                "SG_IO failed on {}: {}, CDB: {:02X?}",
                self.path, err, cdb
            );
            return Err(TransportError::Os {
                code: err.raw_os_error().unwrap_or(-1),
            });
        }

        if header.host_status == DID_TIME_OUT || header.driver_status & 0x0F == DRIVER_TIMEOUT {
            warn!("Command timed out on {}, CDB: {:02X?}", self.path, cdb);
            return Err(TransportError::Timeout);
        }
        if header.host_status != 0 {
            warn!(
                "Host adapter reported 0x{:04X} on {}, CDB: {:02X?}",
                header.host_status, self.path, cdb
            );
            return Err(TransportError::Host {
                code: header.host_status,
            });
        }

        let sense_written = usize::from(header.sb_len_wr).min(sense_buffer.len());
        sense_buffer.truncate(sense_written);

        Ok(Completion {
            status: header.status,
            sense: sense_buffer,
            host_status: header.host_status,
            driver_status: header.driver_status,
            residual: usize::try_from(header.resid).unwrap_or(0).min(requested),
        })
    }
}

impl Drop for SgTransport {
    fn drop(&mut self) {
        debug!("Device handle closed: {}", self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nst9");
        let err = SgTransport::open(path.to_str().unwrap(), &DeviceConfig::default()).unwrap_err();
        assert!(matches!(err, ScsiTapeError::Open { .. }));
    }

    #[test]
    fn open_rejects_regular_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err =
            SgTransport::open(file.path().to_str().unwrap(), &DeviceConfig::default()).unwrap_err();
        match err {
            ScsiTapeError::Open { reason, .. } => assert_eq!(reason, "not a character device"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
