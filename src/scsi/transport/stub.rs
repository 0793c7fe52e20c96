//! Scripted transport
//!
//! Replays queued replies instead of talking to hardware and records every
//! command it receives. The shared `StubLog` stays usable after the
//! transport has been moved into a `Device`.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use super::{Completion, DataBuffer, Transport};
use crate::error::TransportError;
use crate::scsi::constants::{response_codes, status_codes};
use crate::scsi::sense::SenseKey;
use crate::scsi::types::DataDirection;

/// One scripted reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubReply {
    status: u8,
    sense: Vec<u8>,
    data: Vec<u8>,
    residual: Option<usize>,
    failure: Option<TransportError>,
}

impl StubReply {
    pub fn good() -> Self {
        Self::default()
    }

    pub fn check_condition(sense: Vec<u8>) -> Self {
        Self {
            status: status_codes::CHECK_CONDITION,
            sense,
            ..Self::default()
        }
    }

    pub fn with_status(status: u8) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn failure(error: TransportError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Bytes delivered into a device-to-host buffer
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Override the residual the transport reports
    pub fn with_residual(mut self, residual: usize) -> Self {
        self.residual = Some(residual);
        self
    }
}

/// A command as the stub received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub cdb: Vec<u8>,
    pub direction: DataDirection,
    pub transfer_len: usize,
    pub timeout: Duration,
    /// Copy of the data sent to the device
    pub written: Vec<u8>,
}

#[derive(Debug, Default)]
struct StubState {
    replies: VecDeque<StubReply>,
    calls: Vec<RecordedCommand>,
    closed: bool,
}

/// Shared view of a stub's queue and call history
#[derive(Debug, Clone, Default)]
pub struct StubLog {
    state: Arc<Mutex<StubState>>,
}

impl StubLog {
    pub fn push_reply(&self, reply: StubReply) {
        self.state.lock().replies.push_back(reply);
    }

    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// True once the transport has been dropped
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[derive(Debug, Default)]
pub struct StubTransport {
    log: StubLog,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I: IntoIterator<Item = StubReply>>(replies: I) -> Self {
        let stub = Self::new();
        for reply in replies {
            stub.log.push_reply(reply);
        }
        stub
    }

    pub fn log(&self) -> StubLog {
        self.log.clone()
    }
}

impl Transport for StubTransport {
    fn send(
        &mut self,
        cdb: &[u8],
        data: DataBuffer<'_>,
        timeout: Duration,
    ) -> Result<Completion, TransportError> {
        let mut state = self.log.state.lock();
        let reply = state.replies.pop_front().unwrap_or_default();

        let direction = data.direction();
        let transfer_len = data.len();
        let mut written = Vec::new();
        let mut transferred = 0;

        if reply.failure.is_none() {
            match data {
                DataBuffer::None => {}
                DataBuffer::ToDevice(buf) => {
                    written = buf.to_vec();
                    transferred = buf.len();
                }
                DataBuffer::FromDevice(buf) => {
                    transferred = reply.data.len().min(buf.len());
                    buf[..transferred].copy_from_slice(&reply.data[..transferred]);
                }
            }
        }

        state.calls.push(RecordedCommand {
            cdb: cdb.to_vec(),
            direction,
            transfer_len,
            timeout,
            written,
        });

        if let Some(error) = reply.failure {
            return Err(error);
        }

        Ok(Completion {
            status: reply.status,
            sense: reply.sense,
            host_status: 0,
            driver_status: 0,
            residual: reply
                .residual
                .unwrap_or(transfer_len - transferred)
                .min(transfer_len),
        })
    }
}

impl Drop for StubTransport {
    fn drop(&mut self) {
        self.log.state.lock().closed = true;
    }
}

/// Builder for fixed-format sense bytes, as a device would return them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSense {
    pub key: SenseKey,
    pub asc: u8,
    pub ascq: u8,
    pub information: Option<i32>,
    pub filemark: bool,
    pub end_of_medium: bool,
    pub incorrect_length: bool,
}

impl FixedSense {
    pub fn new(key: SenseKey, asc: u8, ascq: u8) -> Self {
        Self {
            key,
            asc,
            ascq,
            information: None,
            filemark: false,
            end_of_medium: false,
            incorrect_length: false,
        }
    }

    pub fn information(mut self, value: i32) -> Self {
        self.information = Some(value);
        self
    }

    pub fn filemark(mut self) -> Self {
        self.filemark = true;
        self
    }

    pub fn end_of_medium(mut self) -> Self {
        self.end_of_medium = true;
        self
    }

    pub fn incorrect_length(mut self) -> Self {
        self.incorrect_length = true;
        self
    }

    /// Serialize to 18 bytes of fixed format sense data
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; 18];

        data[0] = response_codes::FIXED_CURRENT;
        if let Some(information) = self.information {
            data[0] |= 0x80;
            data[3..7].copy_from_slice(&information.to_be_bytes());
        }

        data[2] = self.key.to_u8()
            | if self.filemark { 0x80 } else { 0x00 }
            | if self.end_of_medium { 0x40 } else { 0x00 }
            | if self.incorrect_length { 0x20 } else { 0x00 };

        // Remaining bytes after this field
        data[7] = 10;
        data[12] = self.asc;
        data[13] = self.ascq;

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_device_to_host_buffer_and_reports_residual() {
        let mut stub = StubTransport::with_replies([StubReply::good().with_data(vec![7; 4])]);
        let log = stub.log();
        let mut buf = [0u8; 10];

        let completion = stub
            .send(&[0x08, 0, 0, 0, 10, 0], DataBuffer::FromDevice(&mut buf), Duration::from_secs(1))
            .unwrap();

        assert_eq!(&buf[..4], &[7; 4]);
        assert_eq!(&buf[4..], &[0; 6]);
        assert_eq!(completion.residual, 6);
        assert_eq!(log.call_count(), 1);
        assert_eq!(log.calls()[0].direction, DataDirection::FromDevice);
    }

    #[test]
    fn failure_leaves_buffer_untouched() {
        let mut stub = StubTransport::with_replies([
            StubReply::failure(TransportError::Timeout).with_data(vec![1; 4])
        ]);
        let mut buf = [9u8; 4];

        let err = stub
            .send(&[0x08, 0, 0, 0, 4, 0], DataBuffer::FromDevice(&mut buf), Duration::from_secs(1))
            .unwrap_err();

        assert_eq!(err, TransportError::Timeout);
        assert_eq!(buf, [9; 4]);
    }

    #[test]
    fn drop_marks_log_closed() {
        let stub = StubTransport::new();
        let log = stub.log();
        assert!(!log.is_closed());
        drop(stub);
        assert!(log.is_closed());
    }

    #[test]
    fn fixed_sense_layout() {
        let bytes = FixedSense::new(SenseKey::NoSense, 0x00, 0x01)
            .information(80)
            .filemark()
            .to_bytes();

        assert_eq!(bytes.len(), 18);
        assert_eq!(bytes[0], 0xF0);
        assert_eq!(bytes[2], 0x80);
        assert_eq!(&bytes[3..7], &[0, 0, 0, 80]);
        assert_eq!(bytes[13], 0x01);
    }
}
