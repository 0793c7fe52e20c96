//! Device Status Decoding
//!
//! Turns the raw completion of a command into an immutable `DeviceStatus`.
//! Decoding is total: every byte sequence produces a status, and responses
//! that cannot be read are flagged rather than rejected.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::sense::Sense;
use super::transport::Completion;
use super::types::{CommandKind, DriverStatus, DriverSuggest, HostStatus, ScsiStatus};

/// Overall category of a command's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// GOOD status
    Success,
    /// CHECK CONDITION; consult the sense data
    DeviceError,
    /// Any other status byte
    TransportAnomaly,
    /// No status byte could be read
    Malformed,
}

/// Per-command fields extracted from sense data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandDetail {
    None,
    Read(StreamDetail),
    Write(StreamDetail),
    Space(StreamDetail),
}

/// Residue and stream flags reported by sequential-access commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamDetail {
    /// Requested length (or count) minus the actual one, when reported
    pub information: Option<i64>,
    pub filemark: bool,
    pub end_of_medium: bool,
    pub incorrect_length: bool,
}

impl StreamDetail {
    fn from_sense(sense: Option<&Sense>) -> Self {
        match sense {
            Some(sense) if !sense.malformed => Self {
                // The information field is undefined while VALID is clear
                information: sense.valid.then(|| sense.signed_information()),
                filemark: sense.filemark,
                end_of_medium: sense.end_of_medium,
                incorrect_length: sense.incorrect_length,
            },
            _ => Self::default(),
        }
    }
}

impl CommandDetail {
    fn for_kind(kind: CommandKind, sense: Option<&Sense>) -> Self {
        match kind {
            CommandKind::Read6
            | CommandKind::Read16
            | CommandKind::ReadReverse6
            | CommandKind::ReadReverse16
            | CommandKind::RecoverBufferedData
            | CommandKind::Verify6
            | CommandKind::Verify16 => CommandDetail::Read(StreamDetail::from_sense(sense)),
            CommandKind::Write6
            | CommandKind::Write16
            | CommandKind::WriteFilemarks6
            | CommandKind::WriteFilemarks16 => {
                CommandDetail::Write(StreamDetail::from_sense(sense))
            }
            CommandKind::Space6 | CommandKind::Space16 => {
                CommandDetail::Space(StreamDetail::from_sense(sense))
            }
            _ => CommandDetail::None,
        }
    }

    pub fn information(&self) -> Option<i64> {
        match self {
            CommandDetail::Read(detail)
            | CommandDetail::Write(detail)
            | CommandDetail::Space(detail) => detail.information,
            CommandDetail::None => None,
        }
    }
}

/// Outcome of one issued command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    kind: CommandKind,
    outcome: Outcome,
    status: Option<ScsiStatus>,
    host_status: HostStatus,
    driver_status: DriverStatus,
    driver_suggest: DriverSuggest,
    sense: Option<Sense>,
    residual: usize,
    detail: CommandDetail,
}

/// Decode a status byte followed by sense data
pub fn decode(raw: &[u8], kind: CommandKind) -> DeviceStatus {
    match raw.split_first() {
        Some((&status, sense)) => build(kind, Some(status), sense, 0, 0, 0),
        None => build(kind, None, &[], 0, 0, 0),
    }
}

/// Decode a transport completion, keeping host and driver status
pub fn decode_completion(completion: &Completion, kind: CommandKind) -> DeviceStatus {
    build(
        kind,
        Some(completion.status),
        &completion.sense,
        completion.host_status,
        completion.driver_status,
        completion.residual,
    )
}

fn build(
    kind: CommandKind,
    status_byte: Option<u8>,
    sense_bytes: &[u8],
    host_status: u16,
    driver_status: u16,
    residual: usize,
) -> DeviceStatus {
    let status = status_byte.map(ScsiStatus::from_u8);

    let (outcome, sense) = match status {
        None => (Outcome::Malformed, None),
        Some(ScsiStatus::Good) => (Outcome::Success, None),
        Some(ScsiStatus::CheckCondition) => {
            (Outcome::DeviceError, Some(Sense::from_buf(sense_bytes)))
        }
        Some(_) => (Outcome::TransportAnomaly, None),
    };

    debug!(
        "{} completed: outcome={:?}, status={:?}, residual={}",
        kind, outcome, status, residual
    );

    let detail = CommandDetail::for_kind(kind, sense.as_ref());

    DeviceStatus {
        kind,
        outcome,
        status,
        host_status: HostStatus::from_u16(host_status),
        driver_status: DriverStatus::from_u16(driver_status),
        driver_suggest: DriverSuggest::from_u16(driver_status),
        sense,
        residual,
        detail,
    }
}

impl DeviceStatus {
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// Decoded status byte, absent for malformed responses
    pub fn status(&self) -> Option<ScsiStatus> {
        self.status
    }

    pub fn raw_status(&self) -> Option<u8> {
        self.status.map(ScsiStatus::to_u8)
    }

    pub fn host_status(&self) -> HostStatus {
        self.host_status
    }

    pub fn driver_status(&self) -> DriverStatus {
        self.driver_status
    }

    pub fn driver_suggest(&self) -> DriverSuggest {
        self.driver_suggest
    }

    pub fn sense(&self) -> Option<&Sense> {
        self.sense.as_ref()
    }

    /// Requested data bytes the transport did not move
    pub fn residual(&self) -> usize {
        self.residual
    }

    pub fn detail(&self) -> &CommandDetail {
        &self.detail
    }

    /// Command-specific information field, for commands that define one
    pub fn information(&self) -> Option<i64> {
        self.detail.information()
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            Some(status) => format!("{:?} (0x{:02X})", status, status.to_u8()),
            None => "unavailable".to_string(),
        };

        write!(
            f,
            concat!(
                "Command:       {}\n",
                "Outcome:       {:?}\n",
                "Status:        {}\n",
                "HostStatus:    {:?}\n",
                "DriverStatus:  {:?}\n",
                "DriverSuggest: {:?}\n",
                "Residual:      {}",
            ),
            self.kind,
            self.outcome,
            status,
            self.host_status,
            self.driver_status,
            self.driver_suggest,
            self.residual,
        )?;

        if let Some(sense) = &self.sense {
            write!(f, "\n== Sense ==\n{}", sense)?;
        }

        if let Some(information) = self.information() {
            write!(f, "\n== {} Specific ==\n{}", self.kind, self.detail_text(information))?;
        }

        Ok(())
    }
}

impl DeviceStatus {
    fn detail_text(&self, information: i64) -> String {
        match self.detail {
            CommandDetail::Read(_)
                if matches!(self.kind, CommandKind::Verify6 | CommandKind::Verify16) =>
            {
                format!(
                    "Requested verification length minus the amount verified is {}",
                    information
                )
            }
            CommandDetail::Read(_) => format!(
                "Requested transfer length minus the actual block length is {}",
                information
            ),
            CommandDetail::Write(_)
                if matches!(
                    self.kind,
                    CommandKind::WriteFilemarks6 | CommandKind::WriteFilemarks16
                ) =>
            {
                format!(
                    "Requested filemark count minus the filemarks written is {}",
                    information
                )
            }
            CommandDetail::Write(_) => format!(
                "Requested transfer length minus the amount written is {}",
                information
            ),
            CommandDetail::Space(_) => format!(
                "Requested count minus the actual count spaced is {}",
                information
            ),
            CommandDetail::None => String::new(),
        }
    }
}
