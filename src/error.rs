use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScsiTapeError>;

#[derive(Error, Debug)]
pub enum ScsiTapeError {
    #[error("Cannot open device {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Device handle is closed")]
    ClosedHandle,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("System error: {0}")]
    System(String),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl ScsiTapeError {
    pub fn open<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        Self::Open {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument<T: Into<String>>(msg: T) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn parse<T: Into<String>>(msg: T) -> Self {
        Self::Parse(msg.into())
    }

    pub fn system<T: Into<String>>(msg: T) -> Self {
        Self::System(msg.into())
    }
}

/// Failure of the host pass-through facility itself, as opposed to a
/// condition reported by the device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("command timed out")]
    Timeout,

    #[error("OS error code {code}")]
    Os { code: i32 },

    #[error("host adapter status 0x{code:04X}")]
    Host { code: u16 },

    #[error("{0}")]
    Unsupported(String),
}

impl TransportError {
    /// Raw code reported by the host, if the failure carries one.
    pub fn raw_code(&self) -> Option<i64> {
        match self {
            Self::Os { code } => Some(i64::from(*code)),
            Self::Host { code } => Some(i64::from(*code)),
            Self::Timeout | Self::Unsupported(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}
