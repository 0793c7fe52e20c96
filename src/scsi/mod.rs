//! SCSI Tape Command Layer
//!
//! Command descriptors, the pass-through transports, sense and status
//! decoding, and the `Device` handle that ties them together.

pub mod commands;
pub mod constants;
pub mod ffi;
pub mod sense;
pub mod status;
pub mod transport;
pub mod types;
mod device;

pub use commands::Command;
pub use device::Device;
pub use sense::{Sense, SenseFormat, SenseKey};
pub use status::{decode, decode_completion, CommandDetail, DeviceStatus, Outcome, StreamDetail};
pub use transport::{Completion, DataBuffer, PlatformTransport, Transport};
pub use types::{
    BlockLimits, CommandKind, DataDirection, DensityDescriptor, ScsiStatus, SpaceType,
    TapePosition, TimeoutClass,
};
