//! Tag-multiplexed framing for one-frame-per-datagram links.
//!
//! Every datagram carries exactly one frame:
//! - A 2-byte magic number ("SY") marking the start of a frame
//! - A 2-byte little-endian type tag selecting the message kind
//! - A 4-byte little-endian payload length
//!
//! The payload itself is opaque at this layer.

pub mod codec;
pub mod error;
pub mod tags;

#[cfg(feature = "async")]
pub mod async_codec;

pub use codec::{
    decode_datagram, encode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE, MAGIC,
};
pub use error::{FrameError, Result};
pub use tags::{tag_name, ACTUATORS, IMU, JOY, STATUS, UPTIME};

#[cfg(feature = "async")]
pub use async_codec::SynapseCodec;
