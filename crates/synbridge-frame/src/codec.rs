use bytes::{BufMut, Bytes, BytesMut};
use synbridge_transport::MAX_DATAGRAM_SIZE;

use crate::error::{FrameError, Result};

/// Frame header: magic (2) + tag (2) + length (4) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// Magic bytes: "SY" (0x53 0x59).
pub const MAGIC: [u8; 2] = [0x53, 0x59];

/// Largest payload that still fits one UDP datagram with its header.
pub const DEFAULT_MAX_PAYLOAD: usize = MAX_DATAGRAM_SIZE - HEADER_SIZE;

/// A framed message with tag routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Which message kind the payload encodes.
    pub tag: u16,
    /// The serialized payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(tag: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode into a freshly allocated datagram.
    pub fn to_datagram(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.tag, self.payload.as_ref(), &mut buf)?;
        Ok(buf.freeze())
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬───────────┬────────────┬─────────────────┐
/// │ Magic (2B)   │ Tag       │ Length     │ Payload         │
/// │ 0x53 0x59    │ (2B LE)   │ (4B LE)    │ (Length bytes)  │
/// │ "SY"         │           │            │                 │
/// └──────────────┴───────────┴────────────┴─────────────────┘
/// ```
pub fn encode_frame(tag: u16, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > DEFAULT_MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: DEFAULT_MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u16_le(tag);
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Decode one self-contained datagram.
///
/// The datagram must hold exactly one frame: a short header, a declared
/// length that disagrees with the remaining bytes, or a payload above
/// `max_payload` are all rejected.
pub fn decode_datagram(src: &[u8], max_payload: usize) -> Result<Frame> {
    if src.len() < HEADER_SIZE {
        return Err(FrameError::Truncated {
            len: src.len(),
            header: HEADER_SIZE,
        });
    }

    if src[0..2] != MAGIC {
        return Err(FrameError::InvalidMagic);
    }

    let tag = u16::from_le_bytes([src[2], src[3]]);
    let payload_len = u32::from_le_bytes([src[4], src[5], src[6], src[7]]) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let available = src.len() - HEADER_SIZE;
    if payload_len != available {
        return Err(FrameError::LengthMismatch {
            declared: payload_len,
            available,
        });
    }

    Ok(Frame {
        tag,
        payload: Bytes::copy_from_slice(&src[HEADER_SIZE..]),
    })
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: [`DEFAULT_MAX_PAYLOAD`].
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
