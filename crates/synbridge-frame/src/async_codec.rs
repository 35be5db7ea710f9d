use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::codec::{decode_datagram, encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

/// Datagram codec for `tokio_util::udp::UdpFramed`.
///
/// `UdpFramed` hands the decoder one whole datagram at a time, so a
/// non-empty buffer is always decoded and consumed in full.
#[derive(Debug, Clone, Default)]
pub struct SynapseCodec {
    config: FrameConfig,
}

impl SynapseCodec {
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }
}

impl Decoder for SynapseCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if src.is_empty() {
            return Ok(None);
        }
        let datagram = src.split();
        let frame = decode_datagram(&datagram, self.config.max_payload_size)?;
        trace!(tag = frame.tag, bytes = frame.payload.len(), "decoded datagram");
        Ok(Some(frame))
    }
}

impl Encoder<Frame> for SynapseCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        if item.payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: item.payload.len(),
                max: self.config.max_payload_size,
            });
        }
        encode_frame(item.tag, item.payload.as_ref(), dst)
    }
}
