use synbridge_frame::FrameError;
use synbridge_transport::TransportError;

use crate::bridge::BridgeState;

/// Errors that can occur in bridge operations.
///
/// Only [`BridgeError::is_fatal`] errors stop a bridge from running; every
/// other variant describes one dropped datagram or message.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The link could not be opened.
    #[error("link setup failed: {0}")]
    Connect(#[source] TransportError),

    /// The route table is inconsistent.
    #[error("invalid route table: {0}")]
    Router(#[from] RouterError),

    /// The receive thread could not be spawned.
    #[error("failed to spawn receive thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// An inbound datagram is not a well-formed frame.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] FrameError),

    /// A bus message could not be serialized for its route.
    #[error("cannot encode message for {topic}: {reason}")]
    Encode { topic: String, reason: String },

    /// A payload is not a valid encoding of its tag's message kind.
    #[error("cannot decode {kind} payload (tag {tag}): {source}")]
    Decode {
        tag: u16,
        kind: &'static str,
        #[source]
        source: prost::DecodeError,
    },

    /// The topic has no outbound route.
    #[error("no outbound route for topic {0}")]
    UnknownTopic(String),

    /// Sending a datagram failed.
    #[error("send failed: {0}")]
    TransportSend(#[source] TransportError),

    /// Receiving a datagram failed.
    #[error("receive failed: {0}")]
    TransportRecv(#[source] TransportError),

    /// The operation does not apply in the bridge's current state.
    #[error("bridge is {0:?}")]
    InvalidState(BridgeState),

    /// The receive thread panicked before it could be joined.
    #[error("receive thread panicked")]
    ReceiverPanicked,
}

impl BridgeError {
    /// Whether the bridge cannot start or keep running after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::Connect(_) | BridgeError::Router(_) | BridgeError::Spawn(_)
        )
    }
}

/// Errors in route table construction.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Two outbound routes claim the same bus topic.
    #[error("duplicate outbound topic {0}")]
    DuplicateTopic(&'static str),

    /// Two inbound routes claim the same wire tag.
    #[error("duplicate inbound tag {0}")]
    DuplicateTag(u16),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
