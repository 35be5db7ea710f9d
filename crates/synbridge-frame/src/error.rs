/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes than a frame header.
    #[error("datagram truncated ({len} bytes, header needs {header})")]
    Truncated { len: usize, header: usize },

    /// The frame header contains an invalid magic number.
    #[error("invalid frame magic (expected 0x5359 \"SY\")")]
    InvalidMagic,

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The declared payload length disagrees with the bytes in the datagram.
    #[error("declared payload length {declared} but datagram carries {available}")]
    LengthMismatch { declared: usize, available: usize },

    /// An I/O error surfaced through a framed socket.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
