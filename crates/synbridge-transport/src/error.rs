use std::net::SocketAddr;

/// Errors that can occur in link transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The remote host/port pair did not resolve to a usable address.
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    /// Failed to bind the local socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to associate the socket with the remote endpoint.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// A received datagram did not fit in the receive buffer.
    #[error("datagram too large (at least {size} bytes, max {max})")]
    Oversized { size: usize, max: usize },

    /// The peer reported that an earlier datagram had no listener
    /// (ICMP port unreachable surfaced on the connected socket).
    #[error("peer {addr} unreachable")]
    PeerUnreachable { addr: SocketAddr },

    /// A zero receive timeout was requested.
    #[error("receive timeout must be greater than zero")]
    InvalidTimeout,

    /// An I/O error occurred on the socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether this error happened while opening the link.
    ///
    /// Only these errors prevent a bridge from starting; everything else is
    /// scoped to a single datagram.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            TransportError::Resolve { .. }
                | TransportError::Bind { .. }
                | TransportError::Connect { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
