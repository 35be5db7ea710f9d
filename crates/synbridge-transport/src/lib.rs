//! Datagram transport to a single remote peer.
//!
//! This is the lowest layer of synbridge. A [`UdpLink`] owns one bound UDP
//! socket that is connected to exactly one configured remote endpoint and
//! exposes fire-and-forget sends plus a bounded, timeout-driven receive.
//!
//! The `async` feature adds [`AsyncUdpLink`], the same contract on top of
//! `tokio::net::UdpSocket`.

pub mod error;
pub mod udp;

#[cfg(feature = "async")]
pub mod async_udp;

pub use error::{Result, TransportError};
pub use udp::{Received, UdpLink, MAX_DATAGRAM_SIZE};

#[cfg(feature = "async")]
pub use async_udp::AsyncUdpLink;
