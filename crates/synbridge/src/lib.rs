//! Relay between a UDP datagram peer and a publish/subscribe bus.
//!
//! synbridge multiplexes several message kinds over one UDP association,
//! keeps remote timestamps on the local wall-clock timeline, and hands
//! decoded messages to an in-process bus.
//!
//! # Crate Structure
//!
//! - [`transport`]: connected UDP endpoint with bounded receives
//! - [`frame`]: datagram framing (magic, tag, length)
//! - [`msgs`]: bus-side message types and their protobuf payloads
//! - [`bridge`]: routing, clock synchronization and the receive loop

/// Re-export transport types.
pub mod transport {
    pub use synbridge_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use synbridge_frame::*;
}

/// Re-export message types.
pub mod msgs {
    pub use synbridge_msgs::*;
}

/// Re-export bridge core types.
pub mod bridge {
    pub use synbridge_core::*;
}

pub use synbridge_core::{Bridge, BridgeConfig, BridgeError, Bus, LocalBus};
pub use synbridge_msgs::BusMessage;
