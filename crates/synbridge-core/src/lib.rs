//! Bridge core: relays between a publish/subscribe bus and one UDP peer.
//!
//! Bus messages on outbound topics are encoded, framed and sent. Inbound
//! datagrams are unframed, decoded, moved onto the local clock and
//! published. The pieces:
//!
//! - [`clock`]: remote-uptime to local-wall-clock offset tracking
//! - [`router`]: the static tag/topic table and per-kind codecs
//! - [`link`]: one UDP endpoint plus router, clock and counters
//! - [`bridge`]: receive-loop lifecycle and bus subscriptions

pub mod bridge;
pub mod bus;
pub mod clock;
pub mod config;
pub mod error;
pub mod link;
pub mod router;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{Bridge, BridgeState, ShutdownSignal};
pub use bus::{Bus, Callback, LocalBus};
pub use clock::{ClockSync, SystemWallClock, WallClock};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result, RouterError};
pub use link::{Dispatch, Link, Polled};
pub use router::{Direction, Publication, RouteEntry, Router, CLOCK_OFFSET_TOPIC, ROUTES};
pub use stats::{LinkStats, StatsSnapshot};
