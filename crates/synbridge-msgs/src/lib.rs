//! Message types on both sides of the bridge.
//!
//! - [`bus`]: structured messages as bus subscribers see them
//! - [`wire`]: protobuf payload schemas shared with the remote peer
//! - [`time`]: [`Stamp`] and [`ClockOffset`] with carry-normalized arithmetic
//!
//! Conversions between the two sides live in [`convert`].

pub mod bus;
pub mod convert;
pub mod time;
pub mod wire;

pub use bus::{Actuators, BusMessage, Header, Imu, Joy, Status, Vector3};
pub use time::{ClockOffset, Stamp, NANOS_PER_SEC};
