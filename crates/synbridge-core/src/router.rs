//! Static routing between bus topics and wire tags.
//!
//! [`ROUTES`] is the bridge's whole schema. Adding a message kind means
//! adding a row here plus its encode or decode function.

use std::collections::HashMap;

use prost::Message;
use synbridge_frame::{ACTUATORS, DEFAULT_MAX_PAYLOAD, IMU, JOY, STATUS, UPTIME};
use synbridge_msgs::{wire, BusMessage, Stamp};

use crate::clock::ClockSync;
use crate::error::{BridgeError, Result, RouterError};

/// Topic on which each uptime report's freshly computed offset is published.
pub const CLOCK_OFFSET_TOPIC: &str = "out/clock_offset";

/// Serialize a bus message; `None` if the message is of another kind.
pub type EncodeFn = fn(&BusMessage) -> Option<Vec<u8>>;

/// Decode a payload into publications; the first argument is the route topic.
pub type DecodeFn =
    fn(&'static str, &[u8], &ClockSync) -> std::result::Result<Vec<Publication>, prost::DecodeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Wire to bus.
    Inbound,
    /// Bus to wire.
    Outbound,
}

#[derive(Clone, Copy)]
pub enum Handler {
    Outbound(EncodeFn),
    Inbound(DecodeFn),
}

/// One row of the route table.
#[derive(Clone, Copy)]
pub struct RouteEntry {
    pub topic: &'static str,
    pub tag: u16,
    pub kind: &'static str,
    pub handler: Handler,
}

impl RouteEntry {
    pub const fn outbound(topic: &'static str, tag: u16, kind: &'static str, encode: EncodeFn) -> Self {
        Self {
            topic,
            tag,
            kind,
            handler: Handler::Outbound(encode),
        }
    }

    pub const fn inbound(topic: &'static str, tag: u16, kind: &'static str, decode: DecodeFn) -> Self {
        Self {
            topic,
            tag,
            kind,
            handler: Handler::Inbound(decode),
        }
    }

    pub fn direction(&self) -> Direction {
        match self.handler {
            Handler::Outbound(_) => Direction::Outbound,
            Handler::Inbound(_) => Direction::Inbound,
        }
    }
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("topic", &self.topic)
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .field("direction", &self.direction())
            .finish()
    }
}

/// A message ready to be handed to the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    pub topic: &'static str,
    pub message: BusMessage,
}

impl Publication {
    pub fn new(topic: &'static str, message: BusMessage) -> Self {
        Self { topic, message }
    }
}

pub static ROUTES: &[RouteEntry] = &[
    RouteEntry::outbound("in/actuators", ACTUATORS, "actuators", encode_actuators),
    RouteEntry::outbound("in/joy", JOY, "joy", encode_joy),
    RouteEntry::outbound("in/imu", IMU, "imu", encode_imu),
    RouteEntry::inbound("out/actuators", ACTUATORS, "actuators", decode_actuators),
    RouteEntry::inbound("out/status", STATUS, "status", decode_status),
    RouteEntry::inbound("out/uptime", UPTIME, "time", decode_uptime),
];

fn encode_actuators(msg: &BusMessage) -> Option<Vec<u8>> {
    match msg {
        BusMessage::Actuators(m) => Some(wire::Actuators::from(m).encode_to_vec()),
        _ => None,
    }
}

fn encode_joy(msg: &BusMessage) -> Option<Vec<u8>> {
    match msg {
        BusMessage::Joy(m) => Some(wire::Joy::from(m).encode_to_vec()),
        _ => None,
    }
}

fn encode_imu(msg: &BusMessage) -> Option<Vec<u8>> {
    match msg {
        BusMessage::Imu(m) => Some(wire::Imu::from(m).encode_to_vec()),
        _ => None,
    }
}

fn decode_actuators(
    topic: &'static str,
    payload: &[u8],
    clock: &ClockSync,
) -> std::result::Result<Vec<Publication>, prost::DecodeError> {
    let msg = wire::Actuators::decode(payload)?.into_bus(|s| clock.translate(s));
    Ok(vec![Publication::new(topic, BusMessage::Actuators(msg))])
}

fn decode_status(
    topic: &'static str,
    payload: &[u8],
    clock: &ClockSync,
) -> std::result::Result<Vec<Publication>, prost::DecodeError> {
    let msg = wire::Status::decode(payload)?.into_bus(|s| clock.translate(s));
    Ok(vec![Publication::new(topic, BusMessage::Status(msg))])
}

fn decode_uptime(
    topic: &'static str,
    payload: &[u8],
    clock: &ClockSync,
) -> std::result::Result<Vec<Publication>, prost::DecodeError> {
    let remote = Stamp::from(wire::Time::decode(payload)?);
    let (uptime, offset) = clock.on_uptime_report(remote);
    Ok(vec![
        Publication::new(topic, BusMessage::Time(uptime)),
        Publication::new(CLOCK_OFFSET_TOPIC, BusMessage::Time(offset.as_stamp())),
    ])
}

/// Lookup tables built once from a route list.
pub struct Router {
    routes: Vec<RouteEntry>,
    outbound: HashMap<&'static str, usize>,
    inbound: HashMap<u16, usize>,
    max_payload: usize,
}

impl Router {
    /// Build lookup tables, rejecting ambiguous routes.
    pub fn new(routes: &[RouteEntry]) -> std::result::Result<Self, RouterError> {
        let mut outbound = HashMap::new();
        let mut inbound = HashMap::new();
        for (idx, route) in routes.iter().enumerate() {
            match route.direction() {
                Direction::Outbound => {
                    if outbound.insert(route.topic, idx).is_some() {
                        return Err(RouterError::DuplicateTopic(route.topic));
                    }
                }
                Direction::Inbound => {
                    if inbound.insert(route.tag, idx).is_some() {
                        return Err(RouterError::DuplicateTag(route.tag));
                    }
                }
            }
        }
        Ok(Self {
            routes: routes.to_vec(),
            outbound,
            inbound,
            max_payload: DEFAULT_MAX_PAYLOAD,
        })
    }

    /// Cap encoded payloads at `max_payload` bytes.
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }

    /// All routes, in table order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Outbound routes, in table order.
    pub fn outbound_routes(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes
            .iter()
            .filter(|r| r.direction() == Direction::Outbound)
    }

    /// Encode a bus message published on `topic` into `(tag, payload)`.
    pub fn encode(&self, topic: &str, message: &BusMessage) -> Result<(u16, Vec<u8>)> {
        let route = self
            .outbound
            .get(topic)
            .map(|&idx| &self.routes[idx])
            .ok_or_else(|| BridgeError::UnknownTopic(topic.to_string()))?;
        let Handler::Outbound(encode) = route.handler else {
            return Err(BridgeError::UnknownTopic(topic.to_string()));
        };

        let payload = encode(message).ok_or_else(|| BridgeError::Encode {
            topic: topic.to_string(),
            reason: format!("expected {} message, got {}", route.kind, message.kind()),
        })?;
        if payload.len() > self.max_payload {
            return Err(BridgeError::Encode {
                topic: topic.to_string(),
                reason: format!(
                    "encoded size {} exceeds max payload {}",
                    payload.len(),
                    self.max_payload
                ),
            });
        }
        Ok((route.tag, payload))
    }

    /// Decode an inbound payload. `Ok(None)` means the tag has no route.
    pub fn decode(
        &self,
        tag: u16,
        payload: &[u8],
        clock: &ClockSync,
    ) -> Result<Option<Vec<Publication>>> {
        let Some(route) = self.inbound.get(&tag).map(|&idx| &self.routes[idx]) else {
            return Ok(None);
        };
        let Handler::Inbound(decode) = route.handler else {
            return Ok(None);
        };
        decode(route.topic, payload, clock)
            .map(Some)
            .map_err(|source| BridgeError::Decode {
                tag,
                kind: route.kind,
                source,
            })
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("max_payload", &self.max_payload)
            .finish()
    }
}
