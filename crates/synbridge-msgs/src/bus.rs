//! Structured messages as they appear on the bus.

use serde::{Deserialize, Serialize};

use crate::time::Stamp;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub frame_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp: Option<Stamp>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Joystick axes and buttons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Joy {
    pub axes: Vec<f32>,
    pub buttons: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actuators {
    pub header: Header,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub normalized: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Imu {
    pub header: Header,
    pub linear_acceleration: Vector3,
    pub angular_velocity: Vector3,
}

/// Vehicle status as reported by the remote peer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub header: Header,
    pub arming: i32,
    pub fuel: i32,
    pub joy: i32,
    pub mode: i32,
    pub safety: i32,
    pub fuel_percentage: i32,
    pub power: f64,
    pub status_message: String,
    pub request_rejected: bool,
    pub request_seq: i32,
}

/// Any message the bridge can take from or hand to the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusMessage {
    Joy(Joy),
    Actuators(Actuators),
    Imu(Imu),
    Status(Status),
    Time(Stamp),
}

impl BusMessage {
    /// Short kind name, matching the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            BusMessage::Joy(_) => "joy",
            BusMessage::Actuators(_) => "actuators",
            BusMessage::Imu(_) => "imu",
            BusMessage::Status(_) => "status",
            BusMessage::Time(_) => "time",
        }
    }

    /// Header of the message, if its kind carries one.
    pub fn header(&self) -> Option<&Header> {
        match self {
            BusMessage::Actuators(m) => Some(&m.header),
            BusMessage::Imu(m) => Some(&m.header),
            BusMessage::Status(m) => Some(&m.header),
            BusMessage::Joy(_) | BusMessage::Time(_) => None,
        }
    }
}
