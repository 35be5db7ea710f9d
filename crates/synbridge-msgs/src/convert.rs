//! Conversions between bus messages and wire payloads.
//!
//! Outbound conversions copy stamps unchanged. Inbound conversions take a
//! stamp mapping so the caller can move remote stamps onto the local
//! timeline.

use crate::bus;
use crate::time::Stamp;
use crate::wire;

impl From<Stamp> for wire::Time {
    fn from(stamp: Stamp) -> Self {
        // Struct literals can bypass normalization; renormalize before narrowing.
        let stamp = Stamp::from_parts(stamp.sec, i64::from(stamp.nanosec));
        wire::Time {
            sec: stamp.sec,
            nanosec: i32::try_from(stamp.nanosec).unwrap_or(i32::MAX),
        }
    }
}

impl From<wire::Time> for Stamp {
    fn from(time: wire::Time) -> Self {
        Stamp::from_parts(time.sec, i64::from(time.nanosec))
    }
}

impl From<&bus::Header> for wire::Header {
    fn from(header: &bus::Header) -> Self {
        wire::Header {
            frame_id: header.frame_id.clone(),
            stamp: header.stamp.map(wire::Time::from),
        }
    }
}

impl From<bus::Vector3> for wire::Vector3 {
    fn from(v: bus::Vector3) -> Self {
        wire::Vector3 {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<&bus::Joy> for wire::Joy {
    fn from(joy: &bus::Joy) -> Self {
        wire::Joy {
            axes: joy.axes.clone(),
            buttons: joy.buttons.clone(),
        }
    }
}

impl From<&bus::Actuators> for wire::Actuators {
    fn from(msg: &bus::Actuators) -> Self {
        wire::Actuators {
            header: Some(wire::Header::from(&msg.header)),
            position: msg.position.clone(),
            velocity: msg.velocity.clone(),
            normalized: msg.normalized.clone(),
        }
    }
}

impl From<&bus::Imu> for wire::Imu {
    fn from(msg: &bus::Imu) -> Self {
        wire::Imu {
            header: Some(wire::Header::from(&msg.header)),
            linear_acceleration: Some(msg.linear_acceleration.into()),
            angular_velocity: Some(msg.angular_velocity.into()),
        }
    }
}

impl wire::Header {
    /// Convert to a bus header, mapping the stamp if one is present.
    pub fn into_bus(self, map_stamp: impl Fn(Stamp) -> Stamp) -> bus::Header {
        bus::Header {
            frame_id: self.frame_id,
            stamp: self.stamp.map(|t| map_stamp(Stamp::from(t))),
        }
    }
}

impl wire::Actuators {
    pub fn into_bus(self, map_stamp: impl Fn(Stamp) -> Stamp) -> bus::Actuators {
        bus::Actuators {
            header: self
                .header
                .map(|h| h.into_bus(map_stamp))
                .unwrap_or_default(),
            position: self.position,
            velocity: self.velocity,
            normalized: self.normalized,
        }
    }
}

impl wire::Status {
    pub fn into_bus(self, map_stamp: impl Fn(Stamp) -> Stamp) -> bus::Status {
        bus::Status {
            header: self
                .header
                .map(|h| h.into_bus(map_stamp))
                .unwrap_or_default(),
            arming: self.arming,
            fuel: self.fuel,
            joy: self.joy,
            mode: self.mode,
            safety: self.safety,
            fuel_percentage: self.fuel_percentage,
            power: self.power,
            status_message: self.status_message,
            request_rejected: self.request_rejected,
            request_seq: self.request_seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;

    #[test]
    fn joy_payload_matches_prost_encoding() {
        let joy = bus::Joy {
            axes: vec![0.1, -0.2],
            buttons: vec![1, 0],
        };
        let payload = wire::Joy::from(&joy).encode_to_vec();
        let decoded = wire::Joy::decode(payload.as_slice()).unwrap();
        assert_eq!(decoded.axes, vec![0.1f32, -0.2f32]);
        assert_eq!(decoded.buttons, vec![1, 0]);
    }

    #[test]
    fn header_stamp_is_mapped_only_when_present() {
        let shift = |s: Stamp| Stamp::from_parts(s.sec + 10, i64::from(s.nanosec));

        let stamped = wire::Header {
            frame_id: "base_link".into(),
            stamp: Some(wire::Time { sec: 1, nanosec: 5 }),
        };
        let header = stamped.into_bus(shift);
        assert_eq!(header.frame_id, "base_link");
        assert_eq!(header.stamp, Some(Stamp { sec: 11, nanosec: 5 }));

        let bare = wire::Header {
            frame_id: "map".into(),
            stamp: None,
        };
        assert_eq!(bare.into_bus(shift).stamp, None);
    }

    #[test]
    fn wire_time_with_overflowing_nanos_is_normalized() {
        let stamp = Stamp::from(wire::Time {
            sec: 7,
            nanosec: 1_500_000_000,
        });
        assert_eq!(
            stamp,
            Stamp {
                sec: 8,
                nanosec: 500_000_000
            }
        );
    }

    #[test]
    fn outbound_stamp_never_overflows_wire_nanos() {
        let message: bus::BusMessage = serde_json::from_str(
            r#"{"kind":"actuators","header":{"stamp":{"sec":1,"nanosec":3000000000}}}"#,
        )
        .unwrap();
        let bus::BusMessage::Actuators(actuators) = message else {
            panic!("expected actuators");
        };
        let payload = wire::Actuators::from(&actuators).encode_to_vec();
        let decoded = wire::Actuators::decode(payload.as_slice()).unwrap();
        assert_eq!(
            decoded.header.and_then(|h| h.stamp),
            Some(wire::Time { sec: 4, nanosec: 0 })
        );

        let literal = Stamp {
            sec: 0,
            nanosec: 2_250_000_000,
        };
        assert_eq!(
            wire::Time::from(literal),
            wire::Time {
                sec: 2,
                nanosec: 250_000_000
            }
        );
    }

    #[test]
    fn status_keeps_all_fields() {
        let wire_status = wire::Status {
            header: None,
            arming: 1,
            fuel: 2,
            joy: 3,
            mode: 4,
            safety: 5,
            fuel_percentage: 87,
            power: 12.5,
            status_message: "armed".into(),
            request_rejected: true,
            request_seq: 42,
        };
        let status = wire_status.into_bus(|s| s);
        assert_eq!(status.header, bus::Header::default());
        assert_eq!(status.fuel_percentage, 87);
        assert_eq!(status.status_message, "armed");
        assert!(status.request_rejected);
        assert_eq!(status.request_seq, 42);
    }
}
