//! Protobuf payload schemas exchanged with the remote peer.
//!
//! Field numbers are part of the contract with the remote firmware.

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Time {
    #[prost(int64, tag = "1")]
    pub sec: i64,
    #[prost(int32, tag = "2")]
    pub nanosec: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Header {
    #[prost(string, tag = "1")]
    pub frame_id: String,
    #[prost(message, optional, tag = "2")]
    pub stamp: Option<Time>,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Vector3 {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub z: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Joy {
    #[prost(float, repeated, tag = "1")]
    pub axes: Vec<f32>,
    #[prost(int32, repeated, tag = "2")]
    pub buttons: Vec<i32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Actuators {
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    #[prost(double, repeated, tag = "2")]
    pub position: Vec<f64>,
    #[prost(double, repeated, tag = "3")]
    pub velocity: Vec<f64>,
    #[prost(double, repeated, tag = "4")]
    pub normalized: Vec<f64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Imu {
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    #[prost(message, optional, tag = "2")]
    pub linear_acceleration: Option<Vector3>,
    #[prost(message, optional, tag = "3")]
    pub angular_velocity: Option<Vector3>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Status {
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    #[prost(int32, tag = "2")]
    pub arming: i32,
    #[prost(int32, tag = "3")]
    pub fuel: i32,
    #[prost(int32, tag = "4")]
    pub joy: i32,
    #[prost(int32, tag = "5")]
    pub mode: i32,
    #[prost(int32, tag = "6")]
    pub safety: i32,
    #[prost(int32, tag = "7")]
    pub fuel_percentage: i32,
    #[prost(double, tag = "8")]
    pub power: f64,
    #[prost(string, tag = "9")]
    pub status_message: String,
    #[prost(bool, tag = "10")]
    pub request_rejected: bool,
    #[prost(int32, tag = "11")]
    pub request_seq: i32,
}
