//! Wire type tags.
//!
//! Both peers share this enumeration. A tag names the payload schema, not a
//! direction: `ACTUATORS` frames travel both ways.

/// Actuator commands and feedback.
pub const ACTUATORS: u16 = 1;

/// Joystick axes and buttons.
pub const JOY: u16 = 2;

/// Inertial measurement sample.
pub const IMU: u16 = 3;

/// Vehicle status report.
pub const STATUS: u16 = 4;

/// Remote monotonic uptime report.
pub const UPTIME: u16 = 5;

/// Returns a human-readable name for a tag.
pub fn tag_name(tag: u16) -> &'static str {
    match tag {
        ACTUATORS => "ACTUATORS",
        JOY => "JOY",
        IMU => "IMU",
        STATUS => "STATUS",
        UPTIME => "UPTIME",
        _ => "UNKNOWN",
    }
}
