use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const NANOS_PER_SEC: u32 = 1_000_000_000;

const NANOS_PER_SEC_I64: i64 = NANOS_PER_SEC as i64;

/// A point in time on either the remote or the local timeline.
///
/// Always normalized: `nanosec < 1e9`, sign carried by `sec`. Deserializing
/// folds any out-of-range `nanosec` into `sec`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "RawParts")]
pub struct Stamp {
    pub sec: i64,
    pub nanosec: u32,
}

/// `local_time - remote_uptime`, normalized like [`Stamp`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "RawParts")]
pub struct ClockOffset {
    pub sec: i64,
    pub nanosec: u32,
}

/// Unchecked `{sec, nanosec}` as it arrives from JSON.
#[derive(Deserialize)]
struct RawParts {
    #[serde(default)]
    sec: i64,
    #[serde(default)]
    nanosec: i64,
}

impl From<RawParts> for Stamp {
    fn from(raw: RawParts) -> Self {
        Stamp::from_parts(raw.sec, raw.nanosec)
    }
}

impl From<RawParts> for ClockOffset {
    fn from(raw: RawParts) -> Self {
        ClockOffset::from_parts(raw.sec, raw.nanosec)
    }
}

/// Fold `nanos` into `sec` so the remainder lands in `[0, 1e9)`.
fn normalize(sec: i64, nanos: i64) -> (i64, u32) {
    let carry = nanos.div_euclid(NANOS_PER_SEC_I64);
    let rem = nanos.rem_euclid(NANOS_PER_SEC_I64);
    (sec.saturating_add(carry), rem as u32)
}

impl Stamp {
    pub const ZERO: Stamp = Stamp { sec: 0, nanosec: 0 };

    /// Build a stamp from possibly out-of-range parts.
    pub fn from_parts(sec: i64, nanos: i64) -> Self {
        let (sec, nanosec) = normalize(sec, nanos);
        Self { sec, nanosec }
    }

    /// Stamp for a duration measured from the Unix epoch.
    pub fn from_unix_duration(since_epoch: Duration) -> Self {
        Self {
            sec: i64::try_from(since_epoch.as_secs()).unwrap_or(i64::MAX),
            nanosec: since_epoch.subsec_nanos(),
        }
    }

    /// Move this stamp onto another timeline.
    pub fn offset_by(self, offset: ClockOffset) -> Stamp {
        Stamp::from_parts(
            self.sec.saturating_add(offset.sec),
            i64::from(self.nanosec) + i64::from(offset.nanosec),
        )
    }

    /// The offset that maps `earlier` onto `self`.
    pub fn offset_from(self, earlier: Stamp) -> ClockOffset {
        let (sec, nanosec) = normalize(
            self.sec.saturating_sub(earlier.sec),
            i64::from(self.nanosec) - i64::from(earlier.nanosec),
        );
        ClockOffset { sec, nanosec }
    }
}

impl ClockOffset {
    pub const ZERO: ClockOffset = ClockOffset { sec: 0, nanosec: 0 };

    pub fn from_parts(sec: i64, nanos: i64) -> Self {
        let (sec, nanosec) = normalize(sec, nanos);
        Self { sec, nanosec }
    }

    /// The offset expressed as a stamp, for publishing on a time topic.
    pub fn as_stamp(&self) -> Stamp {
        Stamp {
            sec: self.sec,
            nanosec: self.nanosec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(sec: i64, nanosec: u32) -> Stamp {
        Stamp { sec, nanosec }
    }

    #[test]
    fn offset_then_translate_matches_local_time() {
        let remote = stamp(100, 0);
        let local = stamp(1000, 0);
        let offset = local.offset_from(remote);
        assert_eq!(offset, ClockOffset { sec: 900, nanosec: 0 });

        assert_eq!(stamp(105, 500_000_000).offset_by(offset), stamp(1005, 500_000_000));
    }

    #[test]
    fn offset_by_carries_nanoseconds() {
        let offset = ClockOffset {
            sec: 1,
            nanosec: 900_000_000,
        };
        assert_eq!(stamp(2, 200_000_000).offset_by(offset), stamp(4, 100_000_000));
    }

    #[test]
    fn offset_from_borrows_nanoseconds() {
        let offset = stamp(10, 100_000_000).offset_from(stamp(3, 600_000_000));
        assert_eq!(
            offset,
            ClockOffset {
                sec: 6,
                nanosec: 500_000_000
            }
        );
    }

    #[test]
    fn negative_offset_keeps_nanos_positive() {
        let offset = stamp(5, 0).offset_from(stamp(5, 250_000_000));
        assert_eq!(
            offset,
            ClockOffset {
                sec: -1,
                nanosec: 750_000_000
            }
        );
        assert_eq!(stamp(5, 250_000_000).offset_by(offset), stamp(5, 0));
    }

    #[test]
    fn from_parts_normalizes_out_of_range_nanos() {
        assert_eq!(Stamp::from_parts(1, 2_500_000_000), stamp(3, 500_000_000));
        assert_eq!(Stamp::from_parts(1, -1), stamp(0, 999_999_999));
    }

    #[test]
    fn deserialize_normalizes_out_of_range_nanos() {
        let s: Stamp = serde_json::from_str(r#"{"sec":1,"nanosec":3000000000}"#).unwrap();
        assert_eq!(s, stamp(4, 0));

        let s: Stamp = serde_json::from_str(r#"{"sec":2,"nanosec":-1}"#).unwrap();
        assert_eq!(s, stamp(1, 999_999_999));

        let offset: ClockOffset = serde_json::from_str(r#"{"nanosec":1500000000}"#).unwrap();
        assert_eq!(
            offset,
            ClockOffset {
                sec: 1,
                nanosec: 500_000_000
            }
        );
    }

    #[test]
    fn unix_duration_conversion() {
        let s = Stamp::from_unix_duration(Duration::new(1_700_000_000, 42));
        assert_eq!(s, stamp(1_700_000_000, 42));
    }
}
