use std::sync::{Arc, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use synbridge_msgs::{ClockOffset, Stamp};
use tracing::debug;

/// Source of local wall-clock time.
pub trait WallClock: Send + Sync {
    fn now(&self) -> Stamp;
}

/// Wall clock backed by [`SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now(&self) -> Stamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(Stamp::from_unix_duration)
            .unwrap_or(Stamp::ZERO)
    }
}

/// Tracks the offset between the remote peer's uptime and local wall time.
///
/// Each uptime report replaces the offset outright. Translations always use
/// the most recent report.
pub struct ClockSync {
    clock: Arc<dyn WallClock>,
    offset: RwLock<ClockOffset>,
}

impl ClockSync {
    /// Start with a zero offset.
    pub fn new(clock: Arc<dyn WallClock>) -> Self {
        Self {
            clock,
            offset: RwLock::new(ClockOffset::ZERO),
        }
    }

    /// Record a remote uptime report.
    ///
    /// Returns the uptime to publish (unchanged) and the new offset.
    pub fn on_uptime_report(&self, remote_uptime: Stamp) -> (Stamp, ClockOffset) {
        let now = self.clock.now();
        let offset = now.offset_from(remote_uptime);
        *self.offset.write().unwrap_or_else(PoisonError::into_inner) = offset;
        debug!(
            uptime_sec = remote_uptime.sec,
            offset_sec = offset.sec,
            offset_nanosec = offset.nanosec,
            "clock offset updated"
        );
        (remote_uptime, offset)
    }

    /// Move a remote stamp onto the local wall-clock timeline.
    pub fn translate(&self, remote: Stamp) -> Stamp {
        remote.offset_by(self.offset())
    }

    /// The offset from the most recent uptime report.
    pub fn offset(&self) -> ClockOffset {
        *self.offset.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ClockSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockSync")
            .field("offset", &self.offset())
            .finish()
    }
}
