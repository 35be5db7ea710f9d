use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Per-link counters. Dropped datagrams and messages are counted here
/// rather than surfaced anywhere else.
#[derive(Debug, Default)]
pub struct LinkStats {
    frames_sent: AtomicU64,
    frames_received: AtomicU64,
    publications: AtomicU64,
    unknown_tags: AtomicU64,
    malformed: AtomicU64,
    encode_failures: AtomicU64,
    decode_failures: AtomicU64,
    send_failures: AtomicU64,
    recv_failures: AtomicU64,
}

/// Point-in-time copy of [`LinkStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub frames_sent: u64,
    pub frames_received: u64,
    pub publications: u64,
    pub unknown_tags: u64,
    pub malformed: u64,
    pub encode_failures: u64,
    pub decode_failures: u64,
    pub send_failures: u64,
    pub recv_failures: u64,
}

fn bump(counter: &AtomicU64, by: u64) {
    counter.fetch_add(by, Ordering::Relaxed);
}

impl LinkStats {
    pub(crate) fn frame_sent(&self) {
        bump(&self.frames_sent, 1);
    }

    pub(crate) fn frame_received(&self) {
        bump(&self.frames_received, 1);
    }

    pub(crate) fn published(&self, count: usize) {
        bump(&self.publications, count as u64);
    }

    pub(crate) fn unknown_tag(&self) {
        bump(&self.unknown_tags, 1);
    }

    pub(crate) fn malformed(&self) {
        bump(&self.malformed, 1);
    }

    pub(crate) fn encode_failed(&self) {
        bump(&self.encode_failures, 1);
    }

    pub(crate) fn decode_failed(&self) {
        bump(&self.decode_failures, 1);
    }

    pub(crate) fn send_failed(&self) {
        bump(&self.send_failures, 1);
    }

    pub(crate) fn recv_failed(&self) {
        bump(&self.recv_failures, 1);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            frames_sent: load(&self.frames_sent),
            frames_received: load(&self.frames_received),
            publications: load(&self.publications),
            unknown_tags: load(&self.unknown_tags),
            malformed: load(&self.malformed),
            encode_failures: load(&self.encode_failures),
            decode_failures: load(&self.decode_failures),
            send_failures: load(&self.send_failures),
            recv_failures: load(&self.recv_failures),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let stats = LinkStats::default();
        stats.frame_received();
        stats.frame_received();
        stats.published(2);
        stats.malformed();

        let snap = stats.snapshot();
        assert_eq!(snap.frames_received, 2);
        assert_eq!(snap.publications, 2);
        assert_eq!(snap.malformed, 1);
        assert_eq!(snap.frames_sent, 0);
    }
}
