use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use synbridge_msgs::{BusMessage, Stamp};

use crate::bus::{Bus, Callback, LocalBus};
use crate::clock::WallClock;

/// Wall clock that only moves when told to.
pub(crate) struct FixedClock {
    now: Mutex<Stamp>,
}

impl FixedClock {
    pub(crate) fn at(now: Stamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn set(&self, now: Stamp) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl WallClock for FixedClock {
    fn now(&self) -> Stamp {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Bus that records every publication and forwards to a [`LocalBus`].
#[derive(Default)]
pub(crate) struct RecordingBus {
    local: LocalBus,
    published: Mutex<Vec<(String, BusMessage)>>,
    changed: Condvar,
}

impl RecordingBus {
    /// Wait until at least `count` publications were recorded.
    pub(crate) fn wait_for(&self, count: usize, timeout: Duration) -> Vec<(String, BusMessage)> {
        let deadline = Instant::now() + timeout;
        let mut published = self.published.lock().unwrap();
        while published.len() < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            published = self.changed.wait_timeout(published, remaining).unwrap().0;
        }
        published.clone()
    }

    pub(crate) fn published(&self) -> Vec<(String, BusMessage)> {
        self.published.lock().unwrap().clone()
    }
}

impl Bus for RecordingBus {
    fn publish(&self, topic: &str, message: BusMessage) {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), message.clone()));
        self.changed.notify_all();
        self.local.publish(topic, message);
    }

    fn subscribe(&self, topic: &str, callback: Callback) {
        self.local.subscribe(topic, callback);
    }
}
