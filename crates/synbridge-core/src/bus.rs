use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use synbridge_msgs::BusMessage;
use tracing::trace;

/// Subscriber callback, invoked synchronously on the publishing context.
pub type Callback = Arc<dyn Fn(&BusMessage) + Send + Sync>;

/// The publish/subscribe side of the bridge.
///
/// The bridge subscribes once per outbound topic and publishes decoded
/// inbound messages. Implementations wrap whatever bus the host process
/// uses.
pub trait Bus: Send + Sync {
    fn publish(&self, topic: &str, message: BusMessage);
    fn subscribe(&self, topic: &str, callback: Callback);
}

/// In-process bus: topic name to subscriber list.
#[derive(Default)]
pub struct LocalBus {
    subscribers: RwLock<HashMap<String, Vec<Callback>>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks subscribed to `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl Bus for LocalBus {
    fn publish(&self, topic: &str, message: BusMessage) {
        // Callbacks run without the lock held so they may publish or subscribe.
        let callbacks = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
            .unwrap_or_default();
        trace!(topic, subscribers = callbacks.len(), kind = message.kind(), "publish");
        for callback in callbacks {
            callback(&message);
        }
    }

    fn subscribe(&self, topic: &str, callback: Callback) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic.to_string())
            .or_default()
            .push(callback);
    }
}

impl std::fmt::Debug for LocalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("LocalBus")
            .field("topics", &subscribers.keys().collect::<Vec<_>>())
            .finish()
    }
}
