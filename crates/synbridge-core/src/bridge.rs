use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use synbridge_msgs::BusMessage;
use tracing::{debug, info, warn};

use crate::bus::{Bus, Callback};
use crate::clock::{SystemWallClock, WallClock};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::link::Link;
use crate::stats::StatsSnapshot;

/// Name of the receive-loop thread.
pub const RECEIVER_THREAD_NAME: &str = "synbridge-rx";

/// Lifecycle of a [`Bridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Running,
    ShuttingDown,
    Terminated,
}

/// Cloneable handle that asks a running bridge to stop.
///
/// Triggering only clears the liveness flag. The receive loop exits at its
/// next timeout boundary; [`Bridge::shutdown`] still has to be called to
/// join it.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    running: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn trigger(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        !self.running.load(Ordering::Acquire)
    }
}

/// Relays between a bus and one UDP peer.
///
/// Outbound traffic runs on whatever context the bus invokes callbacks on.
/// Inbound traffic runs on a dedicated receive thread. Both share one
/// [`Link`].
pub struct Bridge {
    config: BridgeConfig,
    bus: Arc<dyn Bus>,
    clock: Arc<dyn WallClock>,
    state: BridgeState,
    running: Arc<AtomicBool>,
    link: Option<Arc<Link>>,
    receiver: Option<JoinHandle<()>>,
}

impl Bridge {
    /// A bridge that has not opened its link yet.
    pub fn new(config: BridgeConfig, bus: Arc<dyn Bus>) -> Self {
        Self {
            config,
            bus,
            clock: Arc::new(SystemWallClock),
            state: BridgeState::Uninitialized,
            running: Arc::new(AtomicBool::new(false)),
            link: None,
            receiver: None,
        }
    }

    /// Use `clock` instead of the system wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn WallClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Open the link, subscribe outbound routes and spawn the receive loop.
    ///
    /// Errors from here are fatal: the bridge stays `Uninitialized`.
    pub fn start(&mut self) -> Result<()> {
        if self.state != BridgeState::Uninitialized {
            return Err(BridgeError::InvalidState(self.state));
        }

        let link = Arc::new(Link::open(
            &self.config,
            Arc::clone(&self.bus),
            Arc::clone(&self.clock),
        )?);
        info!(
            local = %link.local_addr(),
            remote = %link.remote_addr(),
            "bridge link open"
        );

        self.running.store(true, Ordering::Release);
        let receiver = thread::Builder::new()
            .name(RECEIVER_THREAD_NAME.to_string())
            .spawn({
                let link = Arc::clone(&link);
                let running = Arc::clone(&self.running);
                let timeout = self.config.recv_timeout;
                move || receive_loop(&link, &running, timeout)
            })
            .map_err(|err| {
                self.running.store(false, Ordering::Release);
                BridgeError::Spawn(err)
            })?;

        for route in link.router().outbound_routes() {
            self.bus.subscribe(
                route.topic,
                outbound_callback(route.topic, Arc::downgrade(&link), &self.running),
            );
        }

        self.link = Some(link);
        self.receiver = Some(receiver);
        self.state = BridgeState::Running;
        info!("bridge running");
        Ok(())
    }

    /// Stop the receive loop and wait for it to exit.
    ///
    /// Blocks for at most about one receive timeout. Calling it again is a
    /// no-op.
    pub fn shutdown(&mut self) -> Result<()> {
        match self.state {
            BridgeState::Terminated => return Ok(()),
            BridgeState::Uninitialized => {
                self.state = BridgeState::Terminated;
                return Ok(());
            }
            BridgeState::Running | BridgeState::ShuttingDown => {}
        }

        self.state = BridgeState::ShuttingDown;
        self.running.store(false, Ordering::Release);
        let joined = match self.receiver.take() {
            Some(handle) => handle.join().map_err(|_| BridgeError::ReceiverPanicked),
            None => Ok(()),
        };

        if let Some(link) = self.link.take() {
            let stats = link.stats();
            info!(
                frames_sent = stats.frames_sent,
                frames_received = stats.frames_received,
                publications = stats.publications,
                dropped = stats.malformed + stats.decode_failures + stats.unknown_tags,
                "bridge stopped"
            );
        }
        self.state = BridgeState::Terminated;
        joined
    }

    /// Forward a message to the peer as if it had been published on `topic`.
    pub fn forward(&self, topic: &str, message: &BusMessage) -> Result<()> {
        match (&self.link, self.state) {
            (Some(link), BridgeState::Running) => link.forward(topic, message),
            (_, state) => Err(BridgeError::InvalidState(state)),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Whether the bridge is running and nobody has asked it to stop.
    pub fn is_running(&self) -> bool {
        self.state == BridgeState::Running && self.running.load(Ordering::Acquire)
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            running: Arc::clone(&self.running),
        }
    }

    /// The open link, while running.
    pub fn link(&self) -> Option<&Link> {
        self.link.as_deref()
    }

    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.link.as_ref().map(|link| link.stats())
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "bridge shutdown failed during drop");
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("link", &self.link)
            .finish()
    }
}

fn outbound_callback(
    topic: &'static str,
    link: Weak<Link>,
    running: &Arc<AtomicBool>,
) -> Callback {
    let running = Arc::clone(running);
    Arc::new(move |message: &BusMessage| {
        if !running.load(Ordering::Acquire) {
            return;
        }
        let Some(link) = link.upgrade() else {
            return;
        };
        if let Err(err) = link.forward(topic, message) {
            warn!(topic, error = %err, "dropping outbound message");
        }
    })
}

fn receive_loop(link: &Link, running: &AtomicBool, timeout: Duration) {
    debug!(timeout_ms = timeout.as_millis() as u64, "receive loop started");
    let mut buf = link.recv_buffer();
    while running.load(Ordering::Acquire) {
        if let Err(err) = link.poll(&mut buf, timeout) {
            warn!(error = %err, "dropping inbound datagram");
        }
    }
    debug!("receive loop exited");
}
