use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use synbridge_frame::{decode_datagram, encode_frame, tag_name, FrameError, HEADER_SIZE};
use synbridge_msgs::BusMessage;
use synbridge_transport::{Received, TransportError, UdpLink};
use tracing::{debug, trace, warn};

use crate::bus::Bus;
use crate::clock::{ClockSync, WallClock};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::router::{Router, ROUTES};
use crate::stats::{LinkStats, StatsSnapshot};

/// What happened to one inbound datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The frame was decoded into this many bus publications.
    Published(usize),
    /// The frame's tag has no inbound route.
    Ignored(u16),
}

/// Outcome of one [`Link::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polled {
    Timeout,
    Dispatched(Dispatch),
    /// The peer rejected an earlier outbound datagram. Counted as a send
    /// failure; nothing inbound was lost.
    PeerUnreachable,
}

/// One UDP endpoint plus everything needed to relay over it.
///
/// A link is shared between the bus callbacks (outbound) and the receive
/// loop (inbound); every method takes `&self`.
pub struct Link {
    transport: UdpLink,
    router: Router,
    clock: ClockSync,
    bus: Arc<dyn Bus>,
    stats: LinkStats,
    max_payload: usize,
}

impl Link {
    /// Open the transport and build the built-in route table.
    pub fn open(
        config: &BridgeConfig,
        bus: Arc<dyn Bus>,
        clock: Arc<dyn WallClock>,
    ) -> Result<Self> {
        Self::with_router(config, bus, clock, Router::new(ROUTES)?)
    }

    /// Open the transport with an explicit route table.
    pub fn with_router(
        config: &BridgeConfig,
        bus: Arc<dyn Bus>,
        clock: Arc<dyn WallClock>,
        router: Router,
    ) -> Result<Self> {
        let transport =
            UdpLink::open_with_local(&config.remote_host, config.remote_port, &config.local_addr)
                .map_err(BridgeError::Connect)?
                .with_max_datagram(config.max_payload_size.saturating_add(HEADER_SIZE));

        Ok(Self {
            transport,
            router: router.with_max_payload(config.max_payload_size),
            clock: ClockSync::new(clock),
            bus,
            stats: LinkStats::default(),
            max_payload: config.max_payload_size,
        })
    }

    /// Relay a bus message published on `topic` to the remote peer.
    pub fn forward(&self, topic: &str, message: &BusMessage) -> Result<()> {
        let (tag, payload) = self.router.encode(topic, message).inspect_err(|err| {
            if matches!(err, BridgeError::Encode { .. }) {
                self.stats.encode_failed();
            }
        })?;

        let mut datagram = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        encode_frame(tag, &payload, &mut datagram).map_err(|err| {
            self.stats.encode_failed();
            BridgeError::Encode {
                topic: topic.to_string(),
                reason: err.to_string(),
            }
        })?;

        self.transport.send(&datagram).map_err(|err| {
            self.stats.send_failed();
            BridgeError::TransportSend(err)
        })?;
        self.stats.frame_sent();
        debug!(topic, tag = tag_name(tag), bytes = payload.len(), "forwarded");
        Ok(())
    }

    /// Decode one datagram and publish whatever it yields.
    pub fn dispatch(&self, datagram: &[u8]) -> Result<Dispatch> {
        let frame = decode_datagram(datagram, self.max_payload).map_err(|err| {
            self.stats.malformed();
            BridgeError::MalformedFrame(err)
        })?;
        self.stats.frame_received();

        let publications = match self.router.decode(frame.tag, &frame.payload, &self.clock) {
            Ok(Some(publications)) => publications,
            Ok(None) => {
                self.stats.unknown_tag();
                trace!(tag = frame.tag, "ignoring frame with unrouted tag");
                return Ok(Dispatch::Ignored(frame.tag));
            }
            Err(err) => {
                self.stats.decode_failed();
                return Err(err);
            }
        };

        let count = publications.len();
        for publication in publications {
            self.bus.publish(publication.topic, publication.message);
        }
        self.stats.published(count);
        debug!(tag = tag_name(frame.tag), publications = count, "dispatched");
        Ok(Dispatch::Published(count))
    }

    /// Wait up to `timeout` for one datagram and dispatch it.
    pub fn poll(&self, buf: &mut [u8], timeout: Duration) -> Result<Polled> {
        match self.transport.recv_timeout(buf, timeout) {
            Ok(Received::Timeout) => Ok(Polled::Timeout),
            Ok(Received::Datagram(len)) => self.dispatch(&buf[..len]).map(Polled::Dispatched),
            Err(TransportError::Oversized { size, max }) => {
                self.stats.malformed();
                Err(BridgeError::MalformedFrame(FrameError::PayloadTooLarge {
                    size: size.saturating_sub(HEADER_SIZE),
                    max: max.saturating_sub(HEADER_SIZE),
                }))
            }
            Err(TransportError::PeerUnreachable { addr }) => {
                self.stats.send_failed();
                warn!(remote = %addr, "peer unreachable, outbound datagram dropped");
                Ok(Polled::PeerUnreachable)
            }
            Err(err) => {
                self.stats.recv_failed();
                Err(BridgeError::TransportRecv(err))
            }
        }
    }

    /// A buffer large enough for [`Link::poll`].
    pub fn recv_buffer(&self) -> Vec<u8> {
        vec![0u8; self.transport.recv_buffer_len()]
    }

    pub fn clock(&self) -> &ClockSync {
        &self.clock
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.transport.remote_addr()
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("transport", &self.transport)
            .field("clock", &self.clock)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::net::UdpSocket;

    use prost::Message;
    use synbridge_frame::{Frame, JOY, STATUS, UPTIME};
    use synbridge_msgs::{wire, Joy, Stamp};

    use super::*;
    use crate::testing::{FixedClock, RecordingBus};

    struct Fixture {
        peer: UdpSocket,
        bus: Arc<RecordingBus>,
        link: Link,
    }

    fn fixture() -> Fixture {
        let peer = UdpSocket::bind("127.0.0.1:0").expect("peer should bind");
        let config = BridgeConfig {
            local_addr: "127.0.0.1:0".to_string(),
            ..BridgeConfig::new("127.0.0.1", peer.local_addr().unwrap().port())
        };
        let bus = Arc::new(RecordingBus::default());
        let clock = Arc::new(FixedClock::at(Stamp { sec: 1000, nanosec: 0 }));
        let link = Link::open(&config, bus.clone(), clock).expect("link should open");
        peer.connect(link.local_addr()).unwrap();
        Fixture { peer, bus, link }
    }

    fn datagram(tag: u16, payload: Vec<u8>) -> Vec<u8> {
        Frame::new(tag, payload).to_datagram().unwrap().to_vec()
    }

    #[test]
    fn forward_sends_framed_payload() {
        let fx = fixture();
        let joy = Joy {
            axes: vec![0.1, -0.2],
            buttons: vec![1, 0],
        };
        fx.link
            .forward("in/joy", &BusMessage::Joy(joy.clone()))
            .unwrap();

        let mut buf = [0u8; 256];
        let n = fx.peer.recv(&mut buf).unwrap();
        let frame = decode_datagram(&buf[..n], usize::MAX).unwrap();
        assert_eq!(frame.tag, JOY);
        assert_eq!(frame.payload.as_ref(), wire::Joy::from(&joy).encode_to_vec());
        assert_eq!(fx.link.stats().frames_sent, 1);
    }

    #[test]
    fn forward_counts_encode_failures() {
        let fx = fixture();
        let err = fx
            .link
            .forward("in/joy", &BusMessage::Time(Stamp::ZERO))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Encode { .. }));
        assert_eq!(fx.link.stats().encode_failures, 1);
        assert_eq!(fx.link.stats().frames_sent, 0);
    }

    #[test]
    fn dispatch_ignores_unknown_tags_silently() {
        let fx = fixture();
        let result = fx.link.dispatch(&datagram(0x7777, b"??".to_vec())).unwrap();
        assert_eq!(result, Dispatch::Ignored(0x7777));
        assert!(fx.bus.published().is_empty());
        assert_eq!(fx.link.stats().unknown_tags, 1);
    }

    #[test]
    fn dispatch_reports_malformed_datagrams() {
        let fx = fixture();
        let err = fx.link.dispatch(b"SY\x01").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MalformedFrame(FrameError::Truncated { .. })
        ));
        assert_eq!(fx.link.stats().malformed, 1);
    }

    #[test]
    fn decode_failure_does_not_block_next_frame() {
        let fx = fixture();
        let err = fx
            .link
            .dispatch(&datagram(STATUS, vec![0x0A, 0x05, 0x01]))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Decode { .. }));

        let uptime = wire::Time { sec: 100, nanosec: 0 }.encode_to_vec();
        let result = fx.link.dispatch(&datagram(UPTIME, uptime)).unwrap();
        assert_eq!(result, Dispatch::Published(2));

        let stats = fx.link.stats();
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.publications, 2);
        assert_eq!(fx.bus.published()[0].0, "out/uptime");
    }

    #[test]
    fn poll_receives_and_dispatches() {
        let fx = fixture();
        let uptime = wire::Time { sec: 100, nanosec: 0 }.encode_to_vec();
        fx.peer.send(&datagram(UPTIME, uptime)).unwrap();

        let mut buf = fx.link.recv_buffer();
        let polled = fx.link.poll(&mut buf, Duration::from_secs(2)).unwrap();
        assert_eq!(polled, Polled::Dispatched(Dispatch::Published(2)));
        assert_eq!(fx.link.clock().offset().sec, 900);

        let polled = fx.link.poll(&mut buf, Duration::from_millis(20)).unwrap();
        assert_eq!(polled, Polled::Timeout);
    }

    #[test]
    fn oversized_datagram_is_malformed_and_skipped() {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let config = BridgeConfig {
            local_addr: "127.0.0.1:0".to_string(),
            max_payload_size: 16,
            ..BridgeConfig::new("127.0.0.1", peer.local_addr().unwrap().port())
        };
        let link = Link::open(
            &config,
            Arc::new(RecordingBus::default()),
            Arc::new(FixedClock::at(Stamp::ZERO)),
        )
        .unwrap();
        peer.connect(link.local_addr()).unwrap();

        peer.send(&datagram(STATUS, vec![0u8; 100])).unwrap();
        let uptime = wire::Time { sec: 1, nanosec: 0 }.encode_to_vec();
        peer.send(&datagram(UPTIME, uptime)).unwrap();

        let mut buf = link.recv_buffer();
        let err = link.poll(&mut buf, Duration::from_secs(2)).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MalformedFrame(FrameError::PayloadTooLarge { max: 16, .. })
        ));
        assert!(!err.is_fatal());

        let polled = link.poll(&mut buf, Duration::from_secs(2)).unwrap();
        assert_eq!(polled, Polled::Dispatched(Dispatch::Published(2)));
        let stats = link.stats();
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.recv_failures, 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn unreachable_peer_counts_as_send_failure() {
        let closed = UdpSocket::bind("127.0.0.1:0").unwrap();
        let config = BridgeConfig {
            local_addr: "127.0.0.1:0".to_string(),
            ..BridgeConfig::new("127.0.0.1", closed.local_addr().unwrap().port())
        };
        drop(closed);
        let link = Link::open(
            &config,
            Arc::new(RecordingBus::default()),
            Arc::new(FixedClock::at(Stamp::ZERO)),
        )
        .unwrap();

        link.forward("in/joy", &BusMessage::Joy(Joy::default()))
            .unwrap();
        let mut buf = link.recv_buffer();
        let polled = link.poll(&mut buf, Duration::from_secs(2)).unwrap();
        assert_eq!(polled, Polled::PeerUnreachable);

        let stats = link.stats();
        assert_eq!(stats.frames_sent, 1);
        assert_eq!(stats.send_failures, 1);
        assert_eq!(stats.recv_failures, 0);
    }

    #[test]
    fn open_failure_is_fatal_connect_error() {
        let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
        let config = BridgeConfig {
            local_addr: taken.local_addr().unwrap().to_string(),
            ..BridgeConfig::new("127.0.0.1", 4242)
        };
        let err = Link::open(
            &config,
            Arc::new(RecordingBus::default()),
            Arc::new(FixedClock::at(Stamp::ZERO)),
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::Connect(_)));
        assert!(err.is_fatal());
    }
}
