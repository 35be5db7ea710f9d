use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Largest payload a single IPv4 UDP datagram can carry.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Outcome of a bounded receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// A datagram of this many bytes was written into the buffer.
    Datagram(usize),
    /// The timeout elapsed without a datagram.
    Timeout,
}

/// UDP endpoint bound locally and connected to one remote peer.
///
/// Sending and receiving take `&self`, so one link can be shared between a
/// sending context and a blocked receiving context.
pub struct UdpLink {
    socket: UdpSocket,
    local: SocketAddr,
    remote: SocketAddr,
    max_datagram: usize,
    read_timeout: Mutex<Option<Duration>>,
}

impl UdpLink {
    /// Default local bind address: any IPv4 interface, ephemeral port.
    pub const DEFAULT_LOCAL_ADDR: &'static str = "0.0.0.0:0";

    /// Open a link to `host:port` from an explicit local address.
    pub fn open_with_local(host: &str, port: u16, local_addr: &str) -> Result<Self> {
        let bind_addr: SocketAddr = local_addr.parse().map_err(|_| TransportError::Bind {
            addr: local_addr.to_string(),
            source: std::io::Error::new(ErrorKind::InvalidInput, "not a socket address"),
        })?;
        let remote = resolve(host, port, bind_addr.is_ipv4())?;

        let socket = UdpSocket::bind(bind_addr).map_err(|e| TransportError::Bind {
            addr: local_addr.to_string(),
            source: e,
        })?;
        socket
            .connect(remote)
            .map_err(|e| TransportError::Connect {
                addr: remote,
                source: e,
            })?;
        let local = socket.local_addr().map_err(|e| TransportError::Bind {
            addr: local_addr.to_string(),
            source: e,
        })?;

        info!(%local, %remote, "udp link open");

        Ok(Self {
            socket,
            local,
            remote,
            max_datagram: MAX_DATAGRAM_SIZE,
            read_timeout: Mutex::new(None),
        })
    }

    /// Lower the largest datagram accepted by [`UdpLink::recv_timeout`].
    pub fn with_max_datagram(mut self, max_datagram: usize) -> Self {
        self.max_datagram = max_datagram.min(MAX_DATAGRAM_SIZE);
        self
    }

    /// Send one datagram. No delivery confirmation, no retry.
    pub fn send(&self, datagram: &[u8]) -> Result<usize> {
        let sent = self.socket.send(datagram).map_err(|err| self.classify(err))?;
        debug!(bytes = sent, remote = %self.remote, "datagram sent");
        Ok(sent)
    }

    /// Block until a datagram arrives or `timeout` elapses.
    ///
    /// `buf` should be at least [`UdpLink::recv_buffer_len`] bytes so that
    /// oversized datagrams can be told apart from ones that exactly fit.
    /// An oversized datagram is consumed and reported as
    /// [`TransportError::Oversized`].
    pub fn recv_timeout(&self, buf: &mut [u8], timeout: Duration) -> Result<Received> {
        if timeout.is_zero() {
            return Err(TransportError::InvalidTimeout);
        }
        self.apply_read_timeout(timeout)?;

        match self.socket.recv(buf) {
            Ok(n) if n > self.max_datagram => Err(TransportError::Oversized {
                size: n,
                max: self.max_datagram,
            }),
            Ok(n) => Ok(Received::Datagram(n)),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(Received::Timeout)
            }
            Err(err) => Err(self.classify(err)),
        }
    }

    /// Receive buffer size that lets [`UdpLink::recv_timeout`] detect oversize.
    pub fn recv_buffer_len(&self) -> usize {
        self.max_datagram + 1
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// Remote address all datagrams go to and come from.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Connected sockets report an earlier unreachable send on the next call.
    fn classify(&self, err: std::io::Error) -> TransportError {
        if err.kind() == ErrorKind::ConnectionRefused {
            TransportError::PeerUnreachable { addr: self.remote }
        } else {
            TransportError::Io(err)
        }
    }

    fn apply_read_timeout(&self, timeout: Duration) -> Result<()> {
        let mut current = self
            .read_timeout
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if *current != Some(timeout) {
            self.socket.set_read_timeout(Some(timeout))?;
            *current = Some(timeout);
        }
        Ok(())
    }
}

impl std::fmt::Debug for UdpLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpLink")
            .field("local", &self.local)
            .field("remote", &self.remote)
            .field("max_datagram", &self.max_datagram)
            .finish()
    }
}

/// Resolve `host:port`, preferring an address of the local socket's family.
pub(crate) fn resolve(host: &str, port: u16, want_ipv4: bool) -> Result<SocketAddr> {
    let resolve_err = |source| TransportError::Resolve {
        host: host.to_string(),
        port,
        source,
    };
    let mut candidates = (host, port).to_socket_addrs().map_err(resolve_err)?;
    candidates
        .find(|addr| addr.is_ipv4() == want_ipv4)
        .ok_or_else(|| {
            resolve_err(std::io::Error::new(
                ErrorKind::AddrNotAvailable,
                "no address in the local socket's family",
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer_and_link() -> (UdpSocket, UdpLink) {
        let peer = UdpSocket::bind("127.0.0.1:0").expect("peer should bind");
        let port = peer.local_addr().expect("peer addr").port();
        let link =
            UdpLink::open_with_local("127.0.0.1", port, "127.0.0.1:0").expect("link should open");
        peer.connect(link.local_addr()).expect("peer should connect");
        (peer, link)
    }

    #[test]
    fn send_reaches_remote_peer() {
        let (peer, link) = peer_and_link();
        link.send(b"hello").unwrap();

        let mut buf = [0u8; 64];
        let n = peer.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[test]
    fn recv_returns_datagram_from_peer() {
        let (peer, link) = peer_and_link();
        peer.send(b"frame").unwrap();

        let mut buf = vec![0u8; link.recv_buffer_len()];
        let got = link.recv_timeout(&mut buf, Duration::from_secs(2)).unwrap();
        assert_eq!(got, Received::Datagram(5));
        assert_eq!(&buf[..5], b"frame");
    }

    #[test]
    fn recv_times_out_without_traffic() {
        let (_peer, link) = peer_and_link();
        let mut buf = vec![0u8; link.recv_buffer_len()];
        let got = link
            .recv_timeout(&mut buf, Duration::from_millis(50))
            .unwrap();
        assert_eq!(got, Received::Timeout);
    }

    #[test]
    fn recv_rejects_zero_timeout() {
        let (_peer, link) = peer_and_link();
        let mut buf = vec![0u8; link.recv_buffer_len()];
        let err = link.recv_timeout(&mut buf, Duration::ZERO).unwrap_err();
        assert!(matches!(err, TransportError::InvalidTimeout));
    }

    #[test]
    fn oversized_datagram_is_reported_then_skipped() {
        let (peer, link) = peer_and_link();
        let link = link.with_max_datagram(16);
        peer.send(&[0xAA; 64]).unwrap();
        peer.send(b"small").unwrap();

        let mut buf = vec![0u8; link.recv_buffer_len()];
        let err = link
            .recv_timeout(&mut buf, Duration::from_secs(2))
            .unwrap_err();
        assert!(matches!(err, TransportError::Oversized { max: 16, .. }));

        let got = link.recv_timeout(&mut buf, Duration::from_secs(2)).unwrap();
        assert_eq!(got, Received::Datagram(5));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn refused_send_surfaces_as_peer_unreachable() {
        let closed = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = closed.local_addr().unwrap().port();
        drop(closed);

        let link = UdpLink::open_with_local("127.0.0.1", port, "127.0.0.1:0").unwrap();
        link.send(b"anyone?").unwrap();

        let mut buf = vec![0u8; link.recv_buffer_len()];
        let err = link
            .recv_timeout(&mut buf, Duration::from_secs(2))
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::PeerUnreachable { addr } if addr.port() == port
        ));
        assert!(!err.is_setup());
    }

    #[test]
    fn open_rejects_unparseable_local_addr() {
        let err = UdpLink::open_with_local("127.0.0.1", 4242, "not-an-addr").unwrap_err();
        assert!(matches!(err, TransportError::Bind { .. }));
        assert!(err.is_setup());
    }

    #[test]
    fn open_reports_local_port_in_use() {
        let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
        let local = taken.local_addr().unwrap().to_string();
        let err = UdpLink::open_with_local("127.0.0.1", 4242, &local).unwrap_err();
        assert!(matches!(err, TransportError::Bind { .. }));
    }

    #[test]
    fn resolve_prefers_local_family() {
        let addr = resolve("127.0.0.1", 4242, true).unwrap();
        assert!(addr.is_ipv4());
        assert!(resolve("127.0.0.1", 4242, false).is_err());
    }
}
