use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::udp::{resolve, Received, MAX_DATAGRAM_SIZE};

/// Tokio counterpart of [`crate::UdpLink`].
#[derive(Debug)]
pub struct AsyncUdpLink {
    socket: UdpSocket,
    local: SocketAddr,
    remote: SocketAddr,
    max_datagram: usize,
}

impl AsyncUdpLink {
    /// Open a link to `host:port` from an explicit local address.
    pub async fn open_with_local(host: &str, port: u16, local_addr: &str) -> Result<Self> {
        let bind_addr: SocketAddr = local_addr.parse().map_err(|_| TransportError::Bind {
            addr: local_addr.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a socket address"),
        })?;
        let remote = resolve(host, port, bind_addr.is_ipv4())?;

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| TransportError::Bind {
                addr: local_addr.to_string(),
                source: e,
            })?;
        socket
            .connect(remote)
            .await
            .map_err(|e| TransportError::Connect {
                addr: remote,
                source: e,
            })?;
        let local = socket.local_addr()?;

        info!(%local, %remote, "async udp link open");

        Ok(Self {
            socket,
            local,
            remote,
            max_datagram: MAX_DATAGRAM_SIZE,
        })
    }

    /// Send one datagram.
    pub async fn send(&self, datagram: &[u8]) -> Result<usize> {
        let sent = self
            .socket
            .send(datagram)
            .await
            .map_err(|err| self.classify(err))?;
        debug!(bytes = sent, remote = %self.remote, "datagram sent");
        Ok(sent)
    }

    /// Wait for a datagram or until `timeout` elapses.
    pub async fn recv_timeout(&self, buf: &mut [u8], timeout: Duration) -> Result<Received> {
        if timeout.is_zero() {
            return Err(TransportError::InvalidTimeout);
        }
        match tokio::time::timeout(timeout, self.socket.recv(buf)).await {
            Err(_elapsed) => Ok(Received::Timeout),
            Ok(Ok(n)) if n > self.max_datagram => Err(TransportError::Oversized {
                size: n,
                max: self.max_datagram,
            }),
            Ok(Ok(n)) => Ok(Received::Datagram(n)),
            Ok(Err(err)) => Err(self.classify(err)),
        }
    }

    fn classify(&self, err: std::io::Error) -> TransportError {
        if err.kind() == std::io::ErrorKind::ConnectionRefused {
            TransportError::PeerUnreachable { addr: self.remote }
        } else {
            TransportError::Io(err)
        }
    }

    /// Receive buffer size that lets [`AsyncUdpLink::recv_timeout`] detect oversize.
    pub fn recv_buffer_len(&self) -> usize {
        self.max_datagram + 1
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn async_link_roundtrip_with_peer() {
        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = peer.local_addr().unwrap().port();
        let link = AsyncUdpLink::open_with_local("127.0.0.1", port, "127.0.0.1:0")
            .await
            .unwrap();
        peer.connect(link.local_addr()).await.unwrap();

        link.send(b"up").await.unwrap();
        let mut small = [0u8; 8];
        let n = peer.recv(&mut small).await.unwrap();
        assert_eq!(&small[..n], b"up");

        peer.send(b"down").await.unwrap();
        let mut buf = vec![0u8; link.recv_buffer_len()];
        let got = link
            .recv_timeout(&mut buf, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(got, Received::Datagram(4));
        assert_eq!(&buf[..4], b"down");
    }

    #[tokio::test]
    async fn async_link_times_out() {
        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = peer.local_addr().unwrap().port();
        let link = AsyncUdpLink::open_with_local("127.0.0.1", port, "127.0.0.1:0")
            .await
            .unwrap();

        let mut buf = vec![0u8; link.recv_buffer_len()];
        let got = link
            .recv_timeout(&mut buf, Duration::from_millis(30))
            .await
            .unwrap();
        assert_eq!(got, Received::Timeout);
    }
}
