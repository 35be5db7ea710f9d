use std::time::Duration;

use synbridge_frame::DEFAULT_MAX_PAYLOAD;
use synbridge_transport::UdpLink;

/// Default remote endpoint host.
pub const DEFAULT_HOST: &str = "192.0.2.1";

/// Default remote endpoint port.
pub const DEFAULT_PORT: u16 = 4242;

/// Default receive timeout; also the upper bound on shutdown latency.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for a bridge link.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Remote peer host name or address.
    pub remote_host: String,
    /// Remote peer UDP port.
    pub remote_port: u16,
    /// Local bind address. Default: any IPv4 interface, ephemeral port.
    pub local_addr: String,
    /// How long one receive may block before the loop re-checks liveness.
    pub recv_timeout: Duration,
    /// Maximum frame payload in either direction.
    pub max_payload_size: usize,
}

impl BridgeConfig {
    /// Default configuration for an explicit remote endpoint.
    pub fn new(remote_host: impl Into<String>, remote_port: u16) -> Self {
        Self {
            remote_host: remote_host.into(),
            remote_port,
            ..Self::default()
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            remote_host: DEFAULT_HOST.to_string(),
            remote_port: DEFAULT_PORT,
            local_addr: UdpLink::DEFAULT_LOCAL_ADDR.to_string(),
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
