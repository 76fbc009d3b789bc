//! Port-probe algorithm.
//!
//! A record's primary address is deemed reachable when a raw TCP
//! connection to any of ports 80, 443, 22 (tried in that order,
//! short-circuiting on the first success) completes within 3 seconds.
//! Refused, timed out, and unresolvable all collapse into a single
//! failed attempt — the source system never distinguished them and that
//! behavior is carried forward unchanged.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

/// Ports tried per address, in order.
pub const PROBE_PORTS: [u16; 3] = [80, 443, 22];

/// Per-attempt connect timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Reachability oracle for a single address.
///
/// The sweep engine takes a `dyn Prober` so tests can instrument
/// concurrency and script outcomes without opening sockets.
#[async_trait]
pub trait Prober: Send + Sync {
    /// True when the address is reachable.
    async fn probe(&self, address: &str) -> bool;
}

/// The real prober: sequential TCP connect attempts with a fixed timeout.
pub struct TcpProber {
    ports: [u16; 3],
    timeout: Duration,
}

impl Default for TcpProber {
    fn default() -> Self {
        Self {
            ports: PROBE_PORTS,
            timeout: PROBE_TIMEOUT,
        }
    }
}

impl TcpProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override ports and timeout (for testing against local listeners).
    pub fn with_ports(ports: [u16; 3], timeout: Duration) -> Self {
        Self { ports, timeout }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: &str) -> bool {
        for port in self.ports {
            if check_port(address, port, self.timeout).await {
                debug!(%address, port, "probe succeeded");
                return true;
            }
        }
        debug!(%address, "probe failed on all ports");
        false
    }
}

/// One connect attempt. Timeout, refusal, and resolution failure are all
/// a single failure signal.
pub async fn check_port(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}
