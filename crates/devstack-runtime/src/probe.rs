//! TCP readiness probes.
//!
//! A probe attempt is a short-lived connection attempt under a sub-second
//! timeout; attempts repeat at a fixed interval until the aggregate
//! deadline. "Connection refused" and "timed out" are deliberately
//! indistinguishable: both mean "not ready yet".

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, timeout};
use tracing::debug;

const ATTEMPT_TIMEOUT: Duration = Duration::from_millis(500);
const RETRY_INTERVAL: Duration = Duration::from_millis(200);

/// Bounded retry policy for one readiness gate.
#[derive(Debug, Clone, Copy)]
pub struct ProbePolicy {
    /// Aggregate deadline across all attempts.
    pub deadline: Duration,
    /// Per-attempt connect timeout.
    pub attempt_timeout: Duration,
    /// Pause between attempts.
    pub interval: Duration,
}

impl ProbePolicy {
    #[must_use]
    pub const fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            attempt_timeout: ATTEMPT_TIMEOUT,
            interval: RETRY_INTERVAL,
        }
    }

    /// Policy for the tracing sink gate.
    #[must_use]
    pub const fn tracing() -> Self {
        Self::new(Duration::from_secs(20))
    }

    /// Policy for the proxy gate.
    #[must_use]
    pub const fn proxy() -> Self {
        Self::new(Duration::from_secs(20))
    }

    /// Policy for the http MCP server gate. Longer: tool servers routinely
    /// import half the world before they bind.
    #[must_use]
    pub const fn mcp_http() -> Self {
        Self::new(Duration::from_secs(25))
    }
}

/// One connection attempt. True once a TCP handshake succeeds.
pub async fn probe_once(host: &str, port: u16, attempt_timeout: Duration) -> bool {
    matches!(
        timeout(attempt_timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// Poll `host:port` until it accepts a connection or the policy deadline
/// elapses. Returns false on deadline.
pub async fn wait_port(host: &str, port: u16, policy: &ProbePolicy) -> bool {
    let deadline = Instant::now() + policy.deadline;
    loop {
        if probe_once(host, port, policy.attempt_timeout).await {
            return true;
        }
        if Instant::now() >= deadline {
            debug!(host, port, "Readiness probe deadline elapsed");
            return false;
        }
        sleep(policy.interval).await;
    }
}
