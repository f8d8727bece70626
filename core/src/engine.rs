//! Seams between the probe runner and the packet layer.
//!
//! [`SendEngine`] is the fire-and-forget queue used by the asynchronous
//! dispatchers; [`Prober`] answers one probe at a time for the synchronous
//! evaluators. Both are implemented over raw sockets in [`raw`] and [`net`].

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProbeError;

pub use vitals_protocols::icmp::IcmpKind;
pub use vitals_protocols::tcp::TcpFlag;

pub mod net;
pub mod raw;

/// Scan phase marker owned by the scan engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Init,
    Probe,
    Scan,
    Done,
    Guard,
}

impl Phase {
    /// Enters the probe phase.
    pub fn begin_probe(self) -> Phase {
        debug!(from = ?self, "entering probe phase");
        Phase::Probe
    }
}

/// Outcome of a single blocking probe.
#[derive(Debug, Default)]
pub struct Reply {
    pub ok: bool,
    pub error: Option<ProbeError>,
}

impl Reply {
    pub fn answered() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn from_error(error: ProbeError) -> Self {
        Self {
            ok: false,
            error: Some(error),
        }
    }

    /// Answered with no error attached.
    pub fn is_clean(&self) -> bool {
        self.ok && self.error.is_none()
    }
}

/// Queue of raw probes processed in batch by a lower level engine.
///
/// Implementations must be safe to call from many tasks at once and must not block.
pub trait SendEngine: Send + Sync {
    fn enqueue_icmp(&self, target: IpAddr, kind: IcmpKind);
    fn enqueue_tcp(&self, target: IpAddr, port: u16, flag: TcpFlag);
}

/// Probes that wait for an answer or the timeout, whichever comes first.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn ping_icmp_echo(&self, target: IpAddr, timeout: Duration) -> bool;
    async fn ping_icmp_timestamp(&self, target: IpAddr, timeout: Duration) -> bool;
    async fn connect_port(&self, target: IpAddr, port: u16, timeout: Duration) -> Reply;
    async fn ack_port(&self, target: IpAddr, port: u16, timeout: Duration) -> Reply;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
