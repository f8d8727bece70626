use std::net::IpAddr;
use std::sync::Arc;

use super::ProbeSettings;
use crate::engine::{IcmpKind, SendEngine, TcpFlag};

/// Asynchronous dispatchers: queue probes on the send engine and return at once.
///
/// Cheap to clone; every orchestrated task carries its own copy.
#[derive(Clone)]
pub struct Dispatcher {
    settings: Arc<ProbeSettings>,
    engine: Arc<dyn SendEngine>,
}

impl Dispatcher {
    pub fn new(settings: Arc<ProbeSettings>, engine: Arc<dyn SendEngine>) -> Self {
        Self { settings, engine }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    pub fn ping_probes_async(&self, target: IpAddr) {
        self.engine.enqueue_icmp(target, IcmpKind::EchoRequest);
        self.engine.enqueue_icmp(target, IcmpKind::TimestampRequest);
    }

    pub fn syn_probes_async(&self, target: IpAddr) {
        for &port in &self.settings.syn_ports {
            self.engine.enqueue_tcp(target, port, TcpFlag::Syn);
        }
    }

    pub fn ack_probes_async(&self, target: IpAddr) {
        for &port in &self.settings.ack_ports {
            self.engine.enqueue_tcp(target, port, TcpFlag::Ack);
        }
    }

    /// Every discovery probe for one target.
    pub fn dispatch(&self, target: IpAddr) {
        self.ping_probes_async(target);
        self.syn_probes_async(target);
        self.ack_probes_async(target);
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
