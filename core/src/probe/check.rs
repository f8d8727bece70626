use std::net::IpAddr;
use std::sync::Arc;

use tracing::trace;

use super::{ProbeSettings, has_refused_connection};
use crate::engine::Prober;

/// Synchronous evaluators: each probe family answers with a verdict for one host.
pub struct Checker<P> {
    settings: Arc<ProbeSettings>,
    prober: P,
}

impl<P: Prober> Checker<P> {
    pub fn new(settings: Arc<ProbeSettings>, prober: P) -> Self {
        Self { settings, prober }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// ICMP verdict for `target`.
    ///
    /// Starts out alive. A failed echo can only take that away and a timestamp
    /// reply can only give it back, so the timestamp probe is only sent when
    /// the verdict is currently negative.
    pub async fn ping_probes(&self, target: IpAddr) -> bool {
        let cfg = &self.settings.config;
        let mut result = true;

        if cfg.icmp_echo_probe {
            result = result && self.prober.ping_icmp_echo(target, cfg.timeout()).await;
        }
        if cfg.icmp_timestamp_probe {
            result = result || self.prober.ping_icmp_timestamp(target, cfg.timeout()).await;
        }

        trace!(%target, result, "icmp probes evaluated");
        result
    }

    /// Alive on the first port that accepts or refuses the connection.
    pub async fn syn_probes(&self, target: IpAddr) -> bool {
        let timeout = self.settings.config.timeout();
        for &port in &self.settings.syn_ports {
            let reply = self.prober.connect_port(target, port, timeout).await;
            if reply.ok || has_refused_connection(reply.error.as_ref()) {
                trace!(%target, port, "syn probe answered");
                return true;
            }
        }
        false
    }

    /// Alive on the first port that answers the ACK cleanly.
    pub async fn ack_probes(&self, target: IpAddr) -> bool {
        let timeout = self.settings.config.timeout();
        for &port in &self.settings.ack_ports {
            let reply = self.prober.ack_port(target, port, timeout).await;
            if reply.is_clean() {
                trace!(%target, port, "ack probe answered");
                return true;
            }
        }
        false
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
