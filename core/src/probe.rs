//! # Host Discovery Probes
//!
//! Decides, or schedules the decision of, whether each target is reachable
//! before it gets port scanned.
//!
//! Two independent paths share the same [`ProbeSettings`]:
//! * [`Checker`]: blocking probe-and-decide for a single host, answering with a verdict.
//! * [`Orchestrator`]: fans the asynchronous [`Dispatcher`] out over the whole target
//!   set at a fixed rate. Answers are collected by the send engine, not here.

use vitals_common::config::ProbeConfig;
use vitals_common::ports::PortSet;

mod check;
mod dispatch;
mod limiter;
mod orchestrator;
mod refusal;

pub use check::Checker;
pub use dispatch::Dispatcher;
pub use limiter::RateLimiter;
pub use orchestrator::{Orchestrator, ProbeOutcome, SkipReason};
pub use refusal::{has_refused_connection, is_refusal};

/// Read-only inputs shared by every probe path.
#[derive(Debug, Clone, Default)]
pub struct ProbeSettings {
    pub config: ProbeConfig,
    pub syn_ports: PortSet,
    pub ack_ports: PortSet,
}

impl ProbeSettings {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_syn_ports(mut self, ports: PortSet) -> Self {
        self.syn_ports = ports;
        self
    }

    pub fn with_ack_ports(mut self, ports: PortSet) -> Self {
        self.ack_ports = ports;
        self
    }
}
