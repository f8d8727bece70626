use std::net::IpAddr;
use std::sync::Mutex;

use tokio::time::Instant;
use vitals_core::engine::{IcmpKind, SendEngine, TcpFlag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    Icmp(IcmpKind),
    Tcp(u16, TcpFlag),
}

#[derive(Debug, Clone, Copy)]
pub struct Call {
    pub at: Instant,
    pub target: IpAddr,
    pub probe: Enqueued,
}

/// Send engine that only remembers what it was asked to send, and when.
#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<Call>>,
}

impl RecordingEngine {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, target: IpAddr) -> Vec<Enqueued> {
        self.calls()
            .into_iter()
            .filter(|call| call.target == target)
            .map(|call| call.probe)
            .collect()
    }

    /// Time of the first enqueue seen for `target`.
    pub fn first_call(&self, target: IpAddr) -> Option<Instant> {
        self.calls()
            .into_iter()
            .filter(|call| call.target == target)
            .map(|call| call.at)
            .min()
    }

    fn record(&self, target: IpAddr, probe: Enqueued) {
        self.calls.lock().unwrap().push(Call {
            at: Instant::now(),
            target,
            probe,
        });
    }
}

impl SendEngine for RecordingEngine {
    fn enqueue_icmp(&self, target: IpAddr, kind: IcmpKind) {
        self.record(target, Enqueued::Icmp(kind));
    }

    fn enqueue_tcp(&self, target: IpAddr, port: u16, flag: TcpFlag) {
        self.record(target, Enqueued::Tcp(port, flag));
    }
}

pub fn privileged() -> bool {
    true
}

pub fn unprivileged() -> bool {
    false
}
