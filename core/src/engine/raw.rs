//! Batch send engine over raw IPv4 transport channels.
//!
//! Requests are queued without blocking and drained by a single sender thread.
//! Listener threads feed every ICMP and TCP packet back to a collector task,
//! which marks a probed host alive when it answers one of our probes.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::tcp::TcpPacket;
use pnet::transport::TransportSender;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task;
use tracing::{debug, warn};
use vitals_common::network::route;
use vitals_protocols::{icmp, tcp};

use super::{IcmpKind, SendEngine, TcpFlag};
use crate::network::transport::{self, ListenerGuard, TransportHandle, TransportType};

type HostSet = Arc<Mutex<HashSet<IpAddr>>>;
type PacketQueue = UnboundedReceiver<(Vec<u8>, IpAddr)>;

#[derive(Debug, Clone, Copy)]
enum Request {
    Icmp { target: IpAddr, kind: IcmpKind },
    Tcp { target: IpAddr, port: u16, flag: TcpFlag },
}

impl Request {
    fn target(&self) -> IpAddr {
        match *self {
            Request::Icmp { target, .. } | Request::Tcp { target, .. } => target,
        }
    }
}

pub struct RawEngine {
    queue: UnboundedSender<Request>,
    alive: HostSet,
    worker: thread::JoinHandle<()>,
    collector: task::JoinHandle<()>,
    guards: [ListenerGuard; 2],
}

impl RawEngine {
    /// Opens the raw channels and starts the sender, listeners and collector.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start() -> anyhow::Result<Self> {
        let TransportHandle {
            tx: icmp_tx,
            rx: icmp_rx,
            guard: icmp_guard,
        } = transport::start_packet_capture(TransportType::IcmpLayer4)
            .context("opening raw ICMP channel")?;
        let TransportHandle {
            tx: tcp_tx,
            rx: tcp_rx,
            guard: tcp_guard,
        } = transport::start_packet_capture(TransportType::TcpLayer4)
            .context("opening raw TCP channel")?;

        let identifier: u16 = rand::random();
        let src_port: u16 = rand::random_range(50_000..u16::MAX);
        let probed: HostSet = Arc::default();
        let alive: HostSet = Arc::default();

        let (queue, queue_rx) = mpsc::unbounded_channel();
        let worker = Worker {
            icmp_tx,
            tcp_tx,
            identifier,
            src_port,
            sequence: 0,
            sources: HashMap::new(),
            probed: probed.clone(),
        };
        let worker = thread::spawn(move || worker.run(queue_rx));

        let collector = tokio::spawn(collect(
            icmp_rx,
            tcp_rx,
            Matcher {
                identifier,
                src_port,
            },
            probed,
            alive.clone(),
        ));

        debug!(identifier, src_port, "raw engine started");

        Ok(Self {
            queue,
            alive,
            worker,
            collector,
            guards: [icmp_guard, tcp_guard],
        })
    }

    /// Flushes the queue, waits `grace` for late answers and returns the hosts that answered.
    pub async fn finish(self, grace: Duration) -> Vec<IpAddr> {
        let RawEngine {
            queue,
            alive,
            worker,
            collector,
            guards,
        } = self;

        drop(queue);
        match task::spawn_blocking(move || worker.join()).await {
            Ok(Ok(())) => {}
            _ => warn!("send worker terminated abnormally"),
        }

        tokio::time::sleep(grace).await;
        drop(guards);
        if let Err(e) = collector.await {
            warn!("response collector failed: {e}");
        }

        let mut hosts: Vec<IpAddr> = lock(&alive).iter().copied().collect();
        hosts.sort();
        hosts
    }

    fn push(&self, request: Request) {
        if self.queue.send(request).is_err() {
            debug!("send queue closed, dropping probe for {}", request.target());
        }
    }
}

impl SendEngine for RawEngine {
    fn enqueue_icmp(&self, target: IpAddr, kind: IcmpKind) {
        self.push(Request::Icmp { target, kind });
    }

    fn enqueue_tcp(&self, target: IpAddr, port: u16, flag: TcpFlag) {
        self.push(Request::Tcp { target, port, flag });
    }
}

struct Worker {
    icmp_tx: TransportSender,
    tcp_tx: TransportSender,
    identifier: u16,
    src_port: u16,
    sequence: u16,
    sources: HashMap<IpAddr, IpAddr>,
    probed: HostSet,
}

impl Worker {
    fn run(mut self, mut queue: UnboundedReceiver<Request>) {
        while let Some(request) = queue.blocking_recv() {
            if let Err(e) = self.send(request) {
                debug!("dropping {request:?}: {e}");
            }
        }
    }

    fn send(&mut self, request: Request) -> anyhow::Result<()> {
        let target = request.target();
        if target.is_ipv6() {
            warn!("{target} skipped, raw probes are IPv4 only");
            return Ok(());
        }
        lock(&self.probed).insert(target);

        match request {
            Request::Icmp { target, kind } => {
                self.sequence = self.sequence.wrapping_add(1);
                let bytes = icmp::create_request(kind, self.identifier, self.sequence)?;
                let pkt = IcmpPacket::new(&bytes).context("wrapping icmp request")?;
                self.icmp_tx.send_to(pkt, target)?;
            }
            Request::Tcp { target, port, flag } => {
                let src = self.source_for(target)?;
                let bytes = tcp::create_probe(src, target, self.src_port, port, flag)?;
                let pkt = TcpPacket::new(&bytes).context("wrapping tcp probe")?;
                self.tcp_tx.send_to(pkt, target)?;
            }
        }
        Ok(())
    }

    fn source_for(&mut self, target: IpAddr) -> anyhow::Result<IpAddr> {
        if let Some(src) = self.sources.get(&target) {
            return Ok(*src);
        }
        let src = route::route_source_ip(target).with_context(|| format!("no route to {target}"))?;
        self.sources.insert(target, src);
        Ok(src)
    }
}

#[derive(Debug, Clone, Copy)]
struct Matcher {
    identifier: u16,
    src_port: u16,
}

impl Matcher {
    fn icmp(&self, bytes: &[u8]) -> bool {
        icmp::parse_reply(bytes).is_some_and(|reply| reply.identifier == self.identifier)
    }

    fn tcp(&self, bytes: &[u8]) -> bool {
        tcp::is_probe_response(bytes, self.src_port)
    }
}

async fn collect(
    mut icmp_rx: PacketQueue,
    mut tcp_rx: PacketQueue,
    matcher: Matcher,
    probed: HostSet,
    alive: HostSet,
) {
    loop {
        let (answered, source) = tokio::select! {
            Some((bytes, source)) = icmp_rx.recv() => (matcher.icmp(&bytes), source),
            Some((bytes, source)) = tcp_rx.recv() => (matcher.tcp(&bytes), source),
            else => break,
        };

        if answered && lock(&probed).contains(&source) && lock(&alive).insert(source) {
            debug!("{source} answered a discovery probe");
        }
    }
}

fn lock(set: &HostSet) -> MutexGuard<'_, HashSet<IpAddr>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
