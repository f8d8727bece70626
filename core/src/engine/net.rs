//! Blocking, one-at-a-time probes used by the synchronous evaluators.

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use anyhow::{Context, ensure};
use async_trait::async_trait;
use pnet::packet::Packet;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::tcp::TcpPacket;
use pnet::transport::{icmp_packet_iter, tcp_packet_iter};
use tokio::net::TcpStream;
use tokio::task;
use tokio::time::timeout;
use tracing::{debug, warn};
use vitals_common::network::route;
use vitals_protocols::{icmp, tcp};

use super::{IcmpKind, Prober, Reply, TcpFlag};
use crate::error::{ProbeError, Stage};
use crate::network::transport::{self, TransportType};

/// [`Prober`] backed by the operating system's network stack.
///
/// ICMP pings and ACK probes open raw channels and need raw socket privileges;
/// `connect_port` is a regular TCP connect.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetProber;

#[async_trait]
impl Prober for NetProber {
    async fn ping_icmp_echo(&self, target: IpAddr, probe_timeout: Duration) -> bool {
        ping(target, IcmpKind::EchoRequest, probe_timeout).await
    }

    async fn ping_icmp_timestamp(&self, target: IpAddr, probe_timeout: Duration) -> bool {
        ping(target, IcmpKind::TimestampRequest, probe_timeout).await
    }

    async fn connect_port(&self, target: IpAddr, port: u16, probe_timeout: Duration) -> Reply {
        let socket_addr: SocketAddr = SocketAddr::new(target, port);

        match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_stream)) => Reply::answered(),
            Ok(Err(e)) => Reply::from_error(ProbeError::from_io(Stage::Dial, socket_addr, e)),
            Err(_elapsed) => Reply::from_error(ProbeError::Timeout),
        }
    }

    async fn ack_port(&self, target: IpAddr, port: u16, probe_timeout: Duration) -> Reply {
        match task::spawn_blocking(move || ack_blocking(target, port, probe_timeout)).await {
            Ok(Ok(true)) => Reply::answered(),
            Ok(Ok(false)) => Reply::from_error(ProbeError::Timeout),
            Ok(Err(e)) => Reply::from_error(e),
            Err(e) => Reply::from_error(ProbeError::Other(e.into())),
        }
    }
}

async fn ping(target: IpAddr, kind: IcmpKind, probe_timeout: Duration) -> bool {
    match task::spawn_blocking(move || ping_blocking(target, kind, probe_timeout)).await {
        Ok(Ok(answered)) => answered,
        Ok(Err(e)) => {
            debug!("{kind:?} to {target} failed: {e}");
            false
        }
        Err(e) => {
            warn!("{kind:?} task for {target} failed: {e}");
            false
        }
    }
}

/// Time left until `deadline`; `None` once it has passed.
///
/// Zero is treated as passed: a zero read timeout blocks forever on most platforms.
fn remaining(deadline: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| !left.is_zero())
}

fn ping_blocking(target: IpAddr, kind: IcmpKind, probe_timeout: Duration) -> anyhow::Result<bool> {
    ensure!(target.is_ipv4(), "ICMP probes are IPv4 only, skipping {target}");

    let (mut tx, mut rx) = transport::open_channel(TransportType::IcmpLayer4)?;
    let identifier: u16 = rand::random();
    let bytes = icmp::create_request(kind, identifier, 1)?;
    let pkt = IcmpPacket::new(&bytes).context("wrapping icmp request")?;
    tx.send_to(pkt, target)?;

    let deadline = Instant::now() + probe_timeout;
    let mut iterator = icmp_packet_iter(&mut rx);
    while let Some(left) = remaining(deadline) {
        match iterator.next_with_timeout(left)? {
            Some((packet, source)) if source == target => {
                let matches = icmp::parse_reply(packet.packet()).is_some_and(|reply| {
                    reply.identifier == identifier && reply.kind == kind.expected_reply()
                });
                if matches {
                    return Ok(true);
                }
            }
            Some(_) => {}
            None => break,
        }
    }
    Ok(false)
}

/// Sends a lone ACK and waits for the RST a live host answers it with.
fn ack_blocking(target: IpAddr, port: u16, probe_timeout: Duration) -> Result<bool, ProbeError> {
    let addr = SocketAddr::new(target, port);
    if target.is_ipv6() {
        return Err(anyhow::anyhow!("ACK probes are IPv4 only, skipping {target}").into());
    }

    let (mut tx, mut rx) = transport::open_channel(TransportType::TcpLayer4)?;
    let src = route::route_source_ip(target).map_err(|e| ProbeError::from_io(Stage::Dial, addr, e))?;
    let src_port: u16 = rand::random_range(50_000..u16::MAX);
    let bytes = tcp::create_probe(src, target, src_port, port, TcpFlag::Ack)?;
    let pkt = TcpPacket::new(&bytes).context("wrapping tcp probe")?;
    tx.send_to(pkt, target).map_err(ProbeError::from_os)?;

    let deadline = Instant::now() + probe_timeout;
    let mut iterator = tcp_packet_iter(&mut rx);
    while let Some(left) = remaining(deadline) {
        match iterator.next_with_timeout(left) {
            Ok(Some((segment, source)))
                if source == target
                    && segment.get_source() == port
                    && segment.get_destination() == src_port
                    && tcp::is_reset(&segment) =>
            {
                return Ok(true);
            }
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => return Err(ProbeError::from_io(Stage::Read, addr, e)),
        }
    }
    Ok(false)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
