//! Layer 4 raw transport channels.
//!
//! Opening a channel requires raw socket privileges. Each handle owns the
//! sending half; received packets are pushed by a listener thread into an
//! unbounded queue until the handle's [`ListenerGuard`] is dropped.

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pnet::{
    packet::{Packet, ip::IpNextHeaderProtocols},
    transport::{
        self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
    },
};
use tokio::sync::mpsc;
use tracing::debug;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));
const CHANNEL_TYPE_TCP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Tcp));

#[derive(Debug, Clone, Copy)]
pub enum TransportType {
    IcmpLayer4,
    TcpLayer4,
}

/// Stops the listener thread when dropped.
#[derive(Debug, Default)]
pub struct ListenerGuard(Arc<AtomicBool>);

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

pub struct TransportHandle {
    pub tx: TransportSender,
    pub rx: mpsc::UnboundedReceiver<(Vec<u8>, IpAddr)>,
    pub guard: ListenerGuard,
}

macro_rules! spawn_listener {
    ($tx:expr, $rx:expr, $stop:expr, $iter_func:path) => {
        std::thread::spawn(move || {
            let mut iterator = $iter_func(&mut $rx);
            while !$stop.load(Ordering::Relaxed) {
                match iterator.next_with_timeout(POLL_INTERVAL) {
                    Ok(Some((packet, source_ip))) => {
                        if $tx.send((packet.packet().to_vec(), source_ip)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!("listener stopped: {e}");
                        break;
                    }
                }
            }
        })
    };
}

pub fn start_packet_capture(transport_type: TransportType) -> anyhow::Result<TransportHandle> {
    let (tx, mut rx_socket) = open_channel(transport_type)?;
    let (queue_tx, queue_rx) = mpsc::unbounded_channel();
    let guard = ListenerGuard::default();
    let stop = guard.0.clone();

    match transport_type {
        TransportType::IcmpLayer4 => {
            spawn_listener!(queue_tx, rx_socket, stop, pnet::transport::icmp_packet_iter)
        }
        TransportType::TcpLayer4 => {
            spawn_listener!(queue_tx, rx_socket, stop, pnet::transport::tcp_packet_iter)
        }
    };

    Ok(TransportHandle {
        tx,
        rx: queue_rx,
        guard,
    })
}

pub fn open_channel(
    transport_type: TransportType,
) -> anyhow::Result<(TransportSender, TransportReceiver)> {
    let channel_type: TransportChannelType = match transport_type {
        TransportType::IcmpLayer4 => CHANNEL_TYPE_ICMP,
        TransportType::TcpLayer4 => CHANNEL_TYPE_TCP,
    };
    let (tx, rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, channel_type)?;
    Ok((tx, rx))
}
