use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::{IcmpCodes, MutableEchoRequestPacket};
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes, MutableIcmpPacket};

pub const ECHO_REQ_LEN: usize = 8;
/// Header (4) + identifier (2) + sequence (2) + three 32 bit timestamps.
pub const TIMESTAMP_REQ_LEN: usize = 20;

const MS_PER_DAY: u128 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IcmpKind {
    EchoRequest,
    TimestampRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Echo,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpReply {
    pub kind: ReplyKind,
    pub identifier: u16,
}

impl IcmpKind {
    /// The reply that answers a request of this kind.
    pub fn expected_reply(self) -> ReplyKind {
        match self {
            IcmpKind::EchoRequest => ReplyKind::Echo,
            IcmpKind::TimestampRequest => ReplyKind::Timestamp,
        }
    }
}

pub fn create_request(kind: IcmpKind, identifier: u16, sequence: u16) -> anyhow::Result<Vec<u8>> {
    match kind {
        IcmpKind::EchoRequest => create_echo_request(identifier, sequence),
        IcmpKind::TimestampRequest => {
            create_timestamp_request(identifier, sequence, ms_since_midnight_utc())
        }
    }
}

pub fn create_echo_request(identifier: u16, sequence: u16) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ECHO_REQ_LEN];
    {
        let mut req = MutableEchoRequestPacket::new(&mut buffer)
            .context("creating echo request packet")?;
        req.set_icmp_type(IcmpTypes::EchoRequest);
        req.set_icmp_code(IcmpCodes::NoCode);
        req.set_identifier(identifier);
        req.set_sequence_number(sequence);
        req.set_checksum(pnet::util::checksum(req.packet(), 1));
    }
    Ok(buffer)
}

/// Builds an RFC 792 timestamp request carrying `originate_ms` (milliseconds since midnight UT).
pub fn create_timestamp_request(
    identifier: u16,
    sequence: u16,
    originate_ms: u32,
) -> anyhow::Result<Vec<u8>> {
    let mut body = [0u8; TIMESTAMP_REQ_LEN - 4];
    body[0..2].copy_from_slice(&identifier.to_be_bytes());
    body[2..4].copy_from_slice(&sequence.to_be_bytes());
    body[4..8].copy_from_slice(&originate_ms.to_be_bytes());

    let mut buffer: Vec<u8> = vec![0u8; TIMESTAMP_REQ_LEN];
    {
        let mut pkt = MutableIcmpPacket::new(&mut buffer).context("creating timestamp packet")?;
        pkt.set_icmp_type(IcmpTypes::Timestamp);
        pkt.set_icmp_code(IcmpCode(0));
        pkt.set_payload(&body);
        let csm = icmp::checksum(&pkt.to_immutable());
        pkt.set_checksum(csm);
    }
    Ok(buffer)
}

/// Recognises echo and timestamp replies; anything else is `None`.
pub fn parse_reply(bytes: &[u8]) -> Option<IcmpReply> {
    let packet = IcmpPacket::new(bytes)?;
    match packet.get_icmp_type() {
        IcmpTypes::EchoReply => {
            let reply = EchoReplyPacket::new(bytes)?;
            Some(IcmpReply {
                kind: ReplyKind::Echo,
                identifier: reply.get_identifier(),
            })
        }
        IcmpTypes::TimestampReply => {
            let id = bytes.get(4..6)?;
            Some(IcmpReply {
                kind: ReplyKind::Timestamp,
                identifier: u16::from_be_bytes([id[0], id[1]]),
            })
        }
        _ => None,
    }
}

pub fn ms_since_midnight_utc() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_millis() % MS_PER_DAY) as u32)
        .unwrap_or_default()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
