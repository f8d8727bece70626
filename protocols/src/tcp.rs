use std::net::IpAddr;

use anyhow::{Context, bail};
use pnet::packet::tcp::{self, MutableTcpPacket, TcpFlags, TcpPacket};

pub const TCP_HDR_LEN: usize = 20;
const WINDOW_SIZE: u16 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TcpFlag {
    Syn,
    Ack,
}

/// A bare TCP header with a single control flag set.
///
/// The checksum covers the pseudo header, so `src` and `dst` must be the
/// addresses the kernel will put on the wire.
pub fn create_probe(
    src: IpAddr,
    dst: IpAddr,
    src_port: u16,
    dst_port: u16,
    flag: TcpFlag,
) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; TCP_HDR_LEN];
    {
        let mut pkt = MutableTcpPacket::new(&mut buffer).context("creating tcp packet")?;
        pkt.set_source(src_port);
        pkt.set_destination(dst_port);
        pkt.set_sequence(rand::random());
        pkt.set_data_offset(5);
        pkt.set_window(WINDOW_SIZE);
        match flag {
            TcpFlag::Syn => {
                pkt.set_acknowledgement(0);
                pkt.set_flags(TcpFlags::SYN);
            }
            TcpFlag::Ack => {
                pkt.set_acknowledgement(rand::random());
                pkt.set_flags(TcpFlags::ACK);
            }
        }

        let csm = match (src, dst) {
            (IpAddr::V4(src), IpAddr::V4(dst)) => tcp::ipv4_checksum(&pkt.to_immutable(), &src, &dst),
            (IpAddr::V6(src), IpAddr::V6(dst)) => tcp::ipv6_checksum(&pkt.to_immutable(), &src, &dst),
            _ => bail!("address family mismatch between {src} and {dst}"),
        };
        pkt.set_checksum(csm);
    }
    Ok(buffer)
}

/// True for a segment that answers one of our probes: addressed to `src_port`
/// and carrying SYN-ACK or RST.
pub fn is_probe_response(bytes: &[u8], src_port: u16) -> bool {
    let Some(pkt) = TcpPacket::new(bytes) else {
        return false;
    };
    if pkt.get_destination() != src_port {
        return false;
    }
    let flags = pkt.get_flags();
    let syn_ack = flags & TcpFlags::SYN != 0 && flags & TcpFlags::ACK != 0;
    syn_ack || is_reset(&pkt)
}

pub fn is_reset(pkt: &TcpPacket) -> bool {
    pkt.get_flags() & TcpFlags::RST != 0
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const SRC: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const DST: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn syn_probe_sets_only_syn() {
        let bytes = create_probe(SRC, DST, 40000, 443, TcpFlag::Syn).unwrap();
        let pkt = TcpPacket::new(&bytes).unwrap();
        assert_eq!(pkt.get_source(), 40000);
        assert_eq!(pkt.get_destination(), 443);
        assert_eq!(pkt.get_flags(), TcpFlags::SYN);
        assert_eq!(pkt.get_data_offset(), 5);
    }

    #[test]
    fn ack_probe_checksum_matches_pseudo_header() {
        let bytes = create_probe(SRC, DST, 40000, 80, TcpFlag::Ack).unwrap();
        let pkt = TcpPacket::new(&bytes).unwrap();
        assert_eq!(pkt.get_flags(), TcpFlags::ACK);
        let (IpAddr::V4(src), IpAddr::V4(dst)) = (SRC, DST) else {
            unreachable!()
        };
        assert_eq!(pkt.get_checksum(), tcp::ipv4_checksum(&pkt, &src, &dst));
    }

    #[test]
    fn mixed_families_are_rejected() {
        let v6: IpAddr = "::1".parse().unwrap();
        assert!(create_probe(SRC, v6, 1, 2, TcpFlag::Syn).is_err());
    }

    #[test]
    fn probe_response_requires_our_port_and_answer_flags() {
        let mut rst = create_probe(DST, SRC, 443, 40000, TcpFlag::Syn).unwrap();
        {
            let mut pkt = MutableTcpPacket::new(&mut rst).unwrap();
            pkt.set_flags(TcpFlags::RST);
        }
        assert!(is_probe_response(&rst, 40000));
        assert!(!is_probe_response(&rst, 40001));

        let syn = create_probe(DST, SRC, 443, 40000, TcpFlag::Syn).unwrap();
        assert!(!is_probe_response(&syn, 40000));
    }
}
