//! Target argument parsing.
//!
//! Accepts `10.0.0.5`, `fe80::1`, `10.0.0.1-40`, `10.0.0.1-10.0.1.9`,
//! `10.0.0.0/24`, or any comma separated mix of those. Ranges and CIDR
//! blocks are IPv4 only.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use thiserror::Error;

use crate::network::range::{self, IpCollection, Ipv4Range};
use crate::{success, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("no target given")]
    Empty,
    #[error("'{0}' is not an address, range or CIDR block")]
    Unrecognised(String),
    #[error("bad range end in '{0}'")]
    RangeEnd(String),
    #[error("range '{0}' ends before it starts")]
    Reversed(String),
    #[error("bad CIDR block '{0}'")]
    Cidr(String),
}

/// Every address named on the command line, already expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    addrs: IpCollection,
}

impl Target {
    /// Number of IPv6 hosts; only connect based probes can reach them.
    pub fn ipv6_hosts(&self) -> usize {
        self.addrs.singles.iter().filter(|ip| ip.is_ipv6()).count()
    }

    pub fn into_collection(self) -> IpCollection {
        let v6 = self.ipv6_hosts();
        if v6 > 0 {
            warn!("{v6} IPv6 target(s): raw ICMP and ACK probes skip them");
        }
        success!("{} address(es) to probe", self.addrs.len());
        self.addrs
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut addrs = IpCollection::new();

        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            match parse_item(item)? {
                Item::Host(ip) => addrs.add_single(ip),
                Item::Block(block) => addrs.add_range(block),
            }
        }

        if addrs.is_empty() {
            return Err(TargetError::Empty);
        }
        Ok(Target { addrs })
    }
}

enum Item {
    Host(IpAddr),
    Block(Ipv4Range),
}

fn parse_item(item: &str) -> Result<Item, TargetError> {
    if let Ok(ip) = item.parse::<IpAddr>() {
        return Ok(Item::Host(ip));
    }

    if let Some((base, prefix)) = item.split_once('/') {
        let cidr_err = || TargetError::Cidr(item.to_string());
        let base: Ipv4Addr = base.parse().map_err(|_| cidr_err())?;
        let prefix: u8 = prefix.parse().map_err(|_| cidr_err())?;
        return range::cidr_range(base, prefix)
            .map(Item::Block)
            .map_err(|_| cidr_err());
    }

    if let Some((start, end)) = item.split_once('-') {
        let start: Ipv4Addr = start
            .parse()
            .map_err(|_| TargetError::Unrecognised(item.to_string()))?;
        let end = range_end(start, end).ok_or_else(|| TargetError::RangeEnd(item.to_string()))?;
        if end < start {
            return Err(TargetError::Reversed(item.to_string()));
        }
        return Ok(Item::Block(Ipv4Range::new(start, end)));
    }

    Err(TargetError::Unrecognised(item.to_string()))
}

/// A full address, or trailing octets that replace the tail of `start`.
fn range_end(start: Ipv4Addr, end: &str) -> Option<Ipv4Addr> {
    if let Ok(full) = end.parse::<Ipv4Addr>() {
        return Some(full);
    }

    let tail: Vec<u8> = end
        .split('.')
        .map(str::parse::<u8>)
        .collect::<Result<_, _>>()
        .ok()?;
    if tail.len() > 3 {
        return None;
    }

    let mut octets = start.octets();
    octets[4 - tail.len()..].copy_from_slice(&tail);
    Some(Ipv4Addr::from(octets))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
