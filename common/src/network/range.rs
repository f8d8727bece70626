use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn to_iter(&self) -> impl Iterator<Item = IpAddr> + use<> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip)))
    }

    pub fn len(&self) -> usize {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        end.checked_sub(start).map_or(0, |diff| diff as usize + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = pnet::ipnetwork::Ipv4Network::new(ip, prefix)?;
    let start = network.network();
    let end = network.broadcast();

    Ok(Ipv4Range::new(start, end))
}

/// The target set handed to the prober. Singles are kept sorted so iteration
/// (and therefore dispatch order) is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpCollection {
    pub singles: BTreeSet<IpAddr>,
    pub ranges: Vec<Ipv4Range>,
}

impl IpCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_single(&mut self, ip: IpAddr) {
        self.singles.insert(ip);
    }

    pub fn add_range(&mut self, range: Ipv4Range) {
        self.ranges.push(range);
    }

    pub fn len(&self) -> usize {
        self.singles.len() + self.ranges.iter().map(Ipv4Range::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.singles
            .iter()
            .copied()
            .chain(self.ranges.iter().flat_map(Ipv4Range::to_iter))
    }
}

impl IntoIterator for IpCollection {
    type Item = IpAddr;
    type IntoIter = Box<dyn Iterator<Item = IpAddr>>;

    fn into_iter(self) -> Self::IntoIter {
        let ranges = self.ranges;
        Box::new(
            self.singles
                .into_iter()
                .chain(ranges.into_iter().flat_map(|range| range.to_iter())),
        )
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_range_spans_network_to_broadcast() {
        let range = cidr_range(Ipv4Addr::new(10, 0, 0, 77), 30).unwrap();
        assert_eq!(range.start_addr, Ipv4Addr::new(10, 0, 0, 76));
        assert_eq!(range.end_addr, Ipv4Addr::new(10, 0, 0, 79));
        assert_eq!(range.len(), 4);
    }

    #[test]
    fn reversed_range_is_empty() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 9), Ipv4Addr::new(10, 0, 0, 1));
        assert!(range.is_empty());
        assert_eq!(range.to_iter().count(), 0);
    }

    #[test]
    fn collection_iterates_singles_then_ranges() {
        let mut collection = IpCollection::new();
        collection.add_range(Ipv4Range::new(
            Ipv4Addr::new(192, 168, 0, 1),
            Ipv4Addr::new(192, 168, 0, 2),
        ));
        collection.add_single(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));

        let ips: Vec<IpAddr> = collection.iter().collect();
        assert_eq!(collection.len(), 3);
        assert_eq!(ips[0], IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(ips[2], IpAddr::V4(Ipv4Addr::new(192, 168, 0, 2)));
        assert_eq!(collection.into_iter().count(), 3);
    }
}
