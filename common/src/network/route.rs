use std::io;
use std::net::{IpAddr, UdpSocket};

/// Returns the local address the kernel would use to reach `target`.
///
/// Connecting a UDP socket only consults the routing table, nothing is sent.
pub fn route_source_ip(target: IpAddr) -> io::Result<IpAddr> {
    let bind_addr = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind_addr)?;
    socket.connect((target, 53))?;
    Ok(socket.local_addr()?.ip())
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

    #[test]
    fn route_source_ip_localhost() {
        let target = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let result = route_source_ip(target);
        assert!(result.is_ok(), "Should be able to resolve route to localhost");
        assert_eq!(result.unwrap(), target);
    }
}
