use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use tokio::net::TcpListener;
use vitals_common::config::ProbeConfig;
use vitals_common::ports::PortSet;
use vitals_core::engine::net::NetProber;
use vitals_core::probe::{Checker, ProbeSettings};

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn checker(syn_ports: PortSet) -> Checker<NetProber> {
    let config = ProbeConfig {
        timeout_ms: 500,
        ..ProbeConfig::default()
    };
    Checker::new(
        Arc::new(ProbeSettings::new(config).with_syn_ports(syn_ports)),
        NetProber,
    )
}

async fn closed_port() -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn listening_port_marks_host_alive() {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    assert!(checker(PortSet::from([port])).syn_probes(LOCALHOST).await);
}

#[tokio::test]
async fn refused_dial_is_not_evidence() {
    let port = closed_port().await;

    assert!(!checker(PortSet::from([port])).syn_probes(LOCALHOST).await);
}

#[tokio::test]
async fn open_port_after_closed_one_still_counts() {
    let closed = closed_port().await;
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let open = listener.local_addr().unwrap().port();

    assert!(checker(PortSet::from([closed, open])).syn_probes(LOCALHOST).await);
}

#[tokio::test]
async fn no_syn_ports_means_not_alive() {
    assert!(!checker(PortSet::new()).syn_probes(LOCALHOST).await);
}

#[tokio::test]
async fn icmp_verdict_without_probes_is_alive() {
    assert!(checker(PortSet::new()).ping_probes(LOCALHOST).await);
}
