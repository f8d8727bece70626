use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use vitals_common::config::ProbeConfig;
use vitals_common::network::range::{IpCollection, Ipv4Range};
use vitals_core::engine::{IcmpKind, Phase, TcpFlag};
use vitals_core::probe::{Orchestrator, ProbeOutcome, ProbeSettings, SkipReason};

use crate::fakes::{self, Enqueued, RecordingEngine};

const SYN_PORTS: [u16; 3] = [22, 80, 443];
const ACK_PORTS: [u16; 2] = [80, 8080];

fn settings(config: ProbeConfig) -> Arc<ProbeSettings> {
    Arc::new(
        ProbeSettings::new(config)
            .with_syn_ports(SYN_PORTS.into())
            .with_ack_ports(ACK_PORTS.into()),
    )
}

fn five_targets() -> IpCollection {
    let mut targets = IpCollection::new();
    targets.add_range(Ipv4Range::new(
        Ipv4Addr::new(10, 0, 0, 1),
        Ipv4Addr::new(10, 0, 0, 5),
    ));
    targets
}

fn orchestrator(
    config: ProbeConfig,
    engine: Arc<RecordingEngine>,
    privilege: fn() -> bool,
) -> Orchestrator {
    Orchestrator::new(settings(config), five_targets(), engine).with_privilege_check(privilege)
}

#[tokio::test(start_paused = true)]
async fn no_probe_skips_but_still_enters_probe_phase() {
    let engine = Arc::new(RecordingEngine::default());
    let config = ProbeConfig {
        no_probe: true,
        ..ProbeConfig::default()
    };
    let mut phase = Phase::Init;

    let outcome = orchestrator(config, engine.clone(), fakes::privileged)
        .probe_or_skip(&mut phase)
        .await;

    assert_eq!(outcome, ProbeOutcome::Skipped(SkipReason::Disabled));
    assert_eq!(phase, Phase::Probe);
    assert!(engine.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unprivileged_process_skips_silently() {
    let engine = Arc::new(RecordingEngine::default());
    let mut phase = Phase::Scan;

    let outcome = orchestrator(ProbeConfig::default(), engine.clone(), fakes::unprivileged)
        .probe_or_skip(&mut phase)
        .await;

    assert_eq!(outcome, ProbeOutcome::Skipped(SkipReason::Unprivileged));
    assert_eq!(phase, Phase::Probe);
    assert!(engine.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dispatch_starts_are_rate_limited_in_target_order() {
    let engine = Arc::new(RecordingEngine::default());
    let config = ProbeConfig {
        rate: 10,
        ..ProbeConfig::default()
    };
    let mut phase = Phase::Init;

    let outcome = orchestrator(config, engine.clone(), fakes::privileged)
        .probe_or_skip(&mut phase)
        .await;

    assert_eq!(outcome, ProbeOutcome::Dispatched(5));
    assert_eq!(phase, Phase::Probe);

    let targets: Vec<IpAddr> = five_targets().iter().collect();
    let starts: Vec<_> = targets
        .iter()
        .map(|ip| engine.first_call(*ip).expect("every target is dispatched"))
        .collect();

    for pair in starts.windows(2) {
        assert!(
            pair[1] - pair[0] >= Duration::from_millis(100),
            "dispatch starts only {:?} apart",
            pair[1] - pair[0]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn each_target_gets_every_probe_once() {
    let engine = Arc::new(RecordingEngine::default());
    let config = ProbeConfig {
        rate: 10,
        ..ProbeConfig::default()
    };

    orchestrator(config, engine.clone(), fakes::privileged)
        .probe_or_skip(&mut Phase::Init)
        .await;

    assert_eq!(engine.calls().len(), 5 * (2 + SYN_PORTS.len() + ACK_PORTS.len()));

    for target in five_targets().iter() {
        let mut probes = engine.calls_for(target);
        probes.sort_by_key(|probe| format!("{probe:?}"));

        let mut expected = vec![
            Enqueued::Icmp(IcmpKind::EchoRequest),
            Enqueued::Icmp(IcmpKind::TimestampRequest),
        ];
        expected.extend(SYN_PORTS.iter().map(|port| Enqueued::Tcp(*port, TcpFlag::Syn)));
        expected.extend(ACK_PORTS.iter().map(|port| Enqueued::Tcp(*port, TcpFlag::Ack)));
        expected.sort_by_key(|probe| format!("{probe:?}"));

        assert_eq!(probes, expected, "probes for {target}");
    }
}

#[tokio::test(start_paused = true)]
async fn empty_target_set_dispatches_nothing() {
    let engine = Arc::new(RecordingEngine::default());
    let mut phase = Phase::Init;

    let outcome = Orchestrator::new(
        settings(ProbeConfig::default()),
        IpCollection::new(),
        engine.clone(),
    )
    .with_privilege_check(fakes::privileged)
    .probe_or_skip(&mut phase)
    .await;

    assert_eq!(outcome, ProbeOutcome::Dispatched(0));
    assert_eq!(phase, Phase::Probe);
    assert!(engine.calls().is_empty());
}
