use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use colored::*;
use tracing::debug;
use vitals_common::network::range::IpCollection;
use vitals_common::network::target::Target;
use vitals_common::success;
use vitals_core::engine::raw::RawEngine;
use vitals_core::engine::{IcmpKind, Phase, SendEngine, TcpFlag};
use vitals_core::probe::{Orchestrator, ProbeOutcome, ProbeSettings, SkipReason};

use super::ProbeArgs;
use crate::terminal::print;

/// Stands in for the raw engine when discovery is going to be skipped anyway.
struct Unopened;

impl SendEngine for Unopened {
    fn enqueue_icmp(&self, target: IpAddr, kind: IcmpKind) {
        debug!(%target, ?kind, "no raw engine, dropping icmp probe");
    }

    fn enqueue_tcp(&self, target: IpAddr, port: u16, flag: TcpFlag) {
        debug!(%target, port, ?flag, "no raw engine, dropping tcp probe");
    }
}

pub async fn probe(target: Target, opts: &ProbeArgs, quiet: u8) -> anyhow::Result<()> {
    let config = opts.config().validate()?;
    let targets: IpCollection = target.into_collection();

    let grace: Duration = config.timeout();
    let raw: Option<Arc<RawEngine>> = if !config.no_probe && is_root::is_root() {
        Some(Arc::new(RawEngine::start()?))
    } else {
        None
    };
    let engine: Arc<dyn SendEngine> = match &raw {
        Some(raw) => raw.clone(),
        None => Arc::new(Unopened),
    };

    let settings = Arc::new(
        ProbeSettings::new(config)
            .with_syn_ports(opts.syn_ports.clone())
            .with_ack_ports(opts.ack_ports.clone()),
    );

    let start_time: Instant = Instant::now();
    let mut phase = Phase::default();
    let orchestrator = Orchestrator::new(settings, targets.clone(), engine);
    let outcome = orchestrator.probe_or_skip(&mut phase).await;
    drop(orchestrator);

    match (outcome, raw) {
        (ProbeOutcome::Skipped(reason), _) => {
            let label: ColoredString = match reason {
                SkipReason::Disabled => "assumed".yellow(),
                SkipReason::Unprivileged => "assumed (unprivileged)".yellow(),
            };
            let hosts: Vec<IpAddr> = targets.iter().collect();
            report(&hosts, label, start_time.elapsed(), quiet);
        }
        (ProbeOutcome::Dispatched(count), Some(raw)) => {
            debug!(count, ?phase, "waiting {grace:?} for late answers");
            let raw = Arc::try_unwrap(raw)
                .map_err(|_| anyhow!("raw engine still shared after dispatch"))?;
            let hosts: Vec<IpAddr> = raw.finish(grace).await;
            report(&hosts, "alive".green().bold(), start_time.elapsed(), quiet);
        }
        (ProbeOutcome::Dispatched(_), None) => {
            return Err(anyhow!("probes were dispatched without a raw engine"));
        }
    }

    Ok(())
}

fn report(hosts: &[IpAddr], label: ColoredString, total_time: Duration, quiet: u8) {
    if hosts.is_empty() {
        print::header("zero hosts answered", quiet);
        print::no_results();
        return;
    }

    print::header("host discovery", quiet);
    if quiet < 2 {
        for (idx, ip) in hosts.iter().enumerate() {
            print::host_line(idx, *ip, label.clone());
        }
    }

    let active: ColoredString = format!("{} hosts", hosts.len()).bold().green();
    let elapsed: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    if quiet == 0 {
        print::fat_separator();
    }
    success!("Discovery complete: {active} in {elapsed}");
}
