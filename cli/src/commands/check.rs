use std::sync::Arc;

use colored::*;
use vitals_common::network::target::Target;
use vitals_common::{info, warn};
use vitals_core::engine::net::NetProber;
use vitals_core::probe::{Checker, ProbeSettings};

use super::ProbeArgs;
use crate::terminal::print;

pub async fn check(target: Target, opts: &ProbeArgs, quiet: u8) -> anyhow::Result<()> {
    let config = opts.config().validate()?;
    let targets = target.into_collection();

    let icmp_enabled = config.icmp_enabled();
    let needs_raw = icmp_enabled || !opts.ack_ports.is_empty();
    if needs_raw && !is_root::is_root() {
        warn!("ICMP and ACK probes need raw sockets and will stay silent without root");
    }
    if config.no_probe {
        info!("--no-probe has no effect on per host checks");
    }

    let settings = Arc::new(
        ProbeSettings::new(config)
            .with_syn_ports(opts.syn_ports.clone())
            .with_ack_ports(opts.ack_ports.clone()),
    );
    let checker = Checker::new(settings, NetProber);

    print::header("host checks", quiet);
    let mut alive: usize = 0;
    for (idx, ip) in targets.iter().enumerate() {
        let icmp = if icmp_enabled {
            Some(checker.ping_probes(ip).await)
        } else {
            None
        };
        let syn = checker.syn_probes(ip).await;
        let ack = checker.ack_probes(ip).await;
        if answered(icmp, syn, ack) {
            alive += 1;
        }

        if quiet < 2 {
            let status: ColoredString = format!(
                "icmp {} syn {} ack {}",
                icmp_column(icmp),
                print::verdict(syn),
                print::verdict(ack)
            )
            .normal();
            print::host_line(idx, ip, status);
        }
    }

    if quiet == 0 {
        print::fat_separator();
    }
    info!("{alive} of {} hosts answered at least one probe family", targets.len());
    Ok(())
}

/// ICMP only counts when it was actually sent; with no ICMP probe enabled the
/// ICMP verdict is a default, not an answer.
fn answered(icmp: Option<bool>, syn: bool, ack: bool) -> bool {
    icmp.unwrap_or(false) || syn || ack
}

fn icmp_column(icmp: Option<bool>) -> ColoredString {
    match icmp {
        Some(verdict) => print::verdict(verdict),
        None => "n/a".bright_black(),
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
    fn silent_host_without_icmp_is_not_counted() {
        assert!(!answered(None, false, false));
    }

    #[test]
    fn enabled_icmp_counts_like_any_family() {
        assert!(answered(Some(true), false, false));
        assert!(!answered(Some(false), false, false));
        assert!(answered(None, true, false));
        assert!(answered(None, false, true));
    }

    #[test]
    fn icmp_column_marks_disabled_probes() {
        colored::control::set_override(false);
        assert_eq!(icmp_column(None).to_string(), "n/a");
        assert_eq!(icmp_column(Some(true)).to_string(), "alive");
        assert_eq!(icmp_column(Some(false)).to_string(), "silent");
    }
}
