pub mod check;
pub mod probe;

use clap::{Args, Parser, Subcommand};
use vitals_common::config::{DEFAULT_RATE, DEFAULT_TIMEOUT_MS, ProbeConfig};
use vitals_common::network::target::Target;
use vitals_common::ports::{PortSet, parse_ports};

#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Host discovery ahead of a port scan.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output (-q warnings only, -qq errors only)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue discovery probes for every target and list the hosts that answered
    #[command(alias = "p")]
    Probe {
        target: Target,
        #[command(flatten)]
        opts: ProbeArgs,
    },
    /// Probe each target one at a time and print a verdict per probe family
    #[command(alias = "c")]
    Check {
        target: Target,
        #[command(flatten)]
        opts: ProbeArgs,
    },
}

#[derive(Args, Clone)]
pub struct ProbeArgs {
    /// Send ICMP echo requests
    #[arg(short = 'e', long)]
    pub icmp_echo: bool,

    /// Send ICMP timestamp requests
    #[arg(short = 't', long)]
    pub icmp_timestamp: bool,

    /// Skip host discovery and treat every target as alive
    #[arg(short = 'n', long)]
    pub no_probe: bool,

    /// Ports for TCP SYN probes, e.g. 22,80,443 or 8000-8010
    #[arg(short = 's', long, value_parser = port_set, default_value = "")]
    pub syn_ports: PortSet,

    /// Ports for TCP ACK probes
    #[arg(short = 'a', long, value_parser = port_set, default_value = "")]
    pub ack_ports: PortSet,

    /// Dispatch starts per second
    #[arg(short = 'r', long, default_value_t = DEFAULT_RATE)]
    pub rate: u32,

    /// Per probe timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,
}

impl ProbeArgs {
    pub fn config(&self) -> ProbeConfig {
        ProbeConfig {
            icmp_echo_probe: self.icmp_echo,
            icmp_timestamp_probe: self.icmp_timestamp,
            no_probe: self.no_probe,
            rate: self.rate,
            timeout_ms: self.timeout,
        }
    }
}

fn port_set(s: &str) -> Result<PortSet, String> {
    parse_ports(s).map_err(|e| e.to_string())
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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

    fn parse(args: &[&str]) -> CommandLine {
        CommandLine::try_parse_from(args).unwrap()
    }

    #[test]
    fn probe_flags_build_config() {
        let cli = parse(&[
            "vitals", "probe", "10.0.0.0/30", "-e", "-t", "-r", "50", "--timeout", "250", "-s",
            "22,80", "-a", "443",
        ]);

        let Commands::Probe { opts, .. } = cli.command else {
            panic!("expected probe subcommand");
        };
        let config = opts.config();

        assert!(config.icmp_echo_probe);
        assert!(config.icmp_timestamp_probe);
        assert!(!config.no_probe);
        assert_eq!(config.rate, 50);
        assert_eq!(config.timeout_ms, 250);
        assert_eq!(opts.syn_ports, PortSet::from([22, 80]));
        assert_eq!(opts.ack_ports, PortSet::from([443]));
    }

    #[test]
    fn defaults_match_config_defaults() {
        let cli = parse(&["vitals", "check", "192.168.1.1"]);

        let Commands::Check { opts, .. } = cli.command else {
            panic!("expected check subcommand");
        };

        assert_eq!(opts.config(), ProbeConfig::default());
        assert!(opts.syn_ports.is_empty());
        assert!(opts.ack_ports.is_empty());
    }

    #[test]
    fn verbosity_is_counted_anywhere() {
        let cli = parse(&["vitals", "-vv", "probe", "10.0.0.1", "-q"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.quiet, 1);
    }

    #[test]
    fn bad_ports_are_rejected() {
        assert!(CommandLine::try_parse_from(["vitals", "probe", "10.0.0.1", "-s", "0"]).is_err());
        assert!(CommandLine::try_parse_from(["vitals", "probe", "10.0.0.1", "-a", "90-80"]).is_err());
    }
}
