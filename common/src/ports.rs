//! Port sets for the SYN and ACK discovery probes.

use std::collections::BTreeSet;

use thiserror::Error;

pub type PortSet = BTreeSet<u16>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortParseError {
    #[error("invalid port '{0}'")]
    Invalid(String),
    #[error("port 0 is not probeable")]
    Zero,
    #[error("range '{0}' ends before it starts")]
    Reversed(String),
}

/// Parses a list such as `"22,80,8000-8010"` into a set of ports.
pub fn parse_ports(s: &str) -> Result<PortSet, PortParseError> {
    let mut ports = PortSet::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_port(start)?;
                let end = parse_port(end)?;
                if end < start {
                    return Err(PortParseError::Reversed(part.to_string()));
                }
                ports.extend(start..=end);
            }
            None => {
                ports.insert(parse_port(part)?);
            }
        }
    }

    Ok(ports)
}

fn parse_port(s: &str) -> Result<u16, PortParseError> {
    let s = s.trim();
    let port = s
        .parse::<u16>()
        .map_err(|_| PortParseError::Invalid(s.to_string()))?;
    if port == 0 {
        return Err(PortParseError::Zero);
    }
    Ok(port)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
