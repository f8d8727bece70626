//! Probe options, loaded once before orchestration and never mutated afterwards.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_RATE: u32 = 1000;
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rate must be a positive number of requests per second")]
    ZeroRate,
    #[error("timeout must be a positive number of milliseconds")]
    ZeroTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Send an ICMP echo request to every target.
    pub icmp_echo_probe: bool,
    /// Send an ICMP timestamp request to every target.
    pub icmp_timestamp_probe: bool,
    /// Skip host discovery entirely; every target is assumed alive.
    pub no_probe: bool,
    /// Dispatch starts per second.
    pub rate: u32,
    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            icmp_echo_probe: false,
            icmp_timestamp_probe: false,
            no_probe: false,
            rate: DEFAULT_RATE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ProbeConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.rate == 0 {
            return Err(ConfigError::ZeroRate);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Minimum spacing between two dispatch starts.
    pub fn rate_interval(&self) -> Duration {
        Duration::from_secs(1) / self.rate.max(1)
    }

    /// Whether any ICMP probe is turned on.
    pub fn icmp_enabled(&self) -> bool {
        self.icmp_echo_probe || self.icmp_timestamp_probe
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
