use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Where in a connection attempt an error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Resolving or establishing the connection.
    Dial,
    /// Reading from a connection the peer already acknowledged.
    Read,
}

/// The shape of a [`ProbeError`], used to decide what the error tells us about the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Dial,
    Read,
    Refused,
    Other,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,
    #[error("dial {addr}: {source}")]
    Dial { addr: SocketAddr, source: io::Error },
    #[error("read {addr}: {source}")]
    Read { addr: SocketAddr, source: io::Error },
    #[error("os error {0}")]
    Os(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProbeError {
    /// Tags an I/O error returned by a network call made during `stage`.
    ///
    /// Timeouts are recognised first; everything else, refusals included, stays
    /// attributed to the stage it happened in.
    pub fn from_io(stage: Stage, addr: SocketAddr, source: io::Error) -> Self {
        if matches!(source.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) {
            return ProbeError::Timeout;
        }
        match stage {
            Stage::Dial => ProbeError::Dial { addr, source },
            Stage::Read => ProbeError::Read { addr, source },
        }
    }

    /// Keeps the bare OS code of an error raised outside any connection stage.
    pub fn from_os(source: io::Error) -> Self {
        match source.raw_os_error() {
            Some(code) => ProbeError::Os(code),
            None => ProbeError::Other(source.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::Timeout => ErrorKind::Timeout,
            ProbeError::Dial { .. } => ErrorKind::Dial,
            ProbeError::Read { .. } => ErrorKind::Read,
            ProbeError::Os(code) if is_refused_code(*code) => ErrorKind::Refused,
            ProbeError::Os(_) | ProbeError::Other(_) => ErrorKind::Other,
        }
    }
}

fn is_refused_code(code: i32) -> bool {
    io::Error::from_raw_os_error(code).kind() == io::ErrorKind::ConnectionRefused
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
