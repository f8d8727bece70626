use crate::error::{ErrorKind, ProbeError};

/// Whether a failed connect still proves the host is up.
///
/// A reset after the connect step or a bare OS refusal code counts as a live
/// host. Anything that failed while dialing does not.
pub fn has_refused_connection(err: Option<&ProbeError>) -> bool {
    err.map(ProbeError::kind).is_some_and(is_refusal)
}

pub fn is_refusal(kind: ErrorKind) -> bool {
    match kind {
        // Down, filtered and congested all look the same.
        ErrorKind::Timeout => false,
        ErrorKind::Dial => false,
        // Reset after the connect step completed.
        ErrorKind::Read => true,
        ErrorKind::Refused => true,
        ErrorKind::Other => false,
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
    use crate::error::tests::{addr, refused_code};
    use std::io;

    #[test]
    fn no_error_is_not_a_refusal() {
        assert!(!has_refused_connection(None));
    }

    #[test]
    fn timeout_is_not_a_refusal() {
        assert!(!has_refused_connection(Some(&ProbeError::Timeout)));
    }

    #[test]
    fn dial_stage_error_is_not_a_refusal() {
        let err = ProbeError::Dial {
            addr: addr(),
            source: io::Error::from(io::ErrorKind::HostUnreachable),
        };
        assert!(!has_refused_connection(Some(&err)));
    }

    #[test]
    fn dial_stage_refusal_is_not_a_refusal() {
        let err = ProbeError::Dial {
            addr: addr(),
            source: io::Error::from_raw_os_error(refused_code()),
        };
        assert!(!has_refused_connection(Some(&err)));
    }

    #[test]
    fn read_stage_reset_is_a_refusal() {
        let err = ProbeError::Read {
            addr: addr(),
            source: io::Error::from(io::ErrorKind::ConnectionReset),
        };
        assert!(has_refused_connection(Some(&err)));
    }

    #[test]
    fn refused_os_code_is_a_refusal() {
        assert!(has_refused_connection(Some(&ProbeError::Os(refused_code()))));
    }

    #[test]
    fn unknown_errors_are_not_refusals() {
        let other = ProbeError::Other(anyhow::anyhow!("unexpected"));
        assert!(!has_refused_connection(Some(&other)));
        assert!(!has_refused_connection(Some(&ProbeError::Os(refused_code() + 1))));
    }
}
