use std::{fmt, io};
use thiserror::Error;

/// Why a single connection attempt did not produce a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The per-attempt timeout expired.
    Timeout,
    /// The remote end actively refused the connection.
    Refused,
    /// No route to the host or network.
    Unreachable,
    /// The race-wide cancellation fired while the attempt was pending.
    Cancelled,
    Other,
}

impl FailureKind {
    /// Maps an I/O error onto the kind of failure it represents.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut => FailureKind::Timeout,
            io::ErrorKind::ConnectionRefused => FailureKind::Refused,
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                FailureKind::Unreachable
            }
            _ => FailureKind::Other,
        }
    }

    /// Whether a worker that saw this failure should keep pulling addresses.
    ///
    /// Only cancellation ends a worker: the race has been decided, or the caller gave up.
    pub fn keeps_worker_going(self) -> bool {
        match self {
            FailureKind::Cancelled => false,
            FailureKind::Timeout
            | FailureKind::Refused
            | FailureKind::Unreachable
            | FailureKind::Other => true,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Timeout => "timed out",
            FailureKind::Refused => "connection refused",
            FailureKind::Unreachable => "unreachable",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Other => "failed",
        };
        f.write_str(name)
    }
}

/// A failed attempt against one address.
#[derive(Error, Debug)]
#[error("dial {address}: {kind}")]
pub struct AttemptError {
    pub address: String,
    pub kind: FailureKind,
    #[source]
    pub source: Option<io::Error>,
}

impl AttemptError {
    pub fn new(address: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            address: address.into(),
            kind,
            source: None,
        }
    }

    pub fn io(address: impl Into<String>, err: io::Error) -> Self {
        Self {
            address: address.into(),
            kind: FailureKind::from_io(&err),
            source: Some(err),
        }
    }
}

#[derive(Error, Debug)]
pub enum DialError {
    #[error("No addresses to dial.")]
    NoAddresses,
    #[error("The per-attempt timeout must be positive.")]
    InvalidTimeout,
    #[error("At least one parallel dial is required.")]
    InvalidParallelism,
    #[error("Cannot dial {addresses:?}")]
    Exhausted {
        addresses: Vec<String>,
        #[source]
        last: AttemptError,
    },
    #[error("Dialing {addresses:?} was cancelled.")]
    Cancelled {
        addresses: Vec<String>,
        /// The last real failure seen before the cancellation, if any.
        #[source]
        last: Option<AttemptError>,
    },
}

impl DialError {
    /// The failure kind behind the error, if it came out of a race.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            DialError::Exhausted { last, .. } => Some(last.kind),
            DialError::Cancelled { .. } => Some(FailureKind::Cancelled),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Neither addresses nor IP addresses with ports were given.")]
    NoTargets,
    #[error("Invalid port range: {0}")]
    InvalidPortRange(String),
    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),
}

#[cfg(test)]
mod tests {
    use super::{AttemptError, DialError, FailureKind};
    use std::io;

    #[test]
    fn classifies_io_errors() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        let timed_out = io::Error::from(io::ErrorKind::TimedOut);
        let unreachable = io::Error::from(io::ErrorKind::HostUnreachable);
        let other = io::Error::new(io::ErrorKind::InvalidInput, "bad address");

        assert_eq!(FailureKind::from_io(&refused), FailureKind::Refused);
        assert_eq!(FailureKind::from_io(&timed_out), FailureKind::Timeout);
        assert_eq!(FailureKind::from_io(&unreachable), FailureKind::Unreachable);
        assert_eq!(FailureKind::from_io(&other), FailureKind::Other);
    }

    #[test]
    fn only_cancellation_stops_a_worker() {
        assert!(!FailureKind::Cancelled.keeps_worker_going());
        assert!(FailureKind::Timeout.keeps_worker_going());
        assert!(FailureKind::Refused.keeps_worker_going());
        assert!(FailureKind::Unreachable.keeps_worker_going());
        assert!(FailureKind::Other.keeps_worker_going());
    }

    #[test]
    fn exhausted_error_keeps_the_cause() {
        let err = DialError::Exhausted {
            addresses: vec!["127.0.0.1:1".into(), "127.0.0.1:2".into()],
            last: AttemptError::io(
                "127.0.0.1:2",
                io::Error::from(io::ErrorKind::ConnectionRefused),
            ),
        };

        let message = err.to_string();
        assert!(message.contains("127.0.0.1:1"));
        assert!(message.contains("127.0.0.1:2"));
        assert_eq!(err.kind(), Some(FailureKind::Refused));

        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert_eq!(cause, "dial 127.0.0.1:2: connection refused");
    }
}
