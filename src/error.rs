//! Error types for Mira IPAM operations.
//!
//! Every failure surfaced by the client carries enough structure for a caller
//! to tell local input problems, transport failures, service-side rejections
//! and range exhaustion apart. Use [`IpamError::kind`] to branch on the class
//! of failure without matching on every variant.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IpamError>;

/// Custom error type for Mira IPAM operations.
#[derive(Debug, Error)]
pub enum IpamError {
    /// Malformed input detected locally. No network call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// The request never produced an HTTP response (DNS, connect, timeout, ...).
    #[error("connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("status: {code}, body: {body}")]
    Status { code: u16, body: String },

    /// The response arrived but does not have the expected shape or content.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The range has no free subnets left.
    #[error("mira api returned an empty subnet list for range {range} mask {mask}")]
    Exhaustion { range: String, mask: String },

    /// Lifecycle operation the allocator refuses to perform.
    #[error("{message}")]
    UnsupportedOperation {
        operation: &'static str,
        message: &'static str,
    },

    /// Client construction failed (missing credentials, bad endpoint, ...).
    #[error("configuration error: {0}")]
    Config(String),
}

/// Ways a successful HTTP exchange can still carry an unusable answer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("response body could not be parsed: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("mira api status was not 'OK', status: {0}")]
    NotOk(String),

    #[error("{value} is not a subnet, at position {index} of the free subnets payload")]
    InvalidCandidate { index: usize, value: String },
}

/// Coarse classification of an [`IpamError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Status,
    Protocol,
    Exhaustion,
    UnsupportedOperation,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Transport => "transport",
            ErrorKind::Status => "status",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Exhaustion => "exhaustion",
            ErrorKind::UnsupportedOperation => "unsupported_operation",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IpamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IpamError::Validation(_) => ErrorKind::Validation,
            IpamError::Connection(_) => ErrorKind::Transport,
            IpamError::Status { .. } => ErrorKind::Status,
            IpamError::Protocol(_) => ErrorKind::Protocol,
            IpamError::Exhaustion { .. } => ErrorKind::Exhaustion,
            IpamError::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            IpamError::Config(_) => ErrorKind::Configuration,
        }
    }
}

impl From<serde_json::Error> for IpamError {
    fn from(err: serde_json::Error) -> Self {
        IpamError::Protocol(ProtocolError::MalformedBody(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IpamError::Status {
            code: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "status: 503, body: maintenance");

        let err = IpamError::Exhaustion {
            range: "10.0.0.0".to_string(),
            mask: "255.255.255.224".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "mira api returned an empty subnet list for range 10.0.0.0 mask 255.255.255.224"
        );

        let err = IpamError::from(ProtocolError::InvalidCandidate {
            index: 1,
            value: "nope".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "protocol error: nope is not a subnet, at position 1 of the free subnets payload"
        );
    }

    #[test]
    fn test_kinds_are_distinct() {
        let not_ok = IpamError::from(ProtocolError::NotOk("FAIL".into()));
        assert_eq!(not_ok.kind(), ErrorKind::Protocol);

        let exhausted = IpamError::Exhaustion {
            range: "r".into(),
            mask: "m".into(),
        };
        assert_eq!(exhausted.kind(), ErrorKind::Exhaustion);

        assert_eq!(
            IpamError::Validation("x".into()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_json_errors_are_protocol_errors() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: IpamError = parse_err.into();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}
