//! Shared error type across amqgate crates.

use thiserror::Error;

/// Stable error kinds surfaced to operators and management tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or inconsistent configuration.
    Config,
    /// Rule provider unreachable or returned garbage.
    Provider,
    /// Refused by local policy.
    Denied,
    /// Socket / filesystem I/O.
    Io,
    /// Internal invariant violated.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs and JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG",
            ErrorKind::Provider => "PROVIDER",
            ErrorKind::Denied => "DENIED",
            ErrorKind::Io => "IO",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, AmqGateError>;

/// Unified error type used by core and router.
#[derive(Debug, Error)]
pub enum AmqGateError {
    #[error("config: {0}")]
    Config(String),
    #[error("rule provider: {0}")]
    Provider(String),
    #[error("denied: {0}")]
    Denied(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl AmqGateError {
    /// Map an error to its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AmqGateError::Config(_) => ErrorKind::Config,
            AmqGateError::Provider(_) => ErrorKind::Provider,
            AmqGateError::Denied(_) => ErrorKind::Denied,
            AmqGateError::Io(_) => ErrorKind::Io,
            AmqGateError::Internal(_) => ErrorKind::Internal,
        }
    }
}
