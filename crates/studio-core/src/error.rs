//! Client errors

use thiserror::Error;

use crate::domain::ErrorBody;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Storage contents are corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// Everything a session client operation can fail with.
///
/// `OperationFailed` displays as the bare message so callers can show a
/// server-provided message as-is.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Authentication required")]
    NoSession,

    #[error("Authentication expired")]
    SessionExpired,

    #[error("Request rejected: {0}")]
    ValidationRejected(ErrorBody),

    /// Transport failure or timeout. Always displays as "Network error: "
    /// plus the transport cause; the prefix is the same text login and
    /// register put in their `detail`, and stays stable.
    #[error("Network error: {0}")]
    NetworkFailure(String),

    #[error("{0}")]
    OperationFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoSession,
    SessionExpired,
    ValidationRejected,
    NetworkFailure,
    OperationFailed,
    InvalidResponse,
    Storage,
    Configuration,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NoSession => ErrorKind::NoSession,
            ClientError::SessionExpired => ErrorKind::SessionExpired,
            ClientError::ValidationRejected(_) => ErrorKind::ValidationRejected,
            ClientError::NetworkFailure(_) => ErrorKind::NetworkFailure,
            ClientError::OperationFailed(_) => ErrorKind::OperationFailed,
            ClientError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            ClientError::Storage(_) => ErrorKind::Storage,
            ClientError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Errors after which the caller has to send the user back to login.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::NoSession | ClientError::SessionExpired)
    }
}
