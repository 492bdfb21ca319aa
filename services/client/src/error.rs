//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use novel_reader_core::envelope::EnvelopeError;
use novel_reader_core::ports::PortError;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response reached the client (offline, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The session could not be recovered; the reader has to log in again.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The backend answered with a payload of an unexpected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request was refused locally before reaching the backend.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core ports.
    #[error("Service Port Error: {0}")]
    Port(PortError),

    /// Represents a standard Input/Output error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Authentication(_) => Some(401),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ClientError::Authentication(_))
    }
}

impl From<PortError> for ClientError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Network(message) => ClientError::Network(message),
            PortError::Unauthorized => ClientError::Authentication("Unauthorized".to_string()),
            other => ClientError::Port(other),
        }
    }
}

impl From<EnvelopeError> for ClientError {
    fn from(error: EnvelopeError) -> Self {
        match error {
            // `success: false` arrives with a 2xx status, so there is no better code to report.
            EnvelopeError::Rejected(message) => ClientError::Http {
                status: 200,
                message,
            },
            EnvelopeError::Malformed(message) => ClientError::InvalidResponse(message),
        }
    }
}

/// Maps client errors back onto the port vocabulary the core stores understand.
impl From<ClientError> for PortError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Network(message) => PortError::Network(message),
            ClientError::Authentication(_) => PortError::Unauthorized,
            ClientError::Http { status: 404, message } => PortError::NotFound(message),
            ClientError::Port(inner) => inner,
            other => PortError::Unexpected(other.to_string()),
        }
    }
}

/// A convenience type alias for `Result<T, ClientError>`.
pub type ClientResult<T> = Result<T, ClientError>;
