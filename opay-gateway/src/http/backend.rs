//! Transport backend trait.
//!
//! A backend executes one prepared request and reports either the raw
//! response or a [`TransportError`]. The client tries its backends in a fixed
//! order and stops at the first success.

use std::time::Duration;

use super::{HttpResponse, PreparedRequest};

/// Failure of a single backend attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not establish a connection.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Connecting or reading took longer than allowed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Socket level failure after connecting.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Server sent something that is not an HTTP response.
    #[error("malformed response: {0}")]
    Protocol(String),

    /// The backend cannot handle this request.
    #[error("unsupported request: {0}")]
    Unsupported(String),
}

impl TransportError {
    /// Classify an I/O error, turning timeouts into [`TransportError::Timeout`].
    pub fn from_io(err: std::io::Error, timeout: Duration) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => Self::Timeout(timeout),
            _ => Self::Io(err),
        }
    }
}

/// One way of executing HTTP requests.
pub trait TransportBackend: Send + Sync {
    /// Short name used in logs and responses.
    fn name(&self) -> &'static str;

    /// Whether the backend can speak TLS.
    fn supports_tls(&self) -> bool;

    /// Whether the backend can execute `request` at all.
    fn is_available(&self, request: &PreparedRequest) -> bool {
        !request.is_tls() || self.supports_tls()
    }

    /// Execute the request and return the raw response.
    fn execute(&self, request: &PreparedRequest) -> Result<HttpResponse, TransportError>;
}
