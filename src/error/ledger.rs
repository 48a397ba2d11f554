use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors returned by a [`LedgerClient`](crate::transport::LedgerClient) or while connecting to
/// one.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The endpoint is unreachable or the handshake failed.
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect {
        /// The endpoint.
        endpoint: Url,
        /// Why the connection failed.
        reason: String,
    },
    /// A connection or query did not complete in time.
    #[error("request timeout: endpoint={endpoint}, method={method}, timeout={timeout:?}")]
    Timeout {
        /// The endpoint.
        endpoint: Url,
        /// The request that timed out.
        method: &'static str,
        /// The configured timeout.
        timeout: Duration,
    },
    /// A query failed.
    #[error("rpc error: {0}")]
    Rpc(String),
    /// The network rejected a submitted transfer.
    #[error("transfer rejected: {0}")]
    Rejected(String),
    /// No connection is held.
    #[error("not connected")]
    NotConnected,
}

impl LedgerError {
    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
