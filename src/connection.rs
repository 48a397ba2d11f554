//! Connection management for a single workflow invocation.
//!
//! Establishing a connection is costly (handshake plus metadata sync), so consecutive requests
//! against the same endpoint share one connection. Processing within a workflow is sequential,
//! so at most one connection is held at a time.

use crate::{
    error::LedgerError,
    transport::{Connector, LedgerClient},
};
use std::{ops::Deref, sync::Arc};
use tracing::{debug, instrument, warn};
use url::Url;

/// A live connection to one endpoint, owned by the invocation that acquired it.
#[derive(Debug)]
pub struct ConnectionHandle {
    endpoint: Url,
    client: Box<dyn LedgerClient>,
}

impl ConnectionHandle {
    /// The endpoint this handle is bound to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Deref for ConnectionHandle {
    type Target = dyn LedgerClient;

    fn deref(&self) -> &Self::Target {
        self.client.as_ref()
    }
}

/// Holds at most one [`ConnectionHandle`], switching endpoints lazily.
///
/// A manager must not be shared across concurrent invocations; each workflow creates its own and
/// calls [`ConnectionManager::release`] when done. A manager dropped while still holding a
/// connection, as happens when the workflow future is cancelled, releases it on a spawned task.
#[derive(Debug)]
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    held: Option<ConnectionHandle>,
}

impl ConnectionManager {
    /// Create a new [`ConnectionManager`] holding no connection.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector, held: None }
    }

    /// Returns a connection to `endpoint`.
    ///
    /// Reuses the held connection if it is bound to `endpoint`. Otherwise the held connection is
    /// released and a new one established. Connection failures are returned as-is, nothing is
    /// retried.
    #[instrument(skip_all, fields(%endpoint))]
    pub async fn acquire(&mut self, endpoint: &Url) -> Result<&ConnectionHandle, LedgerError> {
        if self.endpoint() == Some(endpoint) {
            debug!("Reusing connection");
        } else {
            self.release().await;
            let client = self.connector.connect(endpoint).await?;
            debug!("Connected");
            self.held = Some(ConnectionHandle { endpoint: endpoint.clone(), client });
        }

        self.held.as_ref().ok_or(LedgerError::NotConnected)
    }

    /// Tears down the held connection, if any.
    ///
    /// Teardown errors are logged; the handle is dropped either way.
    pub async fn release(&mut self) {
        if let Some(handle) = self.held.take() {
            if let Err(err) = handle.client.disconnect().await {
                warn!(endpoint = %handle.endpoint, %err, "Failed to disconnect");
            }
        }
    }

    /// The endpoint of the held connection, if any.
    pub fn endpoint(&self) -> Option<&Url> {
        self.held.as_ref().map(|handle| &handle.endpoint)
    }
}

impl Drop for ConnectionManager {
    /// Releases a still held connection in the background, e.g. when the workflow owning this
    /// manager was cancelled.
    fn drop(&mut self) {
        let Some(handle) = self.held.take() else { return };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(endpoint = %handle.endpoint, "Connection dropped outside of a runtime");
            return;
        };

        debug!(endpoint = %handle.endpoint, "Releasing dropped connection");
        runtime.spawn(async move {
            if let Err(err) = handle.client.disconnect().await {
                warn!(endpoint = %handle.endpoint, %err, "Failed to disconnect");
            }
        });
    }
}
