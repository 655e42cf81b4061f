//! Debounced search input.
//!
//! Keystrokes are pushed into a [`SearchInput`]; a query reaches the store only
//! after the input has been quiet for the configured period. Each forwarded
//! query supersedes the previous one inside the store, so a slow answer to an
//! old query never overwrites a newer one.
use super::store_client::ProductStoreClient;
use crate::store_actor::StoreError;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct SearchInput {
    sender: mpsc::Sender<String>,
    handle: JoinHandle<()>,
}

impl SearchInput {
    /// Starts the debouncing task for `client`.
    pub fn spawn(client: ProductStoreClient, quiet: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let handle = tokio::spawn(debounce(client, receiver, quiet));
        Self { sender, handle }
    }

    /// Records the latest input value and restarts the quiet period.
    pub async fn push(&self, value: impl Into<String>) -> Result<(), StoreError> {
        self.sender
            .send(value.into())
            .await
            .map_err(|_| StoreError::StoreClosed)
    }

    /// Stops accepting input. A value still waiting for its quiet period is forwarded first.
    pub async fn close(self) {
        drop(self.sender);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Search input task failed");
        }
    }
}

async fn debounce(client: ProductStoreClient, mut values: mpsc::Receiver<String>, quiet: Duration) {
    let mut pending: Option<String> = None;

    loop {
        tokio::select! {
            value = values.recv() => match value {
                Some(value) => pending = Some(value),
                None => break,
            },
            _ = tokio::time::sleep(quiet), if pending.is_some() => {
                if let Some(query) = pending.take() {
                    forward(&client, query).await;
                }
            }
        }
    }

    if let Some(query) = pending.take() {
        forward(&client, query).await;
    }
}

/// Enqueues the search in order, then waits for its answer off the input path.
async fn forward(client: &ProductStoreClient, query: String) {
    debug!(%query, "Forwarding search");
    let pending = match client.submit_search(&query).await {
        Ok(pending) => pending,
        Err(e) => {
            warn!(%query, error = %e, "Search not sent");
            return;
        }
    };
    tokio::spawn(async move {
        match pending.wait().await {
            Ok(products) => debug!(%query, count = products.len(), "Search applied"),
            Err(e) if e.is_user_visible() => warn!(%query, error = %e, "Search failed"),
            Err(_) => debug!(%query, "Search superseded"),
        }
    });
}
