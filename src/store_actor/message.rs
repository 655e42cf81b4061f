//! # Store Messages
//!
//! Requests a [`ProductStoreClient`](crate::clients::ProductStoreClient) sends to the
//! [`ProductStore`](super::ProductStore) actor, and the one-shot channels results come back on.

use super::error::StoreError;
use crate::model::{Product, ProductDraft, ProductId, ProductPatch};
use std::fmt::Display;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Internal message type sent to the store to request operations.
///
/// Every variant ends in a remote call. The store answers on `respond_to`
/// once that call has settled and its result has been reconciled (or
/// discarded as stale).
#[derive(Debug)]
pub enum StoreRequest {
    LoadAll {
        respond_to: Response<Vec<Product>>,
    },
    Search {
        query: String,
        respond_to: Response<Vec<Product>>,
    },
    Add {
        draft: ProductDraft,
        respond_to: Response<Product>,
    },
    Update {
        id: ProductId,
        patch: ProductPatch,
        respond_to: Response<Product>,
    },
}

impl StoreRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            StoreRequest::LoadAll { .. } => RequestKind::Load,
            StoreRequest::Search { .. } => RequestKind::Search,
            StoreRequest::Add { .. } => RequestKind::Add,
            StoreRequest::Update { .. } => RequestKind::Update,
        }
    }
}

/// The operation kinds the store tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Load,
    Search,
    Add,
    Update,
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestKind::Load => "load",
            RequestKind::Search => "search",
            RequestKind::Add => "add",
            RequestKind::Update => "update",
        };
        f.write_str(name)
    }
}
