//! # Remote Product API
//!
//! The store never talks HTTP itself. It talks to anything implementing
//! [`ProductApi`]: a transport adapter in production, the in-memory
//! [`catalog`](crate::catalog) for demos, or a [`mock`](super::mock) in tests.
//!
//! Transport details (headers, paths, status codes) belong to the implementor.
//! The store only requires that every call resolves to a decoded value or a
//! [`RemoteError`].

use crate::model::{Product, ProductDraft, ProductId, ProductPatch};
use async_trait::async_trait;
use std::sync::Arc;

/// Errors a backend can report for any call.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Rejected by server: {0}")]
    Rejected(String),
    #[error("Remote API unavailable")]
    Unavailable,
}

/// The four calls the store issues against the backend.
///
/// # Contract
/// - `list_products` and `search_products` return products in server order.
/// - `create_product` returns the created record including its assigned id.
/// - `update_product` returns the record as stored after the patch.
#[async_trait]
pub trait ProductApi: Send + Sync + 'static {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError>;

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RemoteError>;

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RemoteError>;

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, RemoteError>;
}

#[async_trait]
impl<A: ProductApi + ?Sized> ProductApi for Arc<A> {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        (**self).list_products().await
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RemoteError> {
        (**self).search_products(query).await
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RemoteError> {
        (**self).create_product(draft).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, RemoteError> {
        (**self).update_product(id, patch).await
    }
}
