//! [`ProductApi`] implementation backed by the in-memory catalog.

use super::error::CatalogError;
use super::message::{CatalogRequest, CatalogResponse};
use crate::framework::{ProductApi, RemoteError};
use crate::model::{Product, ProductDraft, ProductId, ProductPatch};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// Client for the catalog actor. Cheap to clone.
#[derive(Clone)]
pub struct CatalogClient {
    sender: mpsc::Sender<CatalogRequest>,
}

impl CatalogClient {
    pub(crate) fn new(sender: mpsc::Sender<CatalogRequest>) -> Self {
        Self { sender }
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(CatalogResponse<T>) -> CatalogRequest,
    ) -> Result<T, RemoteError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| RemoteError::Unavailable)?;
        response
            .await
            .map_err(|_| RemoteError::Network("Catalog dropped request".to_string()))?
            .map_err(RemoteError::from)
    }
}

impl From<CatalogError> for RemoteError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(_) => RemoteError::Status {
                status: 404,
                message: e.to_string(),
            },
            CatalogError::Invalid(message) => RemoteError::Rejected(message),
        }
    }
}

#[async_trait]
impl ProductApi for CatalogClient {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        let page = self
            .call(|respond_to| CatalogRequest::List { respond_to })
            .await?;
        Ok(page.products)
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RemoteError> {
        let query = query.to_string();
        let page = self
            .call(|respond_to| CatalogRequest::Search { query, respond_to })
            .await?;
        Ok(page.products)
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RemoteError> {
        self.call(|respond_to| CatalogRequest::Create { draft, respond_to })
            .await
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, RemoteError> {
        self.call(|respond_to| CatalogRequest::Update {
            id,
            patch,
            respond_to,
        })
        .await
    }
}
