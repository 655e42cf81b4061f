//! # Product Store Client
//!
//! Provides a high‑level API for interacting with the [`ProductStore`](crate::store_actor::ProductStore) actor.
//! It wraps the request channel and exposes domain‑specific methods, plus push-based
//! read access through [`StoreView`].
use super::view::StoreView;
use crate::model::{Product, ProductDraft, ProductId, ProductPatch, SearchField, StoreState};
use crate::store_actor::{Response, StoreError, StoreRequest};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument, warn};

/// Client for interacting with the Product store.
///
/// Cheap to clone; every clone talks to the same store. The store shuts down
/// once every clone has been dropped.
#[derive(Clone)]
pub struct ProductStoreClient {
    sender: mpsc::Sender<StoreRequest>,
    state: watch::Receiver<StoreState>,
    fields: Arc<[SearchField]>,
}

impl ProductStoreClient {
    pub(crate) fn new(
        sender: mpsc::Sender<StoreRequest>,
        state: watch::Receiver<StoreState>,
        fields: Vec<SearchField>,
    ) -> Self {
        Self {
            sender,
            state,
            fields: fields.into(),
        }
    }

    /// Reloads the whole collection from the backend.
    ///
    /// Returns the products now held by the store.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<Vec<Product>, StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::LoadAll { respond_to })
            .await
    }

    /// Sets the filter term and replaces the items with the backend's search result.
    ///
    /// If another search is issued before this one settles, this call resolves
    /// to [`StoreError::Superseded`] and its result is never applied.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, StoreError> {
        debug!("Sending request");
        self.submit_search(query).await?.wait().await
    }

    /// Creates a product remotely and appends the confirmed record.
    #[instrument(skip(self))]
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Add { draft, respond_to })
            .await
    }

    /// Patches a product remotely and replaces the local entry in place.
    ///
    /// If `id` is not held locally the remote call still happens and the
    /// confirmed record is returned, but local items are left alone.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Update {
            id,
            patch,
            respond_to,
        })
        .await
    }

    /// Sets the stock of one product.
    pub async fn update_stock(&self, id: ProductId, stock: u32) -> Result<Product, StoreError> {
        self.update_product(id, ProductPatch::stock(stock)).await
    }

    /// Sets the price of one product.
    pub async fn update_price(&self, id: ProductId, price: f64) -> Result<Product, StoreError> {
        self.update_product(id, ProductPatch::price(price)).await
    }

    /// Starts a reload without waiting for it. Failures are logged, stale results ignored.
    pub fn reload_in_background(&self) {
        let client = self.clone();
        tokio::spawn(async move {
            match client.load_all().await {
                Ok(products) => debug!(count = products.len(), "Background reload done"),
                Err(StoreError::StoreClosed | StoreError::StoreDropped) => {
                    debug!("Store stopped before background reload finished")
                }
                Err(e) if e.is_user_visible() => warn!(error = %e, "Background reload failed"),
                Err(_) => {}
            }
        });
    }

    /// A push-based view of the store's state. Reading it never issues a remote call.
    pub fn subscribe(&self) -> StoreView {
        StoreView::new(self.state.clone(), self.fields.clone())
    }

    /// Enqueues a search and returns the pending answer without awaiting it.
    ///
    /// Enqueuing is ordered, so callers that submit several searches in a row
    /// get last-query-wins semantics in submission order.
    pub(crate) async fn submit_search(&self, query: &str) -> Result<Pending<Vec<Product>>, StoreError> {
        let query = query.to_string();
        self.submit(|respond_to| StoreRequest::Search { query, respond_to })
            .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        self.submit(build).await?.wait().await
    }

    async fn submit<T>(
        &self,
        build: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<Pending<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        Ok(Pending { response })
    }
}

/// The store's answer to a request that has already been enqueued.
pub(crate) struct Pending<T> {
    response: oneshot::Receiver<Result<T, StoreError>>,
}

impl<T> Pending<T> {
    pub(crate) async fn wait(self) -> Result<T, StoreError> {
        self.response.await.map_err(|_| StoreError::StoreDropped)?
    }
}
