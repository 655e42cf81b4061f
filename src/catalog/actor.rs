//! # Catalog Actor
//!
//! Owns the backend's product records and processes requests sequentially,
//! so no lock guards the records. Ids are assigned from a counter starting
//! after the highest seeded id and are never reused.

use super::error::CatalogError;
use super::message::CatalogRequest;
use crate::model::product::{check_price, check_rating};
use crate::model::{
    filter_products, Product, ProductDraft, ProductId, ProductPage, ProductPatch, SearchField,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct CatalogActor {
    receiver: mpsc::Receiver<CatalogRequest>,
    /// Records in insertion order, which is also list order.
    products: Vec<Product>,
    next_id: u64,
}

impl CatalogActor {
    pub(crate) fn new(receiver: mpsc::Receiver<CatalogRequest>, seed: Vec<Product>) -> Self {
        let next_id = seed.iter().map(|p| p.id.0).max().unwrap_or(0) + 1;
        Self {
            receiver,
            products: seed,
            next_id,
        }
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    pub async fn run(mut self) {
        info!(size = self.products.len(), "Catalog started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CatalogRequest::List { respond_to } => {
                    debug!(size = self.products.len(), "List");
                    let _ = respond_to.send(Ok(ProductPage {
                        products: self.products.clone(),
                    }));
                }
                CatalogRequest::Search { query, respond_to } => {
                    let products = filter_products(&self.products, &query, &[SearchField::Title]);
                    debug!(%query, count = products.len(), "Search");
                    let _ = respond_to.send(Ok(ProductPage { products }));
                }
                CatalogRequest::Create { draft, respond_to } => {
                    let result = self.create(draft);
                    if let Err(e) = &result {
                        warn!(error = %e, "Create failed");
                    }
                    let _ = respond_to.send(result);
                }
                CatalogRequest::Update {
                    id,
                    patch,
                    respond_to,
                } => {
                    let result = self.update(id, patch);
                    if let Err(e) = &result {
                        warn!(%id, error = %e, "Update failed");
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(size = self.products.len(), "Catalog shutdown");
    }

    fn create(&mut self, draft: ProductDraft) -> Result<Product, CatalogError> {
        check_price(draft.price).map_err(CatalogError::Invalid)?;
        check_rating(draft.rating).map_err(CatalogError::Invalid)?;

        let id = ProductId(self.next_id);
        self.next_id += 1;
        let product = Product::from_draft(id, draft);
        self.products.push(product.clone());
        info!(%id, size = self.products.len(), "Created");
        Ok(product)
    }

    fn update(&mut self, id: ProductId, patch: ProductPatch) -> Result<Product, CatalogError> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CatalogError::NotFound(id))?;

        if patch.is_empty() {
            debug!(%id, "Empty patch");
            return Ok(product.clone());
        }

        let mut updated = product.clone();
        updated.apply(&patch);
        updated.validate().map_err(CatalogError::Invalid)?;
        *product = updated.clone();
        info!(%id, "Updated");
        Ok(updated)
    }
}
