//! Requests the [`CatalogClient`](super::CatalogClient) sends to the [`CatalogActor`](super::CatalogActor).

use super::error::CatalogError;
use crate::model::{Product, ProductDraft, ProductId, ProductPage, ProductPatch};
use tokio::sync::oneshot;

pub type CatalogResponse<T> = oneshot::Sender<Result<T, CatalogError>>;

#[derive(Debug)]
pub enum CatalogRequest {
    List {
        respond_to: CatalogResponse<ProductPage>,
    },
    Search {
        query: String,
        respond_to: CatalogResponse<ProductPage>,
    },
    Create {
        draft: ProductDraft,
        respond_to: CatalogResponse<Product>,
    },
    Update {
        id: ProductId,
        patch: ProductPatch,
        respond_to: CatalogResponse<Product>,
    },
}
