//! Error types for the in-memory catalog.

use crate::model::ProductId;
use thiserror::Error;

/// Errors the catalog reports for a single request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// No product with this id exists.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The draft or patch would break a product invariant.
    #[error("Invalid product: {0}")]
    Invalid(String),
}
