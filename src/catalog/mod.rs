//! # In-Memory Catalog
//!
//! An actor-backed stand-in for the remote product backend, implementing
//! [`ProductApi`](crate::framework::ProductApi). It assigns sequential ids,
//! lists products in insertion order, searches titles case-insensitively and
//! rejects records with a negative price or a rating outside `[0, 5]`.
//!
//! ## Structure
//!
//! - [`actor`] - [`CatalogActor`], the event loop owning the records
//! - [`client`] - [`CatalogClient`], the `ProductApi` handle
//! - [`message`] - [`CatalogRequest`] messages
//! - [`error`] - [`CatalogError`], mapped onto [`RemoteError`](crate::framework::RemoteError)
//!
//! ## Usage
//!
//! ```rust
//! use product_store::catalog;
//! use product_store::framework::ProductApi;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (backend, api) = catalog::with_products(catalog::sample_products());
//!     tokio::spawn(backend.run());
//!
//!     let phones = api.search_products("iphone").await.unwrap();
//!     assert_eq!(phones.len(), 2);
//! }
//! ```

pub mod actor;
pub mod client;
pub mod error;
pub mod message;

pub use actor::*;
pub use client::*;
pub use error::*;
pub use message::*;

use crate::model::{Product, ProductId};
use tokio::sync::mpsc;

const BUFFER_SIZE: usize = 32;

/// Creates an empty catalog actor and its client.
pub fn new() -> (CatalogActor, CatalogClient) {
    with_products(Vec::new())
}

/// Creates a catalog actor holding `seed`. New ids continue after the highest seeded id.
pub fn with_products(seed: Vec<Product>) -> (CatalogActor, CatalogClient) {
    let (sender, receiver) = mpsc::channel(BUFFER_SIZE);
    (CatalogActor::new(receiver, seed), CatalogClient::new(sender))
}

/// A handful of phones used by the demo binary and tests.
pub fn sample_products() -> Vec<Product> {
    [
        (1, "iPhone 9", "Apple", "An apple mobile which is nothing like apple", 94, 549.0, 4.69),
        (2, "iPhone X", "Apple", "SIM-Free, Model A19211 6.5-inch Super Retina HD display", 34, 899.0, 4.44),
        (3, "Samsung Universe 9", "Samsung", "Samsung's new variant which goes beyond Galaxy", 36, 1249.0, 4.09),
        (4, "OPPOF19", "OPPO", "OPPO F19 is officially announced on April 2021", 123, 280.0, 4.3),
        (5, "Huawei P30", "Huawei", "Huawei's re-badged P30 Pro New Edition", 32, 499.0, 4.09),
    ]
    .into_iter()
    .map(|(id, title, brand, description, stock, price, rating)| Product {
        id: ProductId(id),
        title: title.to_string(),
        brand: brand.to_string(),
        description: description.to_string(),
        stock,
        price,
        rating,
    })
    .collect()
}
