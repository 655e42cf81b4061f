//! # Product Store
//!
//! The actor that keeps a local, observable copy of the remote product collection.
//!
//! ## Structure
//!
//! - [`actor`] - [`ProductStore`], the event loop owning the state
//! - [`message`] - [`StoreRequest`] and the [`RequestKind`]s it carries
//! - [`error`] - [`StoreError`] type for type-safe error handling
//! - [`new()`] - Factory function that creates the actor and client from a [`StoreConfig`]
//!
//! ## Usage
//!
//! ```rust
//! use product_store::catalog;
//! use product_store::config::StoreConfig;
//! use product_store::model::ProductDraft;
//! use product_store::store_actor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (backend, api) = catalog::new();
//!     tokio::spawn(backend.run());
//!
//!     let (store, client) = store_actor::new(api, &StoreConfig::default());
//!     tokio::spawn(store.run());
//!
//!     let added = client
//!         .add_product(ProductDraft { title: "Widget".into(), stock: 5, price: 9.99, ..Default::default() })
//!         .await?;
//!     client.update_stock(added.id, 4).await?;
//!
//!     assert_eq!(client.subscribe().items()[0].stock, 4);
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod error;
pub mod message;

pub use actor::*;
pub use error::*;
pub use message::*;

use crate::clients::ProductStoreClient;
use crate::config::StoreConfig;
use crate::framework::ProductApi;

/// Creates a new Product store actor and its client.
pub fn new<A: ProductApi>(api: A, config: &StoreConfig) -> (ProductStore<A>, ProductStoreClient) {
    ProductStore::new(api, config.channel_buffer, config.searchable_fields.clone())
}
