//! # Product Store Demo
//!
//! Runs a [`ProductSystem`] against the in-memory catalog and walks through
//! the store's operations:
//! 1. The initial load issued at startup.
//! 2. Adding a product and changing its stock and price.
//! 3. A debounced search burst, of which only the last query is sent.
//! 4. A rejected update, which leaves the displayed data untouched.
//!
//! Configuration is read from the file named by `PRODUCT_STORE_CONFIG` when set.

use product_store::catalog;
use product_store::config::StoreConfig;
use product_store::lifecycle::{setup_tracing, ProductSystem};
use product_store::model::{ProductDraft, ProductId};
use std::time::Duration;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::var("PRODUCT_STORE_CONFIG") {
        Ok(path) => StoreConfig::load(&path),
        Err(_) => StoreConfig::default().with_env_overrides(),
    }
    .map_err(|e| e.to_string())?;

    info!(?config, "Starting product store demo");

    let (backend, api) = catalog::with_products(catalog::sample_products());
    tokio::spawn(backend.run());

    let system = ProductSystem::new(api, &config);
    let mut view = system.view();

    let loaded = view
        .wait_for(|state| !state.loading && !state.items.is_empty())
        .await
        .map_err(|e| e.to_string())?;
    info!(count = loaded.items.len(), "Initial load complete");

    let span = tracing::info_span!("product_editing");
    let added = async {
        let added = system
            .client
            .add_product(ProductDraft {
                title: "iPhone 15".to_string(),
                brand: "Apple".to_string(),
                description: "The latest iPhone".to_string(),
                stock: 10,
                price: 999.0,
                rating: 4.8,
            })
            .await?;
        info!(id = %added.id, "Product added");

        system.client.update_stock(added.id, 8).await?;
        system.client.update_price(added.id, 949.0).await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;
    info!(id = %added.id, stock = added.stock, price = added.price, "Product updated");

    for query in ["i", "ip", "iph"] {
        system.search.push(query).await.map_err(|e| e.to_string())?;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let searched = view
        .wait_for(|state| state.filter_term == "iph" && !state.loading)
        .await
        .map_err(|e| e.to_string())?;
    for product in searched.filtered(&config.searchable_fields) {
        info!(id = %product.id, title = %product.title, stock = product.stock, "Match");
    }

    match system.client.update_price(ProductId(1), -5.0).await {
        Ok(product) => info!(id = %product.id, "Unexpectedly accepted"),
        Err(e) => error!(error = %e, items = view.items().len(), "Update rejected"),
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
