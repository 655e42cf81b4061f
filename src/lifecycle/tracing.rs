//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//! Levels are taken from `RUST_LOG`; the compact format hides module paths
//! (`with_target(false)`) and shows spans inline.
//!
//! ```bash
//! # Lifecycle and state changes
//! RUST_LOG=info cargo run
//!
//! # Every request, ticket and discarded stale response
//! RUST_LOG=debug cargo run
//!
//! # Only the store actor
//! RUST_LOG=product_store::store_actor=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Store lifecycle**: `Store started`, `Shutdown` with item and outstanding call counts
//! - **Requests**: kind, ticket and in-flight count at debug
//! - **Settlements**: `Loaded`, `Searched`, `Added`, `Updated` at info
//! - **Supersession**: superseded tickets and `Discarding stale response` at debug
//! - **Failures**: remote errors at warn, with the ticket they belonged to
//!
//! With `RUST_LOG=debug` a search burst through the debouncer reads:
//!
//! ```text
//! DEBUG Forwarding search query=iph
//! DEBUG Request kind=search ticket=4 in_flight=1
//! INFO Searched ticket=4 query=iph count=2
//! DEBUG Search applied query=iph count=2
//! ```

/// Installs the global subscriber. Call once, at program start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
