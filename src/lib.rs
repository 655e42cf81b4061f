#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Product Store
//!
//! > **A client-side, observable mirror of a remote product catalog.**
//!
//! The store loads, searches, creates and updates products through a remote
//! API and keeps a local copy that any number of readers can watch. Every
//! change goes through the server first; local state only ever holds
//! server-confirmed records.
//!
//! ## 🏗️ Design
//!
//! ### One Writer, Many Readers
//! The [`ProductStore`](store_actor::ProductStore) is an actor: a single Tokio task that owns
//! the state and applies every change in order. Readers never lock anything; they hold a
//! [`StoreView`](clients::StoreView) backed by a `tokio::sync::watch` channel and see each
//! published state as a whole.
//!
//! ### Stale Responses Never Win
//! Remote calls run concurrently as child tasks of the actor. Each carries a ticket, and a
//! newer request of the same kind (a newer search, a newer load, a newer update of the same
//! product) retires the older ticket. A retired call's result is discarded and its caller is
//! told it was [`Superseded`](store_actor::StoreError::Superseded).
//!
//! ### Mocking: Testing without a Server
//! The store talks to any [`ProductApi`](framework::ProductApi). Tests use the mocks in
//! [`framework::mock`], which either answer from a list of expectations or hand every
//! responder to the test so it can decide the settlement order.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`store_actor`])
//! The actor, its messages and its error type.
//! - **Key items**: [`ProductStore`](store_actor::ProductStore), [`StoreError`](store_actor::StoreError).
//!
//! ### 2. The Interface ([`clients`])
//! We don't expose raw message passing to the rest of the app.
//! - **Key items**: [`ProductStoreClient`](clients::ProductStoreClient),
//!   [`StoreView`](clients::StoreView), [`SearchInput`](clients::SearchInput).
//!
//! ### 3. The Collaborators ([`framework`], [`catalog`], [`timer`])
//! The remote API contract and its mocks, an in-memory backend, and the refresh timer.
//!
//! ### 4. The Orchestrator ([`lifecycle`], [`config`])
//! - **Key items**: [`ProductSystem`](lifecycle::ProductSystem),
//!   [`StoreConfig`](config::StoreConfig), [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo against the in-memory catalog
//! RUST_LOG=info cargo run
//!
//! # Run the tests
//! cargo test
//! ```

pub mod catalog;
pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod store_actor;
pub mod timer;
