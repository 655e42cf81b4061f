//! Runtime orchestration and lifecycle management.
//!
//! - [`ProductSystem`] - Starts the store, the refresh timer and the search
//!   debouncer for one backend, and shuts them down in order
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod product_system;
pub mod tracing;

pub use product_system::*;
pub use tracing::*;
