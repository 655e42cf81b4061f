//! The seam between the store and the backend.
//!
//! # Main Components
//!
//! - [`ProductApi`] - Trait every remote product backend implements
//! - [`RemoteError`] - The single failure type a backend reports
//!
//! # Testing
//!
//! See [`mock`] for API doubles that let tests decide what the backend answers, and when.

pub mod api;
pub mod mock;

// Re-export core types for convenience
pub use api::*;
