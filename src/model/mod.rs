//! Pure data structures shared by the store, the remote API and the catalog backend.

pub mod product;
pub mod state;

pub use product::*;
pub use state::*;
