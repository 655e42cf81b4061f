//! Client-side handles to the product store.

pub mod search_input;
pub mod store_client;
pub mod view;

pub use search_input::*;
pub use store_client::*;
pub use view::*;
