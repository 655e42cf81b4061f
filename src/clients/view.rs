//! # Store View
//!
//! Read-only, push-based access to the store's state.
//!
//! Each view holds a `watch` receiver: the store publishes a complete
//! [`StoreState`] on every change, and any number of views (including ones
//! created later) see the latest value. The filtered view is recomputed from
//! that value on every read and never cached.
use crate::model::{filter_products, Product, SearchField, StoreState};
use crate::store_actor::StoreError;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct StoreView {
    state: watch::Receiver<StoreState>,
    fields: Arc<[SearchField]>,
}

impl StoreView {
    pub(crate) fn new(state: watch::Receiver<StoreState>, fields: Arc<[SearchField]>) -> Self {
        Self { state, fields }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Items matching the current filter term on the configured fields.
    pub fn filtered_products(&self) -> Vec<Product> {
        let state = self.state.borrow();
        filter_products(&state.items, &state.filter_term, &self.fields)
    }

    /// All items, unfiltered, in server order.
    pub fn items(&self) -> Vec<Product> {
        self.state.borrow().items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn filter_term(&self) -> String {
        self.state.borrow().filter_term.clone()
    }

    /// Waits for the next published change.
    ///
    /// Fails with [`StoreError::StoreClosed`] once the store has shut down.
    pub async fn changed(&mut self) -> Result<(), StoreError> {
        self.state
            .changed()
            .await
            .map_err(|_| StoreError::StoreClosed)
    }

    /// Waits until the state satisfies `condition`, checking the current value first.
    pub async fn wait_for(
        &mut self,
        condition: impl FnMut(&StoreState) -> bool,
    ) -> Result<StoreState, StoreError> {
        let state = self
            .state
            .wait_for(condition)
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        Ok(state.clone())
    }
}
