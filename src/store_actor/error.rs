//! Error types for the Product store.

use super::message::RequestKind;
use crate::framework::RemoteError;
use thiserror::Error;

/// Errors a store operation can report to its caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The backing API call did not succeed. Local items are unchanged.
    #[error("Remote failure: {0}")]
    Remote(#[from] RemoteError),

    /// A newer request of the same kind was issued before this one settled.
    /// Its result was discarded without touching local state.
    #[error("Superseded by a newer {0} request")]
    Superseded(RequestKind),

    /// The store task is no longer accepting requests.
    #[error("Store closed")]
    StoreClosed,

    /// The store stopped before answering.
    #[error("Store dropped response channel")]
    StoreDropped,
}

impl StoreError {
    /// Whether a UI should report this failure. Stale responses are silent.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, StoreError::Superseded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superseded_is_silent() {
        assert!(!StoreError::Superseded(RequestKind::Search).is_user_visible());
        assert!(StoreError::Remote(RemoteError::Unavailable).is_user_visible());
        assert!(StoreError::StoreClosed.is_user_visible());
    }

    #[test]
    fn test_remote_error_converts() {
        let err: StoreError = RemoteError::Decode("bad".into()).into();
        assert_eq!(err.to_string(), "Remote failure: Decode error: bad");
    }
}
