//! # Mock Framework
//!
//! Utilities for testing the store without a real backend.
//!
//! Two styles are available, matching how much control a test needs:
//!
//! | Style | Entry point | Use when |
//! |-------|-------------|----------|
//! | **Expectations** | [`MockProductApi`] | Answers are known up front and arrive immediately |
//! | **Manual responders** | [`create_mock_api`] + [`expect_search`] etc. | The test decides *when* each call settles (supersession, races) |
//!
//! ## Expectations
//!
//! ```ignore
//! let mut mock = MockProductApi::new();
//! mock.expect_list().return_ok(vec![product]);
//! mock.expect_update(ProductId(1)).return_err(RemoteError::Unavailable);
//!
//! let (store, client) = store_actor::new(mock.api(), &config);
//! // ... drive the client ...
//! mock.verify(); // Ensures all expectations were met
//! ```
//!
//! ## Manual responders
//!
//! ```ignore
//! let (api, mut calls) = create_mock_api(10);
//! // ... issue client.search("a") in a spawned task ...
//! let (query, responder) = expect_search(&mut calls).await.expect("Expected Search call");
//! responder.send(Ok(vec![])).unwrap();
//! ```

use crate::framework::{ProductApi, RemoteError};
use crate::model::{Product, ProductDraft, ProductId, ProductPatch};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// One-shot channel a test uses to answer an intercepted call.
pub type ApiResponse<T> = oneshot::Sender<Result<T, RemoteError>>;

/// A call intercepted by [`ChannelApi`].
#[derive(Debug)]
pub enum ApiCall {
    List {
        respond_to: ApiResponse<Vec<Product>>,
    },
    Search {
        query: String,
        respond_to: ApiResponse<Vec<Product>>,
    },
    Create {
        draft: ProductDraft,
        respond_to: ApiResponse<Product>,
    },
    Update {
        id: ProductId,
        patch: ProductPatch,
        respond_to: ApiResponse<Product>,
    },
}

/// A [`ProductApi`] that forwards every call to a channel the test owns.
#[derive(Clone)]
pub struct ChannelApi {
    sender: mpsc::Sender<ApiCall>,
}

impl ChannelApi {
    async fn call<T>(
        &self,
        build: impl FnOnce(ApiResponse<T>) -> ApiCall,
    ) -> Result<T, RemoteError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| RemoteError::Unavailable)?;
        response
            .await
            .map_err(|_| RemoteError::Network("Request dropped".to_string()))?
    }
}

#[async_trait]
impl ProductApi for ChannelApi {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        self.call(|respond_to| ApiCall::List { respond_to }).await
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RemoteError> {
        let query = query.to_string();
        self.call(|respond_to| ApiCall::Search { query, respond_to })
            .await
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RemoteError> {
        self.call(|respond_to| ApiCall::Create { draft, respond_to })
            .await
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, RemoteError> {
        self.call(|respond_to| ApiCall::Update {
            id,
            patch,
            respond_to,
        })
        .await
    }
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Represents an expected call and the answer it gets.
enum Expectation {
    List {
        response: Result<Vec<Product>, RemoteError>,
    },
    Search {
        query: String,
        response: Result<Vec<Product>, RemoteError>,
    },
    Create {
        response: Result<Product, RemoteError>,
    },
    Update {
        id: ProductId,
        response: Result<Product, RemoteError>,
    },
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

/// A mock backend with expectation tracking for fluent testing.
///
/// Calls are answered in the order expectations were registered. A call that
/// does not match the next expectation is answered with a network error and
/// recorded, so [`MockProductApi::verify`] fails the test afterwards.
pub struct MockProductApi {
    api: ChannelApi,
    expectations: Queue,
    mismatches: Arc<Mutex<Vec<String>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockProductApi {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        let (api, mut receiver) = create_mock_api(100);
        let expectations: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let mismatches = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let mismatches_clone = mismatches.clone();

        // Spawn background task to handle calls
        let handle = tokio::spawn(async move {
            while let Some(call) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (call, expectation) {
                    (ApiCall::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ApiCall::Search { query, respond_to },
                        Some(Expectation::Search {
                            query: expected,
                            response,
                        }),
                    ) if query == expected => {
                        let _ = respond_to.send(response);
                    }
                    (ApiCall::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ApiCall::Update { id, respond_to, .. },
                        Some(Expectation::Update {
                            id: expected,
                            response,
                        }),
                    ) if id == expected => {
                        let _ = respond_to.send(response);
                    }
                    // Recorded before answering, so a caller that sees the error also sees the mismatch.
                    (call, _) => reject(call, &mismatches_clone),
                }
            }
        });

        Self {
            api,
            expectations,
            mismatches,
            _handle: handle,
        }
    }

    /// Returns the API handle to hand to the store.
    pub fn api(&self) -> ChannelApi {
        self.api.clone()
    }

    /// Expects a `list_products` call.
    pub fn expect_list(&mut self) -> ExpectationBuilder<Vec<Product>> {
        self.builder(|response| Expectation::List { response })
    }

    /// Expects a `search_products` call with exactly `query`.
    pub fn expect_search(&mut self, query: impl Into<String>) -> ExpectationBuilder<Vec<Product>> {
        let query = query.into();
        self.builder(move |response| Expectation::Search { query, response })
    }

    /// Expects a `create_product` call.
    pub fn expect_create(&mut self) -> ExpectationBuilder<Product> {
        self.builder(|response| Expectation::Create { response })
    }

    /// Expects an `update_product` call for `id`.
    pub fn expect_update(&mut self, id: ProductId) -> ExpectationBuilder<Product> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    fn builder<T>(
        &self,
        wrap: impl FnOnce(Result<T, RemoteError>) -> Expectation + Send + 'static,
    ) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            wrap: Box::new(wrap),
        }
    }

    /// Verifies that all expectations were met and no unexpected call arrived.
    pub fn verify(&self) {
        let mismatches = self.mismatches.lock().unwrap();
        if !mismatches.is_empty() {
            panic!("Unexpected calls: {:?}", *mismatches);
        }
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

impl Default for MockProductApi {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected<T>() -> Result<T, RemoteError> {
    Err(RemoteError::Network("Unexpected request".to_string()))
}

fn reject(call: ApiCall, mismatches: &Mutex<Vec<String>>) {
    let record = |description: String| mismatches.lock().unwrap().push(description);
    match call {
        ApiCall::List { respond_to } => {
            record("List".to_string());
            let _ = respond_to.send(unexpected());
        }
        ApiCall::Search { query, respond_to } => {
            record(format!("Search({:?})", query));
            let _ = respond_to.send(unexpected());
        }
        ApiCall::Create { draft, respond_to } => {
            record(format!("Create({:?})", draft.title));
            let _ = respond_to.send(unexpected());
        }
        ApiCall::Update { id, respond_to, .. } => {
            record(format!("Update({})", id));
            let _ = respond_to.send(unexpected());
        }
    }
}

/// Builder registering the answer for one expected call.
pub struct ExpectationBuilder<T> {
    expectations: Queue,
    wrap: Box<dyn FnOnce(Result<T, RemoteError>) -> Expectation + Send>,
}

impl<T> ExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: RemoteError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, RemoteError>) {
        let expectation = (self.wrap)(response);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

// =============================================================================
// MANUAL RESPONDERS
// =============================================================================

/// Creates an API handle and the receiver its calls arrive on.
///
/// # Testing Strategy
/// Nothing answers on its own: the test pulls each call off `receiver` with one
/// of the `expect_*` helpers and fires the responder whenever it chooses. This
/// makes settlement order fully deterministic, which is what supersession and
/// race tests need.
pub fn create_mock_api(buffer_size: usize) -> (ChannelApi, mpsc::Receiver<ApiCall>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelApi { sender }, receiver)
}

/// Helper to verify that the next call is a List call
pub async fn expect_list(
    receiver: &mut mpsc::Receiver<ApiCall>,
) -> Option<ApiResponse<Vec<Product>>> {
    match receiver.recv().await {
        Some(ApiCall::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next call is a Search call
pub async fn expect_search(
    receiver: &mut mpsc::Receiver<ApiCall>,
) -> Option<(String, ApiResponse<Vec<Product>>)> {
    match receiver.recv().await {
        Some(ApiCall::Search { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is a Create call
pub async fn expect_create(
    receiver: &mut mpsc::Receiver<ApiCall>,
) -> Option<(ProductDraft, ApiResponse<Product>)> {
    match receiver.recv().await {
        Some(ApiCall::Create { draft, respond_to }) => Some((draft, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is an Update call
pub async fn expect_update(
    receiver: &mut mpsc::Receiver<ApiCall>,
) -> Option<(ProductId, ProductPatch, ApiResponse<Product>)> {
    match receiver.recv().await {
        Some(ApiCall::Update {
            id,
            patch,
            respond_to,
        }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> Product {
        Product::from_draft(
            ProductId(1),
            ProductDraft {
                title: "Phone".into(),
                ..ProductDraft::default()
            },
        )
    }

    #[tokio::test]
    async fn test_channel_api_round_trip() {
        let (api, mut calls) = create_mock_api(10);

        let search_task = tokio::spawn(async move { api.search_products("ph").await });

        let (query, responder) = expect_search(&mut calls)
            .await
            .expect("Expected Search call");
        assert_eq!(query, "ph");
        responder.send(Ok(vec![phone()])).unwrap();

        let result = search_task.await.unwrap();
        assert_eq!(result, Ok(vec![phone()]));
    }

    #[tokio::test]
    async fn test_dropped_responder_is_a_network_error() {
        let (api, mut calls) = create_mock_api(10);

        let list_task = tokio::spawn(async move { api.list_products().await });
        let responder = expect_list(&mut calls).await.expect("Expected List call");
        drop(responder);

        let result = list_task.await.unwrap();
        assert!(matches!(result, Err(RemoteError::Network(_))));
    }

    #[tokio::test]
    async fn test_mock_api_with_expectations() {
        let mut mock = MockProductApi::new();
        mock.expect_list().return_ok(vec![phone()]);
        mock.expect_update(ProductId(1))
            .return_err(RemoteError::Rejected("Invalid price: -5".into()));

        let api = mock.api();
        assert_eq!(api.list_products().await.unwrap(), vec![phone()]);

        let result = api.update_product(ProductId(1), ProductPatch::price(-5.0)).await;
        assert!(matches!(result, Err(RemoteError::Rejected(_))));

        mock.verify();
    }

    #[tokio::test]
    async fn test_mismatched_calls_get_network_errors() {
        let mut mock = MockProductApi::new();
        mock.expect_list().return_ok(vec![]);

        let api = mock.api();
        let created = api.create_product(ProductDraft::default()).await;
        assert!(matches!(created, Err(RemoteError::Network(_))));

        let updated = api.update_product(ProductId(3), ProductPatch::stock(1)).await;
        assert!(matches!(updated, Err(RemoteError::Network(_))));

        assert_eq!(
            *mock.mismatches.lock().unwrap(),
            vec!["Create(\"\")".to_string(), "Update(product_3)".to_string()]
        );
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected calls")]
    async fn test_mock_api_flags_unexpected_call() {
        let mut mock = MockProductApi::new();
        mock.expect_search("a").return_ok(vec![]);

        let result = mock.api().search_products("b").await;
        assert!(result.is_err());

        mock.verify();
    }
}
