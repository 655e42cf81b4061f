//! # Product Store Actor
//!
//! The `ProductStore` owns the authoritative local product state and is the only
//! writer of it. It runs as a single Tokio task and handles two kinds of input,
//! one at a time:
//!
//! 1. **Requests** from [`ProductStoreClient`](crate::clients::ProductStoreClient)s.
//!    Each request registers a ticket, publishes `loading = true`, and spawns
//!    the remote call as a child task.
//! 2. **Settlements** of those child tasks. The result is applied only if its
//!    ticket is still live; stale results are discarded.
//!
//! Because both are handled inside the same loop, no two state updates ever
//! interleave, and no lock guards the state.
//!
//! ## Supersession
//!
//! Tickets are allocated from a monotonically increasing counter. Requests with
//! the same [`SupersessionKey`] replace each other: issuing a new one retires
//! every live ticket with that key. A retired ticket's eventual result is
//! answered with [`StoreError::Superseded`] and never reaches the state.
//!
//! | Request | Key | Effect of a newer request with the same key |
//! |---------|-----|---------------------------------------------|
//! | `LoadAll` | `Load` | older load discarded |
//! | `Search` | `Search` | older search discarded (last query wins) |
//! | `Update` | `Update(id)` | older update of the same product discarded |
//! | `Add` | none | every add is applied |
//!
//! Across different keys whichever call settles last determines `items`.
//!
//! ## Teardown
//!
//! The loop ends once every client is dropped, or as soon as the token from
//! [`ProductStore::shutdown_token`] is cancelled, even while clients are still
//! waiting. Outstanding remote calls are aborted with the loop's `JoinSet`, so
//! nothing can settle into a stopped store; their callers see
//! [`StoreError::StoreDropped`].

use super::error::StoreError;
use super::message::{RequestKind, Response, StoreRequest};
use crate::clients::ProductStoreClient;
use crate::framework::{ProductApi, RemoteError};
use crate::model::{Product, ProductId, SearchField, StoreState};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Requests sharing a key supersede each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupersessionKey {
    Load,
    Search,
    Update(ProductId),
}

/// A finished remote call on its way back into the actor loop.
struct Settlement {
    ticket: u64,
    outcome: Outcome,
}

enum Outcome {
    Loaded {
        result: Result<Vec<Product>, RemoteError>,
        respond_to: Response<Vec<Product>>,
    },
    Searched {
        query: String,
        result: Result<Vec<Product>, RemoteError>,
        respond_to: Response<Vec<Product>>,
    },
    Added {
        result: Result<Product, RemoteError>,
        respond_to: Response<Product>,
    },
    Updated {
        id: ProductId,
        result: Result<Product, RemoteError>,
        respond_to: Response<Product>,
    },
}

/// The actor that owns a product collection mirrored from a remote API.
///
/// Create it with [`ProductStore::new`] (or [`store_actor::new`](super::new)),
/// spawn [`ProductStore::run`], and talk to it through the returned client.
pub struct ProductStore<A: ProductApi> {
    receiver: mpsc::Receiver<StoreRequest>,
    api: Arc<A>,
    state: watch::Sender<StoreState>,
    in_flight: JoinSet<Settlement>,
    /// Task id of every outstanding remote call, mapped to its ticket.
    tasks: HashMap<Id, u64>,
    /// Tickets whose results will still be applied.
    live: HashMap<u64, Option<SupersessionKey>>,
    next_ticket: u64,
    shutdown: CancellationToken,
}

impl<A: ProductApi> ProductStore<A> {
    /// Creates a new `ProductStore` and its associated `ProductStoreClient`.
    ///
    /// # Arguments
    ///
    /// * `api` - The remote backend every mutation goes through.
    /// * `buffer_size` - The capacity of the request channel.
    /// * `fields` - Product fields the client-side filtered view matches on.
    pub fn new(
        api: A,
        buffer_size: usize,
        fields: Vec<SearchField>,
    ) -> (Self, ProductStoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (state, state_rx) = watch::channel(StoreState::default());
        let actor = Self {
            receiver,
            api: Arc::new(api),
            state,
            in_flight: JoinSet::new(),
            tasks: HashMap::new(),
            live: HashMap::new(),
            next_ticket: 1,
            shutdown: CancellationToken::new(),
        };
        let client = ProductStoreClient::new(sender, state_rx, fields);
        (actor, client)
    }

    /// A token that stops the store when cancelled, regardless of live clients.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs the store's event loop until every client has been dropped or
    /// the shutdown token is cancelled.
    pub async fn run(mut self) {
        info!("Store started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("Shutdown requested");
                    break;
                }
                request = self.receiver.recv() => match request {
                    Some(request) => self.dispatch(request),
                    None => break,
                },
                Some(joined) = self.in_flight.join_next_with_id(), if !self.in_flight.is_empty() => {
                    match joined {
                        Ok((task, settlement)) => {
                            self.tasks.remove(&task);
                            self.settle(settlement);
                        }
                        Err(e) => self.abandon(e.id(), &e),
                    }
                }
            }
        }

        let outstanding = self.in_flight.len();
        self.in_flight.abort_all();
        info!(
            items = self.state.borrow().items.len(),
            outstanding, "Shutdown"
        );
    }

    fn dispatch(&mut self, request: StoreRequest) {
        let kind = request.kind();
        match request {
            StoreRequest::LoadAll { respond_to } => {
                let ticket = self.register(kind, Some(SupersessionKey::Load));
                self.publish(|_| {});
                let api = self.api.clone();
                self.spawn(ticket, async move {
                    let result = api.list_products().await;
                    Settlement {
                        ticket,
                        outcome: Outcome::Loaded { result, respond_to },
                    }
                });
            }
            StoreRequest::Search { query, respond_to } => {
                let ticket = self.register(kind, Some(SupersessionKey::Search));
                let term = query.clone();
                self.publish(|state| state.filter_term = term);
                let api = self.api.clone();
                self.spawn(ticket, async move {
                    let result = api.search_products(&query).await;
                    Settlement {
                        ticket,
                        outcome: Outcome::Searched {
                            query,
                            result,
                            respond_to,
                        },
                    }
                });
            }
            StoreRequest::Add { draft, respond_to } => {
                let ticket = self.register(kind, None);
                self.publish(|_| {});
                let api = self.api.clone();
                self.spawn(ticket, async move {
                    let result = api.create_product(draft).await;
                    Settlement {
                        ticket,
                        outcome: Outcome::Added { result, respond_to },
                    }
                });
            }
            StoreRequest::Update {
                id,
                patch,
                respond_to,
            } => {
                let ticket = self.register(kind, Some(SupersessionKey::Update(id)));
                self.publish(|_| {});
                let api = self.api.clone();
                self.spawn(ticket, async move {
                    let result = api.update_product(id, patch).await;
                    Settlement {
                        ticket,
                        outcome: Outcome::Updated {
                            id,
                            result,
                            respond_to,
                        },
                    }
                });
            }
        }
    }

    /// Allocates a ticket and retires every live ticket sharing `key`.
    fn register(&mut self, kind: RequestKind, key: Option<SupersessionKey>) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        if let Some(key) = key {
            self.live.retain(|stale, live_key| {
                let superseded = *live_key == Some(key);
                if superseded {
                    debug!(ticket = stale, ?key, "Superseded");
                }
                !superseded
            });
        }
        self.live.insert(ticket, key);
        debug!(%kind, ticket, in_flight = self.live.len(), "Request");
        ticket
    }

    fn spawn(&mut self, ticket: u64, call: impl Future<Output = Settlement> + Send + 'static) {
        let handle = self.in_flight.spawn(call);
        self.tasks.insert(handle.id(), ticket);
    }

    /// Applies `mutate` and recomputes `loading`, notifying every subscriber once.
    fn publish(&self, mutate: impl FnOnce(&mut StoreState)) {
        let loading = !self.live.is_empty();
        self.state.send_modify(|state| {
            mutate(state);
            state.loading = loading;
        });
    }

    fn settle(&mut self, Settlement { ticket, outcome }: Settlement) {
        let current = self.live.remove(&ticket).is_some();

        match outcome {
            Outcome::Loaded { result, respond_to } => {
                if !current {
                    return discard(ticket, RequestKind::Load, respond_to);
                }
                let reply = result
                    .and_then(checked_collection)
                    .map(|products| {
                        info!(ticket, count = products.len(), "Loaded");
                        let items = products.clone();
                        self.publish(|state| state.items = items);
                        products
                    });
                self.finish(ticket, RequestKind::Load, reply, respond_to);
            }
            Outcome::Searched {
                query,
                result,
                respond_to,
            } => {
                if !current {
                    return discard(ticket, RequestKind::Search, respond_to);
                }
                let reply = result
                    .and_then(checked_collection)
                    .map(|products| {
                        info!(ticket, %query, count = products.len(), "Searched");
                        let items = products.clone();
                        self.publish(|state| state.items = items);
                        products
                    });
                self.finish(ticket, RequestKind::Search, reply, respond_to);
            }
            Outcome::Added { result, respond_to } => {
                if !current {
                    return discard(ticket, RequestKind::Add, respond_to);
                }
                let reply = result.and_then(checked).map(|product| {
                    let confirmed = product.clone();
                    self.publish(|state| {
                        // A load that settled first may already carry the new product.
                        match state.items.iter_mut().find(|p| p.id == confirmed.id) {
                            Some(existing) => *existing = confirmed,
                            None => state.items.push(confirmed),
                        }
                    });
                    info!(ticket, id = %product.id, "Added");
                    product
                });
                self.finish(ticket, RequestKind::Add, reply, respond_to);
            }
            Outcome::Updated {
                id,
                result,
                respond_to,
            } => {
                if !current {
                    return discard(ticket, RequestKind::Update, respond_to);
                }
                let reply = result.and_then(checked).map(|product| {
                    let found = self.state.borrow().items.iter().any(|p| p.id == id);
                    if found {
                        let confirmed = product.clone();
                        self.publish(|state| {
                            if let Some(slot) = state.items.iter_mut().find(|p| p.id == id) {
                                *slot = confirmed;
                            }
                        });
                        info!(ticket, %id, "Updated");
                    } else {
                        debug!(ticket, %id, "Update target not held locally");
                        self.publish(|_| {});
                    }
                    product
                });
                self.finish(ticket, RequestKind::Update, reply, respond_to);
            }
        }
    }

    /// Answers the caller. Failures still republish so `loading` can clear.
    fn finish<T>(
        &self,
        ticket: u64,
        kind: RequestKind,
        reply: Result<T, RemoteError>,
        respond_to: Response<T>,
    ) {
        let reply = match reply {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(ticket, %kind, error = %e, "Remote call failed");
                self.publish(|_| {});
                Err(StoreError::Remote(e))
            }
        };
        let _ = respond_to.send(reply);
    }

    /// A remote call task panicked or was cancelled; its caller sees `StoreDropped`.
    fn abandon(&mut self, task: Id, error: &tokio::task::JoinError) {
        if let Some(ticket) = self.tasks.remove(&task) {
            warn!(ticket, error = %error, "Remote call task failed");
            if self.live.remove(&ticket).is_some() {
                self.publish(|_| {});
            }
        }
    }
}

fn discard<T>(ticket: u64, kind: RequestKind, respond_to: Response<T>) {
    debug!(ticket, %kind, "Discarding stale response");
    let _ = respond_to.send(Err(StoreError::Superseded(kind)));
}

/// Rejects server payloads that would break the product invariants.
fn checked(product: Product) -> Result<Product, RemoteError> {
    product
        .validate()
        .map_err(|e| RemoteError::Decode(format!("{}: {}", product.id, e)))?;
    Ok(product)
}

fn checked_collection(products: Vec<Product>) -> Result<Vec<Product>, RemoteError> {
    let mut seen = HashSet::with_capacity(products.len());
    for product in &products {
        if !seen.insert(product.id) {
            return Err(RemoteError::Decode(format!("Duplicate id {}", product.id)));
        }
        product
            .validate()
            .map_err(|e| RemoteError::Decode(format!("{}: {}", product.id, e)))?;
    }
    Ok(products)
}
