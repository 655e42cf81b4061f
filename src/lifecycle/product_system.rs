use crate::clients::{ProductStoreClient, SearchInput, StoreView};
use crate::config::StoreConfig;
use crate::framework::ProductApi;
use crate::timer::RefreshTimer;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// The runtime orchestrator for one product store.
///
/// `ProductSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the store actor
/// - **Periodic Refresh**: Reloading the collection on the configured interval
/// - **Search Input**: Debouncing typed queries before they reach the store
///
/// # Example
///
/// ```ignore
/// let (backend, api) = catalog::new();
/// tokio::spawn(backend.run());
///
/// let system = ProductSystem::new(api, &StoreConfig::default());
/// system.search.push("phone").await.map_err(|e| e.to_string())?;
/// let view = system.client.subscribe();
///
/// system.shutdown().await?;
/// ```
pub struct ProductSystem {
    /// Client for interacting with the store actor
    pub client: ProductStoreClient,

    /// Debounced search box feeding the store
    pub search: SearchInput,

    timer: RefreshTimer,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl ProductSystem {
    /// Creates the store for `api` and starts it.
    ///
    /// This method:
    /// 1. Spawns the store actor
    /// 2. Issues the initial load without waiting for it
    /// 3. Starts the refresh timer, which reloads on every fire
    /// 4. Spawns the search debouncer
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<A: ProductApi>(api: A, config: &StoreConfig) -> Self {
        let (store, client) = crate::store_actor::new(api, config);
        let shutdown = store.shutdown_token();
        let handle = tokio::spawn(store.run());

        client.reload_in_background();

        let mut timer = RefreshTimer::new(config.refresh_interval());
        let reloader = client.clone();
        timer.start(move || reloader.reload_in_background());

        let search = SearchInput::spawn(client.clone(), config.search_debounce());

        Self {
            client,
            search,
            timer,
            shutdown,
            handle,
        }
    }

    /// A push-based view of the store's state.
    pub fn view(&self) -> StoreView {
        self.client.subscribe()
    }

    /// Seconds since the last automatic refresh.
    pub fn refresh_elapsed(&self) -> watch::Receiver<u64> {
        self.timer.subscribe_elapsed()
    }

    /// Gracefully shuts down the system.
    ///
    /// Stops the timer, flushes the search input, then stops the store and
    /// waits for it. Remote calls still outstanding are aborted, and anyone
    /// awaiting them (background reloads included) gets
    /// [`StoreError::StoreDropped`](crate::store_actor::StoreError::StoreDropped).
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the store shut down cleanly
    /// - `Err(String)` if the store task panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down product system...");

        let ProductSystem {
            client,
            search,
            mut timer,
            shutdown,
            handle,
        } = self;

        timer.stop();
        drop(timer);
        search.close().await;
        drop(client);
        shutdown.cancel();

        if let Err(e) = handle.await {
            error!("Store task failed: {:?}", e);
            return Err(format!("Store task failed: {:?}", e));
        }

        info!("Product system shutdown complete.");
        Ok(())
    }
}
