use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use super::{
    bootstrap::Bootstrapper,
    coordinator::{Coordinator, Listener},
    lifecycle::LifecycleController,
    replay::Replayer,
    synchronizer::Synchronizer,
};
use crate::{
    config::Config,
    entrypoint::{EntrypointRef, EntrypointRegistry},
    error::StoreError,
    events::Bus,
    host::{ForegroundHost, NoopHost},
    monitor::RegionMonitor,
    regions::DispatchHandle,
    store::{FileBackend, RegistrationStore, StoreBackend},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Coordinator`].
pub struct CoordinatorBuilder {
    cfg: Config,
    monitor: Arc<dyn RegionMonitor>,
    host: Option<Arc<dyn ForegroundHost>>,
    backend: Option<Arc<dyn StoreBackend>>,
    entrypoints: Vec<(DispatchHandle, EntrypointRef)>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    runtime: Option<Handle>,
}

impl CoordinatorBuilder {
    /// Creates a new builder with the given configuration and region monitor.
    pub fn new(cfg: Config, monitor: Arc<dyn RegionMonitor>) -> Self {
        Self {
            cfg,
            monitor,
            host: None,
            backend: None,
            entrypoints: Vec::new(),
            subscribers: Vec::new(),
            runtime: None,
        }
    }

    /// Sets the platform host used for promotion. Defaults to [`NoopHost`].
    pub fn with_host(mut self, host: Arc<dyn ForegroundHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the store backend. Defaults to a [`FileBackend`] at `cfg.store_path`.
    pub fn with_backend(mut self, backend: Arc<dyn StoreBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Makes `entry` resolvable under `handle`.
    ///
    /// Entrypoints live in memory only; register them on every process start.
    pub fn with_entrypoint(mut self, handle: DispatchHandle, entry: EntrypointRef) -> Self {
        self.entrypoints.push((handle, entry));
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (queueing, bootstrap, replay,
    /// lifecycle) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the runtime the background context and subscriber workers run on.
    pub fn with_runtime(mut self, rt: Handle) -> Self {
        self.runtime = Some(rt);
        self
    }

    /// Opens the store and wires every component.
    ///
    /// # Panics
    /// Without [`with_runtime`](Self::with_runtime), must be called from
    /// inside a Tokio runtime.
    pub fn build(self) -> Result<Arc<Coordinator>, StoreError> {
        let rt = self.runtime.unwrap_or_else(Handle::current);
        let backend = match self.backend {
            Some(b) => b,
            None => Arc::new(FileBackend::new(self.cfg.store_path.clone())),
        };
        let store = Arc::new(RegistrationStore::open(backend)?);

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = Listener::spawn(
            &bus,
            SubscriberSet::new(self.subscribers, bus.clone(), &rt),
            &rt,
        );

        let entrypoints = Arc::new(EntrypointRegistry::new());
        for (handle, entry) in self.entrypoints {
            entrypoints.insert(handle, entry);
        }

        let host = self.host.unwrap_or_else(|| Arc::new(NoopHost));
        let lifecycle = Arc::new(LifecycleController::new(
            host,
            self.cfg.notice.clone(),
            self.cfg.wake_lock_tag.clone(),
            bus.clone(),
        ));

        let runtime_token = CancellationToken::new();
        let bootstrapper = Bootstrapper::new(
            Arc::clone(&store),
            Arc::clone(&entrypoints),
            rt,
            runtime_token.clone(),
            bus.clone(),
        );
        let dispatcher = Synchronizer::new(bootstrapper, Arc::downgrade(&lifecycle), bus.clone());
        let replayer = Replayer::new(Arc::clone(&store), Arc::clone(&self.monitor), bus.clone());

        Ok(Arc::new(Coordinator::new_internal(
            self.cfg,
            bus,
            store,
            entrypoints,
            self.monitor,
            dispatcher,
            lifecycle,
            replayer,
            runtime_token,
            listener,
        )))
    }
}
