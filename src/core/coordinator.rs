//! # Coordinator: the process-wide owner of dispatch, store and lifecycle.
//!
//! One [`Coordinator`] is built per process and shared by `Arc`. Every
//! inbound interface lands here:
//!
//! ```text
//! delivery mechanism ── on_event ─────────► Synchronizer ──(mpsc)──► background context
//! background context ── ready() ──────────► Synchronizer::on_ready
//!                    ── promote/demote ───► LifecycleController
//! restart signal     ── on_restart_completed ► Replayer ──► RegionMonitor::register
//! application        ── initialize / register / unregister ──► RegionMonitor + RegistrationStore
//!
//! all of the above ── publish(Event) ──► Bus ──► listener ──► SubscriberSet ──► subscribers
//! ```
//!
//! ## Teardown
//! ```text
//! shutdown()                               (first caller only)
//!   ├─► Bus: ShutdownRequested
//!   ├─► LifecycleController::shutdown()     (releases held resource)
//!   ├─► runtime_token.cancel()              (context sees is_cancelled())
//!   ├─► close the dispatcher: later transitions are dropped, never bootstrapped
//!   ├─► drop the context's sender; wait up to cfg.grace for it to exit
//!   │      ├─ exited   → Bus: AllStoppedWithin
//!   │      └─ timeout  → abort, Bus: GraceExceeded, Err(GraceExceeded)
//!   └─► stop the subscriber listener (drains what is already on the bus)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::{runtime::Handle, sync::broadcast::error::RecvError, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{
    bootstrap::ContextHandle,
    builder::CoordinatorBuilder,
    lifecycle::{LifecycleController, Priority},
    replay::{ReplayReport, Replayer},
    shutdown,
    synchronizer::{Accepted, DispatchState, Synchronizer},
};
use crate::{
    config::Config,
    entrypoint::EntrypointRegistry,
    error::{LifecycleError, RegistrationError, RuntimeError, StoreError},
    events::{Bus, Event, EventKind},
    monitor::RegionMonitor,
    regions::{DispatchHandle, GeofenceEvent, RegionSummary, RegistrationRecord},
    store::RegistrationStore,
    subscribers::SubscriberSet,
};

/// Bus → subscriber fan-out task.
pub(crate) struct Listener {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl Listener {
    /// Subscribes to `bus` now and forwards everything to `set` until stopped.
    pub(crate) fn spawn(bus: &Bus, set: SubscriberSet, rt: &Handle) -> Self {
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        let stop = token.clone();

        let join = rt.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "subscriber listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => break,
                }
            }
            set.shutdown().await;
        });
        Self { token, join }
    }

    async fn stop(self) {
        self.token.cancel();
        let _ = self.join.await;
    }
}

/// Background dispatch coordinator.
pub struct Coordinator {
    cfg: Config,
    bus: Bus,
    store: Arc<RegistrationStore>,
    entrypoints: Arc<EntrypointRegistry>,
    monitor: Arc<dyn RegionMonitor>,
    dispatcher: Arc<Synchronizer>,
    lifecycle: Arc<LifecycleController>,
    replayer: Replayer,
    runtime_token: CancellationToken,
    listener: Mutex<Option<Listener>>,
    shut_down: AtomicBool,
}

impl Coordinator {
    /// Starts building a coordinator.
    pub fn builder(cfg: Config, monitor: Arc<dyn RegionMonitor>) -> CoordinatorBuilder {
        CoordinatorBuilder::new(cfg, monitor)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        store: Arc<RegistrationStore>,
        entrypoints: Arc<EntrypointRegistry>,
        monitor: Arc<dyn RegionMonitor>,
        dispatcher: Arc<Synchronizer>,
        lifecycle: Arc<LifecycleController>,
        replayer: Replayer,
        runtime_token: CancellationToken,
        listener: Listener,
    ) -> Self {
        Self {
            cfg,
            bus,
            store,
            entrypoints,
            monitor,
            dispatcher,
            lifecycle,
            replayer,
            runtime_token,
            listener: Mutex::new(Some(listener)),
            shut_down: AtomicBool::new(false),
        }
    }

    // ---- initialization & registrations ----

    /// Persists `handle` as the dispatch target, replacing any previous one.
    pub fn initialize(&self, handle: DispatchHandle) -> Result<(), StoreError> {
        self.store.set_dispatch_handle(handle)?;
        if self.entrypoints.resolve(handle).is_none() {
            warn!(
                %handle,
                known = ?self.entrypoints.handles(),
                "dispatch handle has no entrypoint in this process"
            );
        }
        info!(%handle, "dispatch target set");
        self.bus
            .publish(Event::new(EventKind::DispatchTargetSet).with_handle(handle.get()));
        Ok(())
    }

    /// Registers `record` with the monitor, then persists it.
    ///
    /// Nothing is persisted unless the monitor accepted the region.
    pub async fn register(&self, record: &RegistrationRecord) -> Result<(), RegistrationError> {
        let res = self.try_register(record).await;
        match &res {
            Ok(()) => {
                info!(region = %record.id, "region registered");
                self.bus
                    .publish(Event::new(EventKind::RegionRegistered).with_region(record.id.as_str()));
            }
            Err(e) => {
                warn!(region = %record.id, error = %e, "region registration failed");
                self.bus.publish(
                    Event::new(EventKind::RegionRegisterFailed)
                        .with_region(record.id.as_str())
                        .with_reason(e.as_message()),
                );
            }
        }
        res
    }

    async fn try_register(&self, record: &RegistrationRecord) -> Result<(), RegistrationError> {
        if !record.is_valid() {
            return Err(RegistrationError::Invalid {
                id: record.id.clone(),
            });
        }
        if !record.initial_triggers.is_subset_of(record.transitions) {
            debug!(
                region = %record.id,
                initial = record.initial_triggers.bits(),
                watched = record.transitions.bits(),
                "initial triggers include unwatched transitions"
            );
        }
        self.monitor.register(record).await?;
        self.store.put(record)?;
        Ok(())
    }

    /// Stops monitoring `ids`, then removes them from the store.
    ///
    /// If the monitor refuses, nothing is removed. The store removal is a
    /// single commit, so a store failure leaves every id in place.
    pub async fn unregister(&self, ids: &[String]) -> Result<(), RegistrationError> {
        if ids.is_empty() {
            return Ok(());
        }
        let res = self.try_unregister(ids).await;
        match &res {
            Ok(()) => {
                info!(count = ids.len(), "regions removed");
                self.bus
                    .publish(Event::new(EventKind::RegionsRemoved).with_count(ids.len()));
            }
            Err(e) => {
                warn!(count = ids.len(), error = %e, "region removal failed");
                self.bus.publish(
                    Event::new(EventKind::RegionRemoveFailed)
                        .with_count(ids.len())
                        .with_reason(e.as_message()),
                );
            }
        }
        res
    }

    async fn try_unregister(&self, ids: &[String]) -> Result<(), RegistrationError> {
        self.monitor.unregister(ids).await?;
        let removed = self.store.remove_many(ids)?;
        if removed < ids.len() {
            debug!(
                requested = ids.len(),
                removed, "some unregistered ids were not stored"
            );
        }
        Ok(())
    }

    /// Sorted live region ids.
    pub fn registered_ids(&self) -> Vec<String> {
        self.store.list_ids().into_iter().collect()
    }

    /// Summaries of the live regions whose records decode.
    pub fn registered_regions(&self) -> Vec<RegionSummary> {
        self.store.regions()
    }

    // ---- inbound: delivery mechanism ----

    /// Accepts one transition. Never fails and never waits on the context.
    pub fn on_event(&self, ev: GeofenceEvent) -> Accepted {
        self.dispatcher.on_event(ev)
    }

    // ---- inbound: background context ----

    /// Readiness signal; see [`BackgroundContext::ready`](crate::BackgroundContext::ready).
    pub fn on_ready(&self) -> usize {
        self.dispatcher.on_ready()
    }

    pub fn on_promote_requested(&self) -> Result<bool, LifecycleError> {
        self.lifecycle.promote()
    }

    pub fn on_demote_requested(&self) -> bool {
        self.lifecycle.demote()
    }

    pub fn on_shutdown_requested(&self) -> bool {
        self.lifecycle.shutdown()
    }

    // ---- inbound: restart ----

    /// Re-registers every persisted region after a restart.
    pub async fn on_restart_completed(&self) -> ReplayReport {
        self.replayer.replay_all().await
    }

    // ---- introspection ----

    pub fn dispatch_state(&self) -> DispatchState {
        self.dispatcher.state()
    }

    pub fn queue_len(&self) -> usize {
        self.dispatcher.queue_len()
    }

    pub fn bootstrap_attempts(&self) -> u64 {
        self.dispatcher.bootstrap_attempts()
    }

    pub fn dispatch_handle(&self) -> Option<DispatchHandle> {
        self.store.dispatch_handle()
    }

    pub fn priority(&self) -> Priority {
        self.lifecycle.priority()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The event bus, for ad-hoc receivers.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    // ---- teardown ----

    /// Tears the coordinator down.
    ///
    /// Second and later calls, concurrent ones included, return `Ok(())`
    /// without doing anything.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        info!("coordinator shutting down");
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.lifecycle.shutdown();
        self.runtime_token.cancel();

        let res = match self.dispatcher.close() {
            Some(ctx) => self.wait_context(ctx).await,
            None => Ok(()),
        };

        let listener = self.listener.lock().take();
        if let Some(l) = listener {
            l.stop().await;
        }
        res
    }

    /// Waits for SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere), then shuts down.
    pub async fn run_until_signal(&self) -> Result<(), RuntimeError> {
        shutdown::wait_for_termination().await?;
        self.shutdown().await
    }

    async fn wait_context(&self, ctx: ContextHandle) -> Result<(), RuntimeError> {
        let ContextHandle {
            entrypoint,
            tx,
            mut join,
            ..
        } = ctx;
        // Receiver yields what is buffered, then None.
        drop(tx);

        let Some(grace) = self.cfg.grace_period() else {
            join.abort();
            debug!(%entrypoint, "background context aborted (no grace)");
            return Ok(());
        };

        match tokio::time::timeout(grace, &mut join).await {
            Ok(_) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                join.abort();
                warn!(%entrypoint, ?grace, "background context did not stop in time");
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                Err(RuntimeError::GraceExceeded { grace })
            }
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.runtime_token.cancel();
        // Workers hold bus clones, so the listener never sees `Closed`.
        if let Some(l) = self.listener.get_mut().take() {
            l.token.cancel();
        }
    }
}
