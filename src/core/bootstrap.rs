//! # Background context bootstrap.
//!
//! The [`Bootstrapper`] starts the long-lived background context from the
//! persisted dispatch handle. It is only ever invoked from inside the
//! synchronizer's critical section, by the event that finds the state at
//! `NotStarted`, which makes it single-flight without a lock of its own.
//!
//! ```text
//! store.dispatch_handle() ──► registry.resolve() ──► mpsc::unbounded_channel()
//!        │ None                    │ None                     │
//!        ▼                         ▼                          ▼
//!  NoDispatchTarget       UnresolvedEntrypoint      rt.spawn(entry.run(ctx))
//!                                                          │ returns/panics
//!                                                          ▼
//!                                                   Bus: ContextExited
//! ```
//!
//! Nothing here awaits: reads are in-memory, spawning is immediate.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::context::{BackgroundContext, ContextLink};
use crate::entrypoint::EntrypointRegistry;
use crate::error::BootstrapError;
use crate::events::{Bus, Event, EventKind};
use crate::regions::GeofenceEvent;
use crate::store::RegistrationStore;

/// A running background context as seen from the coordinator.
pub(crate) struct ContextHandle {
    pub entrypoint: String,
    pub tx: mpsc::UnboundedSender<GeofenceEvent>,
    pub join: JoinHandle<()>,
}

/// Starts the background context.
pub(crate) struct Bootstrapper {
    store: Arc<RegistrationStore>,
    entrypoints: Arc<EntrypointRegistry>,
    rt: Handle,
    runtime_token: CancellationToken,
    bus: Bus,
}

impl Bootstrapper {
    pub(crate) fn new(
        store: Arc<RegistrationStore>,
        entrypoints: Arc<EntrypointRegistry>,
        rt: Handle,
        runtime_token: CancellationToken,
        bus: Bus,
    ) -> Self {
        Self {
            store,
            entrypoints,
            rt,
            runtime_token,
            bus,
        }
    }

    /// Starts the context into `slot` unless one is already there.
    ///
    /// Returns `Ok(true)` if this call started it, `Ok(false)` if the slot was
    /// occupied. On error the slot is left untouched.
    pub(crate) fn ensure_started(
        &self,
        slot: &mut Option<ContextHandle>,
        link: ContextLink,
    ) -> Result<bool, BootstrapError> {
        if slot.is_some() {
            return Ok(false);
        }

        let handle = self
            .store
            .dispatch_handle()
            .ok_or(BootstrapError::NoDispatchTarget)?;
        let entry = self
            .entrypoints
            .resolve(handle)
            .ok_or(BootstrapError::UnresolvedEntrypoint { handle })?;

        let name = entry.name().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        let token = self.runtime_token.child_token();
        let ctx = BackgroundContext::new(name.clone(), rx, link, token);

        let bus = self.bus.clone();
        let exit_name = name.clone();
        let join = self.rt.spawn(async move {
            let res = std::panic::AssertUnwindSafe(entry.run(ctx))
                .catch_unwind()
                .await;
            let ev = Event::new(EventKind::ContextExited).with_region(exit_name.as_str());
            let ev = match res {
                Ok(Ok(())) => ev,
                Ok(Err(e)) => ev.with_reason(e.to_string()),
                Err(_) => ev.with_reason("panicked"),
            };
            bus.publish(ev);
        });

        debug!(entrypoint = %name, %handle, "background context spawned");
        self.bus.publish(
            Event::new(EventKind::BootstrapStarted)
                .with_handle(handle.get())
                .with_reason(name.as_str()),
        );

        *slot = Some(ContextHandle {
            entrypoint: name,
            tx,
            join,
        });
        Ok(true)
    }
}
