//! # Dispatch synchronizer.
//!
//! Decides, per incoming transition, whether it is queued or forwarded to the
//! background context, and owns the single-flight bootstrap trigger.
//!
//! ## State machine
//! ```text
//!                 on_event (bootstrap ok)            on_ready (drain + flip)
//!   NotStarted ───────────────────────────► Starting ───────────────────────► Ready
//!      │  ▲                                   │  ▲                            │  ▲
//!      └──┘ on_event (bootstrap failed:       └──┘ on_event: enqueue          └──┘ on_event: forward
//!           enqueue, retry on next event)
//! ```
//!
//! ## Rules
//! - One mutex covers the state, the queue, the context slot and the attempt
//!   counter. Deciding, queueing, bootstrapping and draining all happen in it.
//! - Hand-off to the context is `UnboundedSender::send`, which never
//!   suspends, so drain, flip and hand-off form one critical section and no
//!   producer can slip between the last drained event and the flip.
//! - The context consumes from its receiver outside the lock.
//! - Bootstrap failures never reach the producer: `on_event` always reports
//!   acceptance.
//! - After [`Synchronizer::close`] nothing is queued, bootstrapped or
//!   forwarded again; transitions are reported as `DeliveryDropped`.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::core::bootstrap::{Bootstrapper, ContextHandle};
use crate::core::context::ContextLink;
use crate::core::lifecycle::LifecycleController;
use crate::core::queue::EventQueue;
use crate::events::{Bus, Event, EventKind};
use crate::regions::GeofenceEvent;

/// Synchronizer state for the current process generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// No bootstrap succeeded yet.
    NotStarted,
    /// The background context is starting; transitions are buffered.
    Starting,
    /// The background context is ready; transitions go straight to it.
    Ready,
}

impl DispatchState {
    /// Returns a short stable label (snake_case) for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            DispatchState::NotStarted => "not_started",
            DispatchState::Starting => "starting",
            DispatchState::Ready => "ready",
        }
    }
}

/// How a transition was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    /// Buffered until the background context signals ready.
    Queued,
    /// Handed to the ready background context.
    Forwarded,
    /// Discarded because the coordinator was torn down.
    Dropped,
}

struct Inner {
    state: DispatchState,
    queue: EventQueue,
    context: Option<ContextHandle>,
    bootstrap_attempts: u64,
    closed: bool,
}

/// Queue-or-forward gate in front of the background context.
pub struct Synchronizer {
    inner: Mutex<Inner>,
    bootstrapper: Bootstrapper,
    lifecycle: Weak<LifecycleController>,
    me: Weak<Synchronizer>,
    bus: Bus,
}

impl Synchronizer {
    pub(crate) fn new(
        bootstrapper: Bootstrapper,
        lifecycle: Weak<LifecycleController>,
        bus: Bus,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            inner: Mutex::new(Inner {
                state: DispatchState::NotStarted,
                queue: EventQueue::new(),
                context: None,
                bootstrap_attempts: 0,
                closed: false,
            }),
            bootstrapper,
            lifecycle,
            me: me.clone(),
            bus,
        })
    }

    /// Accepts one transition from the delivery mechanism.
    ///
    /// Never blocks on the background context and never fails: in
    /// `NotStarted` the event is queued and a bootstrap attempted, in
    /// `Starting` it is queued, in `Ready` it is forwarded. Once closed it is
    /// dropped.
    pub fn on_event(&self, ev: GeofenceEvent) -> Accepted {
        let mut inner = self.inner.lock();
        if inner.closed {
            debug!(state = inner.state.as_label(), "dispatcher closed; transition dropped");
            self.bus
                .publish(Event::new(EventKind::DeliveryDropped).with_reason("closed"));
            return Accepted::Dropped;
        }
        match inner.state {
            DispatchState::Ready => {
                self.forward(&inner, ev);
                Accepted::Forwarded
            }
            DispatchState::Starting => {
                let len = inner.queue.enqueue(ev);
                self.bus
                    .publish(Event::new(EventKind::EventQueued).with_count(len));
                Accepted::Queued
            }
            DispatchState::NotStarted => {
                let len = inner.queue.enqueue(ev);
                self.bus
                    .publish(Event::new(EventKind::EventQueued).with_count(len));

                inner.bootstrap_attempts += 1;
                let link = self.link();
                match self.bootstrapper.ensure_started(&mut inner.context, link) {
                    Ok(_) => inner.state = DispatchState::Starting,
                    Err(e) => {
                        warn!(
                            error = %e,
                            attempt = inner.bootstrap_attempts,
                            queued = len,
                            "bootstrap failed; retrying on next event"
                        );
                        self.bus
                            .publish(Event::new(EventKind::BootstrapFailed).with_reason(e.as_label()));
                    }
                }
                Accepted::Queued
            }
        }
    }

    /// Drains the queue into the background context and switches to `Ready`.
    ///
    /// Returns the number of events flushed. Only the first call after a
    /// successful bootstrap flushes anything; later calls, calls while
    /// `NotStarted` and calls after [`close`](Self::close) return 0.
    pub fn on_ready(&self) -> usize {
        let mut inner = self.inner.lock();
        if inner.closed || inner.state != DispatchState::Starting {
            debug!(state = inner.state.as_label(), "ignoring ready signal");
            self.bus.publish(Event::new(EventKind::SpuriousReady));
            return 0;
        }

        let drained = inner.queue.drain_in_order();
        inner.state = DispatchState::Ready;
        let n = drained.len();
        for ev in drained {
            self.forward(&inner, ev);
        }

        self.bus
            .publish(Event::new(EventKind::ContextReady).with_count(n));
        n
    }

    /// Current state.
    pub fn state(&self) -> DispatchState {
        self.inner.lock().state
    }

    /// Number of buffered transitions.
    pub fn queue_len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Bootstrap attempts made in this process generation.
    pub fn bootstrap_attempts(&self) -> u64 {
        self.inner.lock().bootstrap_attempts
    }

    /// Name of the running entrypoint, if one was started.
    pub fn entrypoint(&self) -> Option<String> {
        self.inner.lock().context.as_ref().map(|c| c.entrypoint.clone())
    }

    /// Closes the dispatcher and detaches the running context for teardown.
    ///
    /// Buffered transitions are discarded. Returns `None` if no context was
    /// ever started or the dispatcher was already closed.
    pub(crate) fn close(&self) -> Option<ContextHandle> {
        let mut inner = self.inner.lock();
        inner.closed = true;
        let discarded = inner.queue.drain_in_order().len();
        if discarded > 0 {
            warn!(discarded, "dispatcher closed with buffered transitions");
            self.bus.publish(
                Event::new(EventKind::DeliveryDropped)
                    .with_count(discarded)
                    .with_reason("closed"),
            );
        }
        inner.context.take()
    }

    /// Returns true once [`close`](Self::close) ran.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    fn forward(&self, inner: &Inner, ev: GeofenceEvent) {
        let sent = match inner.context.as_ref() {
            Some(ctx) => ctx.tx.send(ev).is_ok(),
            None => false,
        };
        if sent {
            self.bus.publish(Event::new(EventKind::EventForwarded));
        } else {
            warn!("background context gone; transition dropped");
            self.bus
                .publish(Event::new(EventKind::DeliveryDropped).with_reason("context_gone"));
        }
    }

    fn link(&self) -> ContextLink {
        ContextLink {
            dispatcher: self.me.clone(),
            lifecycle: self.lifecycle.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BackgroundContext;
    use crate::entrypoint::{EntrypointFn, EntrypointRef, EntrypointRegistry};
    use crate::error::ContextError;
    use crate::regions::{CallbackHandle, DispatchHandle, Location, Transition};
    use crate::store::{MemoryBackend, RegistrationStore};
    use tokio::{runtime::Handle, sync::mpsc};
    use tokio_util::sync::CancellationToken;

    fn ev(id: &str) -> GeofenceEvent {
        GeofenceEvent::new(
            CallbackHandle(1),
            vec![id.to_string()],
            Location::new(1.0, 2.0),
            Transition::Enter,
        )
    }

    fn collector() -> (EntrypointRef, mpsc::UnboundedReceiver<GeofenceEvent>) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let ep = EntrypointFn::arc("collector", move |mut ctx: BackgroundContext| {
            let out = out_tx.clone();
            async move {
                while let Some(ev) = ctx.next_event().await {
                    let _ = out.send(ev);
                }
                Ok::<_, ContextError>(())
            }
        });
        (ep, out_rx)
    }

    fn synchronizer(handle: Option<i64>, entry: Option<EntrypointRef>) -> Arc<Synchronizer> {
        let store = Arc::new(RegistrationStore::open(Arc::new(MemoryBackend::new())).unwrap());
        if let Some(h) = handle {
            store.set_dispatch_handle(DispatchHandle(h)).unwrap();
        }
        let registry = Arc::new(EntrypointRegistry::new());
        if let Some(e) = entry {
            registry.insert(DispatchHandle(42), e);
        }
        let bus = Bus::new(64);
        let boot = Bootstrapper::new(
            store,
            registry,
            Handle::current(),
            CancellationToken::new(),
            bus.clone(),
        );
        Synchronizer::new(boot, Weak::new(), bus)
    }

    #[tokio::test]
    async fn test_missing_target_keeps_not_started_and_retries() {
        let sync = synchronizer(None, None);

        assert_eq!(sync.on_event(ev("a")), Accepted::Queued);
        assert_eq!(sync.state(), DispatchState::NotStarted);
        assert_eq!(sync.bootstrap_attempts(), 1);

        assert_eq!(sync.on_event(ev("b")), Accepted::Queued);
        assert_eq!(sync.bootstrap_attempts(), 2);
        assert_eq!(sync.queue_len(), 2);
        assert!(sync.entrypoint().is_none());
    }

    #[tokio::test]
    async fn test_unresolved_handle_keeps_not_started() {
        let sync = synchronizer(Some(7), None);
        sync.on_event(ev("a"));
        assert_eq!(sync.state(), DispatchState::NotStarted);
        assert_eq!(sync.queue_len(), 1);
    }

    #[tokio::test]
    async fn test_ready_drains_in_order_then_forwards() {
        let (ep, mut out) = collector();
        let sync = synchronizer(Some(42), Some(ep));

        assert_eq!(sync.on_event(ev("e1")), Accepted::Queued);
        assert_eq!(sync.state(), DispatchState::Starting);
        assert_eq!(sync.on_event(ev("e2")), Accepted::Queued);
        assert_eq!(sync.bootstrap_attempts(), 1);
        assert_eq!(sync.entrypoint().as_deref(), Some("collector"));

        assert_eq!(sync.on_ready(), 2);
        assert_eq!(sync.state(), DispatchState::Ready);
        assert_eq!(sync.queue_len(), 0);

        assert_eq!(sync.on_event(ev("e3")), Accepted::Forwarded);
        assert_eq!(sync.on_ready(), 0);

        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(out.recv().await.unwrap().region_ids[0].clone());
        }
        assert_eq!(seen, vec!["e1", "e2", "e3"]);
    }

    #[tokio::test]
    async fn test_closed_dispatcher_drops_without_bootstrapping() {
        let (ep, _out) = collector();
        let sync = synchronizer(Some(42), Some(ep));

        assert!(sync.close().is_none());
        assert!(sync.is_closed());
        assert_eq!(sync.on_event(ev("late")), Accepted::Dropped);
        assert_eq!(sync.on_event(ev("later")), Accepted::Dropped);
        assert_eq!(sync.bootstrap_attempts(), 0);
        assert_eq!(sync.queue_len(), 0);
        assert_eq!(sync.state(), DispatchState::NotStarted);
        assert_eq!(sync.on_ready(), 0);
        assert!(sync.entrypoint().is_none());
    }

    #[tokio::test]
    async fn test_close_discards_buffered_and_detaches_context() {
        let (ep, _out) = collector();
        let sync = synchronizer(Some(42), Some(ep));
        sync.on_event(ev("e1"));
        assert_eq!(sync.state(), DispatchState::Starting);

        let ctx = sync.close().expect("context was started");
        assert_eq!(ctx.entrypoint, "collector");
        assert_eq!(sync.queue_len(), 0);
        assert_eq!(sync.on_ready(), 0);
        assert!(sync.close().is_none());
    }

    #[tokio::test]
    async fn test_ready_before_any_event_is_ignored() {
        let (ep, _out) = collector();
        let sync = synchronizer(Some(42), Some(ep));
        assert_eq!(sync.on_ready(), 0);
        assert_eq!(sync.state(), DispatchState::NotStarted);
    }
}
