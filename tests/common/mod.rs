//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use fencevisor::{
    BackgroundContext, CallbackHandle, Config, ContextError, Coordinator, DispatchHandle,
    EntrypointFn, EntrypointRef, ForegroundHost, ForegroundNotice, GeofenceEvent, HeldResource,
    Location, MemoryBackend, MonitorError, RegionMonitor, RegistrationRecord, Transition,
};

pub const HANDLE: DispatchHandle = DispatchHandle(42);

// ============================================================================
// Region monitor
// ============================================================================

/// Records every call; can be told to refuse specific ids or everything.
#[derive(Default)]
pub struct FakeMonitor {
    pub registered: Mutex<Vec<RegistrationRecord>>,
    pub unregistered: Mutex<Vec<Vec<String>>>,
    refuse: Mutex<HashSet<String>>,
    refuse_all: Mutex<bool>,
}

impl FakeMonitor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refuse(&self, id: &str) {
        self.refuse.lock().insert(id.to_string());
    }

    pub fn refuse_all(&self, on: bool) {
        *self.refuse_all.lock() = on;
    }

    pub fn registered_ids(&self) -> Vec<String> {
        self.registered.lock().iter().map(|r| r.id.clone()).collect()
    }
}

#[async_trait]
impl RegionMonitor for FakeMonitor {
    async fn register(&self, record: &RegistrationRecord) -> Result<(), MonitorError> {
        if *self.refuse_all.lock() || self.refuse.lock().contains(&record.id) {
            return Err(MonitorError::rejected("permission denied"));
        }
        self.registered.lock().push(record.clone());
        Ok(())
    }

    async fn unregister(&self, ids: &[String]) -> Result<(), MonitorError> {
        if *self.refuse_all.lock() {
            return Err(MonitorError::rejected("service unavailable"));
        }
        self.unregistered.lock().push(ids.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

// ============================================================================
// Foreground host
// ============================================================================

#[derive(Default)]
pub struct FakeHost {
    pub acquired: AtomicUsize,
    pub released: Arc<AtomicUsize>,
    pub indicator: Mutex<Option<ForegroundNotice>>,
}

struct FakeLock {
    held: bool,
    released: Arc<AtomicUsize>,
}

impl HeldResource for FakeLock {
    fn release(&mut self) {
        if self.held {
            self.held = false;
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_held(&self) -> bool {
        self.held
    }
}

impl ForegroundHost for FakeHost {
    fn acquire(&self, _tag: &str) -> Box<dyn HeldResource> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Box::new(FakeLock {
            held: true,
            released: Arc::clone(&self.released),
        })
    }

    fn show_indicator(&self, notice: &ForegroundNotice) {
        *self.indicator.lock() = Some(notice.clone());
    }

    fn hide_indicator(&self) {
        *self.indicator.lock() = None;
    }
}

// ============================================================================
// Entrypoints
// ============================================================================

/// Entrypoint that forwards every delivered event to the returned receiver.
///
/// It never calls `ready()` itself; tests drive readiness explicitly.
pub fn collector() -> (EntrypointRef, mpsc::UnboundedReceiver<GeofenceEvent>) {
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

/// Entrypoint that ignores cancellation and outlives any test grace period.
pub fn stubborn() -> EntrypointRef {
    EntrypointFn::arc("stubborn", |_ctx: BackgroundContext| async move {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok::<_, ContextError>(())
    })
}

// ============================================================================
// Builders
// ============================================================================

pub fn config() -> Config {
    Config {
        grace: Duration::from_secs(2),
        ..Config::default()
    }
}

pub fn coordinator(
    backend: &MemoryBackend,
    monitor: &Arc<FakeMonitor>,
    entry: Option<EntrypointRef>,
) -> Arc<Coordinator> {
    let mut b = Coordinator::builder(config(), monitor.clone())
        .with_backend(Arc::new(backend.clone()));
    if let Some(e) = entry {
        b = b.with_entrypoint(HANDLE, e);
    }
    b.build().expect("memory backend opens")
}

pub fn record(id: &str) -> RegistrationRecord {
    RegistrationRecord::new(id, CallbackHandle(7), Location::new(52.52, 13.40), 150.0)
}

pub fn event(id: &str) -> GeofenceEvent {
    GeofenceEvent::new(
        CallbackHandle(7),
        vec![id.to_string()],
        Location::new(52.52, 13.40),
        Transition::Enter,
    )
}

/// Receives `n` events or panics after a generous timeout.
pub async fn take(rx: &mut mpsc::UnboundedReceiver<GeofenceEvent>, n: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event within timeout")
            .expect("context alive");
        out.push(ev.region_ids[0].clone());
    }
    out
}
