//! # fencevisor
//!
//! **Fencevisor** delivers geofence transitions to a long-lived, lazily
//! started background context without losing or reordering any of them
//! while that context boots, and re-registers the durable set of monitored
//! regions after a process or device restart.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  platform delivery (many producers)        application          restart signal
//!        │ on_event(GeofenceEvent)            │ initialize /        │ on_restart_completed
//!        ▼                                    │ register /          ▼
//! ┌───────────────────────────────────────────┴─ unregister ─────────────────────────┐
//! │  Coordinator (one per process)                                                   │
//! │                                                                                  │
//! │  Synchronizer ─────────────┐         RegistrationStore ◄──── Replayer ───────────┼──► RegionMonitor
//! │   (state + EventQueue +    │          (own lock domain,       (best effort)      │      (external)
//! │    single-flight, 1 mutex) │           StoreBackend)                             │
//! │        │ NotStarted        │               ▲                                     │
//! │        ▼                   │               │ dispatch handle                     │
//! │  Bootstrapper ─────────────┼───────────────┘                                     │
//! │        │ spawn                                                                   │
//! │        ▼                                                                         │
//! │  BackgroundContext ◄──(mpsc)── drain on ready / forward when Ready               │
//! │        │ ready() / promote() / demote() / request_shutdown()                     │
//! │        ▼                                                                         │
//! │  LifecycleController ──► ForegroundHost (held resource + status indicator)       │
//! └────────────────────────────────────┬─────────────────────────────────────────────┘
//!                                      │ publish(Event)
//!                                      ▼
//!                          Bus ──► listener ──► SubscriberSet ──► LogWriter / custom
//! ```
//!
//! ### Dispatch
//! ```text
//! on_event(ev)
//!   ├─ NotStarted ─► enqueue, attempt bootstrap
//!   │                 ├─ Ok  ─► Starting
//!   │                 └─ Err ─► stay NotStarted (retried on the next event)
//!   ├─ Starting   ─► enqueue
//!   └─ Ready      ─► forward
//!
//! on_ready()  (from the context)
//!   └─ Starting ─► drain queue in order, forward all, flip to Ready  (one critical section)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Dispatch**      | Ordered queue-or-forward with single-flight bootstrap.        | [`Coordinator`], [`DispatchState`]          |
//! | **Entrypoints**   | Bodies of the background context, resolved by handle.         | [`Entrypoint`], [`EntrypointFn`]            |
//! | **Store**         | Durable records, live set and dispatch handle.                | [`RegistrationStore`], [`StoreBackend`]     |
//! | **Recovery**      | Re-registration after restart.                                | [`ReplayReport`], [`RegionMonitor`]         |
//! | **Lifecycle**     | Foreground promotion, demotion, idempotent shutdown.          | [`LifecycleController`], [`ForegroundHost`] |
//! | **Subscriber API**| Observe runtime events (logging, metrics, custom).            | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed errors per failure domain.                              | [`BootstrapError`], [`RegistrationError`]   |
//! | **Configuration** | Centralized settings.                                         | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use fencevisor::{
//!     BackgroundContext, CallbackHandle, Config, ContextError, Coordinator, DispatchHandle,
//!     EntrypointFn, GeofenceEvent, Location, MemoryBackend, MonitorError, RegionMonitor,
//!     RegistrationRecord, Transition,
//! };
//!
//! struct Platform;
//!
//! #[async_trait]
//! impl RegionMonitor for Platform {
//!     async fn register(&self, _r: &RegistrationRecord) -> Result<(), MonitorError> { Ok(()) }
//!     async fn unregister(&self, _ids: &[String]) -> Result<(), MonitorError> { Ok(()) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = EntrypointFn::arc("dispatcher", |mut ctx: BackgroundContext| async move {
//!         ctx.ready();
//!         while let Some(ev) = ctx.next_event().await {
//!             println!("{} {:?}", ev.transition.as_label(), ev.region_ids);
//!         }
//!         Ok::<_, ContextError>(())
//!     });
//!
//!     let coord = Coordinator::builder(Config::default(), Arc::new(Platform))
//!         .with_backend(Arc::new(MemoryBackend::new()))
//!         .with_entrypoint(DispatchHandle(42), dispatcher)
//!         .build()?;
//!
//!     coord.initialize(DispatchHandle(42))?;
//!     coord
//!         .register(&RegistrationRecord::new("home", CallbackHandle(7), Location::new(52.52, 13.40), 150.0))
//!         .await?;
//!
//!     coord.on_event(GeofenceEvent::new(
//!         CallbackHandle(7),
//!         vec!["home".to_string()],
//!         Location::new(52.52, 13.40),
//!         Transition::Enter,
//!     ));
//!
//!     coord.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod entrypoint;
pub mod error;
pub mod events;
pub mod host;
pub mod monitor;
pub mod regions;
pub mod store;
pub mod subscribers;

// ---- Public re-exports ----

pub use config::{Config, ForegroundNotice};
pub use self::core::{
    Accepted, BackgroundContext, Coordinator, CoordinatorBuilder, DispatchState, EventQueue,
    LifecycleController, Priority, ReplayReport,
};
pub use entrypoint::{Entrypoint, EntrypointFn, EntrypointRef, EntrypointRegistry};
pub use error::{
    BootstrapError, ContextError, LifecycleError, MonitorError, RegistrationError, RuntimeError,
    StoreError,
};
pub use events::{Bus, Event, EventKind};
pub use host::{ForegroundHost, HeldResource, NoopHost};
pub use monitor::RegionMonitor;
pub use regions::{
    CallbackHandle, DispatchHandle, Expiration, GeofenceEvent, Location, RegionSummary,
    RegistrationRecord, Transition, TransitionMask,
};
pub use store::{FileBackend, MemoryBackend, Namespace, RegistrationStore, StoreBackend, StoredValue};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
