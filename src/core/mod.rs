//! Runtime core: dispatch, bootstrap, replay and lifecycle.
//!
//! The public entry point is [`Coordinator`]; everything else here is either
//! one of its parts or a type that crosses its API.
//!
//! Internal modules:
//! - [`queue`]: ordered buffer of transitions awaiting the background context;
//! - [`synchronizer`]: queue-or-forward state machine, owns single-flight bootstrap;
//! - [`bootstrap`]: resolves the dispatch handle and spawns the background context;
//! - [`context`]: the handle the background entrypoint receives;
//! - [`replay`]: re-registers persisted regions after a restart;
//! - [`lifecycle`]: foreground/background priority and shutdown;
//! - [`shutdown`]: OS termination signal wait;
//! - [`coordinator`] / [`builder`]: wiring and teardown.

mod bootstrap;
mod builder;
mod context;
mod coordinator;
mod lifecycle;
mod queue;
mod replay;
mod shutdown;
mod synchronizer;

pub use builder::CoordinatorBuilder;
pub use context::BackgroundContext;
pub use coordinator::Coordinator;
pub use lifecycle::{LifecycleController, Priority};
pub use queue::EventQueue;
pub use replay::ReplayReport;
pub use synchronizer::{Accepted, DispatchState};
