//! # Entrypoint abstraction.
//!
//! An [`Entrypoint`] has a stable [`name`](Entrypoint::name) and an async
//! [`run`](Entrypoint::run) method that receives the [`BackgroundContext`].
//! It is started at most once per process generation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::BackgroundContext;
use crate::error::ContextError;

/// # Body of the long-lived background context.
///
/// Implementations are expected to:
/// 1. finish their own (possibly slow) initialization,
/// 2. call [`BackgroundContext::ready`] exactly when they can accept events,
/// 3. loop on [`BackgroundContext::next_event`] until it returns `None`.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use fencevisor::{BackgroundContext, ContextError, Entrypoint};
///
/// struct Dispatcher;
///
/// #[async_trait]
/// impl Entrypoint for Dispatcher {
///     fn name(&self) -> &str { "dispatcher" }
///
///     async fn run(&self, mut ctx: BackgroundContext) -> Result<(), ContextError> {
///         ctx.ready();
///         while let Some(ev) = ctx.next_event().await {
///             println!("{:?} {:?}", ev.transition, ev.region_ids);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Entrypoint: Send + Sync + 'static {
    /// Returns a stable, human-readable entrypoint name.
    fn name(&self) -> &str;

    /// Runs the background context until teardown.
    async fn run(&self, ctx: BackgroundContext) -> Result<(), ContextError>;
}

/// Shared handle to an entrypoint.
pub type EntrypointRef = Arc<dyn Entrypoint>;
