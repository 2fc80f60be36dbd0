//! # Function-backed entrypoint (`EntrypointFn`)
//!
//! [`EntrypointFn`] wraps a closure `F: Fn(BackgroundContext) -> Fut`. The
//! closure is invoked once per start; shared state goes through explicit
//! `Arc<...>` captures.
//!
//! ## Example
//! ```rust
//! use fencevisor::{BackgroundContext, ContextError, EntrypointFn, EntrypointRef};
//!
//! let ep: EntrypointRef = EntrypointFn::arc("dispatcher", |mut ctx: BackgroundContext| async move {
//!     ctx.ready();
//!     while let Some(_ev) = ctx.next_event().await {}
//!     Ok::<_, ContextError>(())
//! });
//!
//! assert_eq!(ep.name(), "dispatcher");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::BackgroundContext;
use crate::entrypoint::Entrypoint;
use crate::error::ContextError;

/// Function-backed entrypoint implementation.
pub struct EntrypointFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> EntrypointFn<F> {
    /// Creates a new function-backed entrypoint.
    ///
    /// Prefer [`EntrypointFn::arc`] when you immediately need an [`EntrypointRef`](crate::EntrypointRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the entrypoint and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Entrypoint for EntrypointFn<F>
where
    F: Fn(BackgroundContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ContextError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: BackgroundContext) -> Result<(), ContextError> {
        (self.f)(ctx).await
    }
}
