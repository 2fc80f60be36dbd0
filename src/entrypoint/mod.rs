//! Background entrypoints.
//!
//! An entrypoint is the code the background execution context runs. The
//! coordinator only knows it by its [`DispatchHandle`](crate::DispatchHandle);
//! the [`EntrypointRegistry`] turns that handle back into something runnable.
//!
//! ## Contents
//! - [`Entrypoint`] async body of the background context
//! - [`EntrypointFn`] closure-backed implementation
//! - [`EntrypointRef`] shared handle (`Arc<dyn Entrypoint>`)
//! - [`EntrypointRegistry`] handle → entrypoint resolution

mod entry;
mod entry_fn;
mod registry;

pub use entry::{Entrypoint, EntrypointRef};
pub use entry_fn::EntrypointFn;
pub use registry::EntrypointRegistry;
