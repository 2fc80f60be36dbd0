//! # Process-priority host.
//!
//! [`ForegroundHost`] is the boundary to the platform mechanics behind
//! promotion: keeping the CPU awake and showing a persistent status
//! indicator. Acquisition returns a [`HeldResource`] guard; dropping the guard
//! (or calling [`HeldResource::release`]) gives the resource back.

/// A held platform resource (wake lock or equivalent).
///
/// `release` must be idempotent: a resource that was already released (or
/// never really held) is a no-op.
pub trait HeldResource: Send + 'static {
    /// Gives the resource back.
    fn release(&mut self);

    /// Returns true while the resource is held.
    fn is_held(&self) -> bool;
}

/// Platform side of the lifecycle controller.
pub trait ForegroundHost: Send + Sync + 'static {
    /// Acquires the held resource under `tag`.
    fn acquire(&self, tag: &str) -> Box<dyn HeldResource>;

    /// Presents the persistent status indicator.
    fn show_indicator(&self, notice: &crate::ForegroundNotice);

    /// Removes the status indicator.
    fn hide_indicator(&self);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Host that does nothing; used when the embedder has no priority mechanics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

#[derive(Debug)]
struct NoopResource {
    held: bool,
}

impl HeldResource for NoopResource {
    fn release(&mut self) {
        self.held = false;
    }

    fn is_held(&self) -> bool {
        self.held
    }
}

impl ForegroundHost for NoopHost {
    fn acquire(&self, _tag: &str) -> Box<dyn HeldResource> {
        Box::new(NoopResource { held: true })
    }

    fn show_indicator(&self, _notice: &crate::ForegroundNotice) {}

    fn hide_indicator(&self) {}

    fn name(&self) -> &'static str {
        "noop"
    }
}
