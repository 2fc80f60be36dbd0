//! # Lifecycle controller.
//!
//! Promotes the process to foreground priority (held resource + status
//! indicator), demotes it back, and shuts down. Independent from the
//! dispatch state machine; it only shares the bus.
//!
//! ```text
//!            promote()                    demote()
//! Background ─────────► Foreground ─────────────► Background
//!     │                     │
//!     └──── shutdown() ─────┴──► ShutDown  (terminal; shutdown() again is a no-op)
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::ForegroundNotice;
use crate::error::LifecycleError;
use crate::events::{Bus, Event, EventKind};
use crate::host::{ForegroundHost, HeldResource};

/// Process priority as tracked by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Background,
    Foreground,
    ShutDown,
}

struct State {
    priority: Priority,
    held: Option<Box<dyn HeldResource>>,
}

/// Owner of the held resource and the status indicator.
pub struct LifecycleController {
    host: Arc<dyn ForegroundHost>,
    notice: ForegroundNotice,
    tag: String,
    state: Mutex<State>,
    bus: Bus,
}

impl LifecycleController {
    pub fn new(
        host: Arc<dyn ForegroundHost>,
        notice: ForegroundNotice,
        tag: impl Into<String>,
        bus: Bus,
    ) -> Self {
        Self {
            host,
            notice,
            tag: tag.into(),
            state: Mutex::new(State {
                priority: Priority::Background,
                held: None,
            }),
            bus,
        }
    }

    /// Raises the process to foreground priority.
    ///
    /// Returns `Ok(true)` if this call promoted, `Ok(false)` if already in
    /// foreground, and [`LifecycleError::ShutDown`] after shutdown.
    pub fn promote(&self) -> Result<bool, LifecycleError> {
        let mut st = self.state.lock();
        match st.priority {
            Priority::ShutDown => return Err(LifecycleError::ShutDown),
            Priority::Foreground => return Ok(false),
            Priority::Background => {}
        }

        st.held = Some(self.host.acquire(&self.tag));
        self.host.show_indicator(&self.notice);
        st.priority = Priority::Foreground;

        info!(host = self.host.name(), tag = %self.tag, "promoted to foreground");
        self.bus.publish(Event::new(EventKind::Promoted));
        Ok(true)
    }

    /// Drops back to background priority.
    ///
    /// Returns false if the process was not in foreground.
    pub fn demote(&self) -> bool {
        let mut st = self.state.lock();
        if st.priority != Priority::Foreground {
            return false;
        }
        self.release(&mut st);
        st.priority = Priority::Background;

        info!(host = self.host.name(), "demoted to background");
        self.bus.publish(Event::new(EventKind::Demoted));
        true
    }

    /// Shuts the controller down, releasing anything held.
    ///
    /// Returns false if it was already shut down.
    pub fn shutdown(&self) -> bool {
        let mut st = self.state.lock();
        if st.priority == Priority::ShutDown {
            debug!("lifecycle already shut down");
            return false;
        }
        if st.priority == Priority::Foreground {
            self.release(&mut st);
        }
        st.priority = Priority::ShutDown;

        info!(host = self.host.name(), "lifecycle shut down");
        self.bus.publish(Event::new(EventKind::LifecycleShutdown));
        true
    }

    /// Current priority.
    pub fn priority(&self) -> Priority {
        self.state.lock().priority
    }

    fn release(&self, st: &mut State) {
        if let Some(mut held) = st.held.take() {
            if held.is_held() {
                held.release();
            }
        }
        self.host.hide_indicator();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        acquired: AtomicUsize,
        released: Arc<AtomicUsize>,
        shown: AtomicUsize,
        hidden: AtomicUsize,
    }

    struct Guard {
        held: bool,
        released: Arc<AtomicUsize>,
    }

    impl HeldResource for Guard {
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

    impl ForegroundHost for Counting {
        fn acquire(&self, tag: &str) -> Box<dyn HeldResource> {
            assert_eq!(tag, "test::LOCK");
            self.acquired.fetch_add(1, Ordering::SeqCst);
            Box::new(Guard {
                held: true,
                released: Arc::clone(&self.released),
            })
        }

        fn show_indicator(&self, notice: &ForegroundNotice) {
            assert_eq!(notice.title, ForegroundNotice::default().title);
            self.shown.fetch_add(1, Ordering::SeqCst);
        }

        fn hide_indicator(&self) {
            self.hidden.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn controller() -> (LifecycleController, Arc<Counting>) {
        let host = Arc::new(Counting::default());
        let lc = LifecycleController::new(
            host.clone(),
            ForegroundNotice::default(),
            "test::LOCK",
            Bus::new(16),
        );
        (lc, host)
    }

    #[test]
    fn test_promote_then_demote_releases() {
        let (lc, host) = controller();
        assert_eq!(lc.promote(), Ok(true));
        assert_eq!(lc.promote(), Ok(false));
        assert_eq!(lc.priority(), Priority::Foreground);
        assert_eq!(host.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(host.shown.load(Ordering::SeqCst), 1);

        assert!(lc.demote());
        assert!(!lc.demote());
        assert_eq!(lc.priority(), Priority::Background);
        assert_eq!(host.released.load(Ordering::SeqCst), 1);
        assert_eq!(host.hidden.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (lc, host) = controller();
        lc.promote().unwrap();

        assert!(lc.shutdown());
        assert!(!lc.shutdown());
        assert!(!lc.shutdown());
        assert_eq!(lc.priority(), Priority::ShutDown);
        assert_eq!(host.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_promote_after_shutdown_fails() {
        let (lc, host) = controller();
        lc.shutdown();
        assert_eq!(lc.promote(), Err(LifecycleError::ShutDown));
        assert!(!lc.demote());
        assert_eq!(host.acquired.load(Ordering::SeqCst), 0);
    }
}
