//! # External region monitor.
//!
//! [`RegionMonitor`] is the boundary to the platform's transition-detection
//! service. The coordinator calls it on `register` / `unregister` and during
//! reboot replay; the platform later reports transitions back through
//! [`Coordinator::on_event`](crate::Coordinator::on_event).
//!
//! Calls are async and report completion through their `Result`; the
//! coordinator never holds the dispatch lock or the store lock across them.

use async_trait::async_trait;

use crate::error::MonitorError;
use crate::regions::RegistrationRecord;

/// Platform transition-detection service.
#[async_trait]
pub trait RegionMonitor: Send + Sync + 'static {
    /// Starts monitoring `record`.
    async fn register(&self, record: &RegistrationRecord) -> Result<(), MonitorError>;

    /// Stops monitoring every region in `ids`.
    async fn unregister(&self, ids: &[String]) -> Result<(), MonitorError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
