//! # Reboot recovery replay.
//!
//! After a restart the platform has forgotten every region it monitored. The
//! [`Replayer`] walks the live id set and re-issues one `register` per
//! decodable record. It never writes to the store and never touches the
//! dispatch path.
//!
//! ## Rules
//! - Missing or malformed record: skipped, id kept in the live set.
//! - Monitor failure for one id: reported, replay continues.
//! - Ids are visited in sorted order, so two replays over an unchanged store
//!   issue identical call sequences.

use std::sync::Arc;

use tracing::{info, warn};

use crate::events::{Bus, Event, EventKind};
use crate::monitor::RegionMonitor;
use crate::store::RegistrationStore;

/// Outcome of one [`Replayer::replay_all`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Size of the live set when replay started.
    pub live: usize,
    /// Ids re-registered with the monitor.
    pub registered: Vec<String>,
    /// Ids whose record was missing or malformed.
    pub skipped: Vec<String>,
    /// Ids the monitor refused, with its reason.
    pub failed: Vec<(String, String)>,
}

impl ReplayReport {
    /// True if every live id was re-registered.
    pub fn is_complete(&self) -> bool {
        self.registered.len() == self.live
    }
}

/// Re-registers persisted regions with the monitor.
pub(crate) struct Replayer {
    store: Arc<RegistrationStore>,
    monitor: Arc<dyn RegionMonitor>,
    bus: Bus,
}

impl Replayer {
    pub(crate) fn new(store: Arc<RegistrationStore>, monitor: Arc<dyn RegionMonitor>, bus: Bus) -> Self {
        Self { store, monitor, bus }
    }

    /// Replays every live registration, best effort.
    pub(crate) async fn replay_all(&self) -> ReplayReport {
        let ids = self.store.list_ids();
        let mut report = ReplayReport {
            live: ids.len(),
            ..ReplayReport::default()
        };
        info!(live = report.live, monitor = self.monitor.name(), "replaying registrations");
        self.bus
            .publish(Event::new(EventKind::ReplayStarted).with_count(report.live));

        for id in ids {
            let record = match self.store.get(&id) {
                Ok(Some(r)) => r,
                Ok(None) => {
                    warn!(region = %id, "live id has no record; skipping");
                    self.bus.publish(
                        Event::new(EventKind::ReplaySkipped)
                            .with_region(id.as_str())
                            .with_reason("missing"),
                    );
                    report.skipped.push(id);
                    continue;
                }
                Err(e) => {
                    warn!(region = %id, error = %e, "malformed record; skipping");
                    self.bus.publish(
                        Event::new(EventKind::ReplaySkipped)
                            .with_region(id.as_str())
                            .with_reason(e.as_label()),
                    );
                    report.skipped.push(id);
                    continue;
                }
            };

            match self.monitor.register(&record).await {
                Ok(()) => report.registered.push(id),
                Err(e) => {
                    warn!(region = %id, reason = e.reason(), "replay registration failed");
                    self.bus.publish(
                        Event::new(EventKind::ReplayFailed)
                            .with_region(id.as_str())
                            .with_reason(e.reason()),
                    );
                    report.failed.push((id, e.reason().to_string()));
                }
            }
        }

        info!(
            registered = report.registered.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "replay finished"
        );
        self.bus
            .publish(Event::new(EventKind::ReplayCompleted).with_count(report.registered.len()));
        report
    }
}
