//! # Coordinator configuration.
//!
//! Provides [`Config`] centralized settings for the coordinator and the
//! lifecycle controller it owns, plus [`ForegroundNotice`], the content of
//! the persistent status indicator shown while the process is promoted.
//!
//! ## Sentinel values
//! - `grace = 0s` → teardown does not wait for the background context
//! - `bus_capacity = 0` → clamped to 1

use std::path::PathBuf;
use std::time::Duration;

/// Content of the status indicator presented on promotion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForegroundNotice {
    /// Stable id of the notification channel.
    pub channel_id: String,
    /// User-visible channel name.
    pub channel_name: String,
    /// Indicator title.
    pub title: String,
    /// Indicator body.
    pub text: String,
}

impl Default for ForegroundNotice {
    fn default() -> Self {
        Self {
            channel_id: "fencevisor_channel".to_string(),
            channel_name: "Geofence monitoring".to_string(),
            title: "Geofence tracking active".to_string(),
            text: "Fine location tracking enabled.".to_string(),
        }
    }
}

/// Global configuration for the coordinator.
///
/// ## Field semantics
/// - `store_path`: file backing the default [`FileBackend`](crate::FileBackend)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `grace`: maximum wait for the background context during teardown (`0s` = no wait)
/// - `notice`: indicator shown by [`LifecycleController::promote`](crate::LifecycleController::promote)
/// - `wake_lock_tag`: tag passed to the host when acquiring the held resource
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Location of the durable registration namespace.
    ///
    /// Only used when no explicit backend is given to the builder.
    pub store_path: PathBuf,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Maximum time teardown waits for the background context to exit
    /// before aborting it.
    pub grace: Duration,

    /// Persistent status indicator content.
    pub notice: ForegroundNotice,

    /// Tag of the held resource acquired while promoted.
    pub wake_lock_tag: String,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the teardown grace period as an `Option`.
    ///
    /// - `None` → abort the background context immediately
    /// - `Some(d)` → wait up to `d`
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Default store location: `<data_local_dir>/fencevisor/registrations.json`,
    /// or the working directory when the platform has no data directory.
    pub fn default_store_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fencevisor")
            .join("registrations.json")
    }

    /// Returns a copy with a different store path.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `store_path = Config::default_store_path()`
    /// - `bus_capacity = 1024`
    /// - `grace = 5s`
    /// - `notice = ForegroundNotice::default()`
    /// - `wake_lock_tag = "fencevisor::WAKE_LOCK"`
    fn default() -> Self {
        Self {
            store_path: Self::default_store_path(),
            bus_capacity: 1024,
            grace: Duration::from_secs(5),
            notice: ForegroundNotice::default(),
            wake_lock_tag: "fencevisor::WAKE_LOCK".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        let mut cfg = Config::default();
        cfg.bus_capacity = 0;
        cfg.grace = Duration::ZERO;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.grace_period(), None);
    }

    #[test]
    fn test_default_store_path_is_namespaced() {
        let path = Config::default_store_path();
        assert!(path.ends_with("fencevisor/registrations.json"));
    }
}
