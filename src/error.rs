//! Error types used by the fencevisor coordinator.
//!
//! This module defines the error enums for each failure domain:
//!
//! - [`StoreError`]: the persistent registration store failed or returned garbage.
//! - [`BootstrapError`]: the background context could not be started.
//! - [`MonitorError`]: the external region monitor rejected a request.
//! - [`RegistrationError`]: a `register`/`unregister` call failed end to end.
//! - [`LifecycleError`]: a priority change was requested after shutdown.
//! - [`RuntimeError`]: coordinator teardown did not finish in time, or signals could not be installed.
//! - [`ContextError`]: the background entrypoint failed.
//!
//! All types provide `as_label()` (stable snake_case, for logs/metrics) and
//! `as_message()` (human-readable detail).

use std::time::Duration;
use thiserror::Error;

use crate::regions::DispatchHandle;

/// # Errors produced by the persistent registration store.
///
/// `Unavailable` is fatal to the operation that hit it and is never partially
/// applied. `Malformed` is per-record: the record stays in the store and its
/// id stays in the live set.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The storage layer failed (I/O, encoding of the namespace, poisoned backend).
    #[error("registration store unavailable: {reason}")]
    Unavailable {
        /// Underlying failure.
        reason: String,
    },

    /// A stored record could not be decoded.
    #[error("stored record '{id}' is malformed: {reason}")]
    Malformed {
        /// Id of the offending record.
        id: String,
        /// Decoder message.
        reason: String,
    },
}

impl StoreError {
    /// Shorthand for [`StoreError::Unavailable`].
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        StoreError::Unavailable {
            reason: reason.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fencevisor::StoreError;
    ///
    /// let err = StoreError::unavailable("disk full");
    /// assert_eq!(err.as_label(), "store_unavailable");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Unavailable { .. } => "store_unavailable",
            StoreError::Malformed { .. } => "store_malformed_record",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StoreError::Unavailable { reason } => format!("unavailable: {reason}"),
            StoreError::Malformed { id, reason } => format!("malformed '{id}': {reason}"),
        }
    }
}

/// # Errors produced while starting the background context.
///
/// Both variants are fatal to one bootstrap attempt only. The synchronizer
/// stays in `NotStarted` and retries on the next event.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    /// No dispatch handle was ever persisted (`initialize()` never called).
    #[error("no dispatch target handle has been persisted")]
    NoDispatchTarget,

    /// The persisted handle does not name a known entrypoint.
    #[error("dispatch handle {handle} does not resolve to an entrypoint")]
    UnresolvedEntrypoint {
        /// The handle that failed to resolve.
        handle: DispatchHandle,
    },
}

impl BootstrapError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BootstrapError::NoDispatchTarget => "bootstrap_no_dispatch_target",
            BootstrapError::UnresolvedEntrypoint { .. } => "bootstrap_unresolved_entrypoint",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BootstrapError::NoDispatchTarget => "no dispatch target".to_string(),
            BootstrapError::UnresolvedEntrypoint { handle } => {
                format!("unresolved entrypoint: {handle}")
            }
        }
    }
}

/// # Failure reported by the external region monitor.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// The monitor refused or failed the request.
    #[error("region monitor rejected request: {reason}")]
    Rejected {
        /// Monitor-provided reason.
        reason: String,
    },
}

impl MonitorError {
    /// Shorthand for [`MonitorError::Rejected`].
    pub fn rejected(reason: impl Into<String>) -> Self {
        MonitorError::Rejected {
            reason: reason.into(),
        }
    }

    /// The monitor-provided reason.
    pub fn reason(&self) -> &str {
        match self {
            MonitorError::Rejected { reason } => reason,
        }
    }
}

/// # Errors returned to callers of `register` / `unregister`.
///
/// These are surfaced synchronously to whoever initiated the call and never
/// affect event delivery.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The record failed local validation (empty id, radius <= 0, no transitions).
    #[error("invalid registration '{id}'")]
    Invalid {
        /// Id of the rejected record.
        id: String,
    },

    /// The external service refused the call. Nothing was persisted or removed.
    #[error("external service failure: {reason}")]
    ExternalServiceFailure {
        /// Reason reported by the service.
        reason: String,
    },

    /// The service call succeeded but the store could not record it.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<MonitorError> for RegistrationError {
    fn from(e: MonitorError) -> Self {
        RegistrationError::ExternalServiceFailure {
            reason: e.reason().to_string(),
        }
    }
}

impl RegistrationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fencevisor::{MonitorError, RegistrationError};
    ///
    /// let err: RegistrationError = MonitorError::rejected("permission denied").into();
    /// assert_eq!(err.as_label(), "registration_external_failure");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistrationError::Invalid { .. } => "registration_invalid",
            RegistrationError::ExternalServiceFailure { .. } => "registration_external_failure",
            RegistrationError::Store(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RegistrationError::Invalid { id } => format!("invalid record '{id}'"),
            RegistrationError::ExternalServiceFailure { reason } => {
                format!("external failure: {reason}")
            }
            RegistrationError::Store(e) => e.as_message(),
        }
    }
}

/// # Errors produced by the lifecycle controller.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// The controller was shut down; promotion is no longer possible.
    #[error("lifecycle controller is shut down")]
    ShutDown,
}

/// # Errors produced by coordinator teardown.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The background context did not exit within the grace period and was aborted.
    #[error("shutdown timeout {grace:?} exceeded; background context aborted")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },

    /// Installing the OS signal handlers failed.
    #[error("signal handler registration failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fencevisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5) };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Signal(_) => "runtime_signal_failed",
        }
    }
}

/// # Errors returned by a background entrypoint.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The entrypoint failed.
    #[error("background context failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The entrypoint stopped because the coordinator was torn down.
    #[error("context cancelled")]
    Canceled,
}

impl ContextError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ContextError::Fail { .. } => "context_failed",
            ContextError::Canceled => "context_canceled",
        }
    }
}
