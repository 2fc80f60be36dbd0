//! Integration tests for registrations and reboot recovery.
//!
//! These tests verify:
//! - register/unregister persist only what the monitor accepted
//! - replay after a simulated restart re-issues exactly the stored regions
//! - malformed records are skipped but kept
//! - the file backend survives a "new process" opening the same path
//!
//! Run with: `cargo test --test registrations`

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{HANDLE, FakeMonitor, coordinator, record};
use fencevisor::{
    Config, Coordinator, DispatchState, FileBackend, MemoryBackend, Namespace,
    RegistrationError, StoreBackend, StoreError, Transition, TransitionMask,
};

/// Passes commits through to `inner`, except the `fail_at`-th one.
struct FailNthCommit {
    inner: MemoryBackend,
    commits: AtomicUsize,
    fail_at: usize,
}

impl StoreBackend for FailNthCommit {
    fn load(&self) -> Result<Namespace, StoreError> {
        self.inner.load()
    }

    fn commit(&self, ns: &Namespace) -> Result<(), StoreError> {
        if self.commits.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_at {
            return Err(StoreError::unavailable("disk gone"));
        }
        self.inner.commit(ns)
    }
}

// ============================================================================
// register / unregister
// ============================================================================

#[tokio::test]
async fn test_register_persists_on_success() {
    let backend = MemoryBackend::new();
    let monitor = FakeMonitor::new();
    let coord = coordinator(&backend, &monitor, None);

    coord.register(&record("home")).await.unwrap();
    coord.register(&record("work")).await.unwrap();

    assert_eq!(coord.registered_ids(), vec!["home", "work"]);
    assert_eq!(monitor.registered_ids(), vec!["home", "work"]);

    let regions = coord.registered_regions();
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].id, "home");
    assert_eq!(regions[0].radius_meters, 150.0);

    // durable: visible through the backend itself
    assert_eq!(backend.snapshot().live_ids().len(), 2);
}

#[tokio::test]
async fn test_register_failure_persists_nothing() {
    let backend = MemoryBackend::new();
    let monitor = FakeMonitor::new();
    monitor.refuse("home");
    let coord = coordinator(&backend, &monitor, None);

    let err = coord.register(&record("home")).await.unwrap_err();
    assert_eq!(
        err,
        RegistrationError::ExternalServiceFailure {
            reason: "permission denied".to_string()
        }
    );
    assert!(coord.registered_ids().is_empty());
    assert!(backend.snapshot().is_empty());
}

#[tokio::test]
async fn test_register_rejects_invalid_record_before_monitor() {
    let backend = MemoryBackend::new();
    let monitor = FakeMonitor::new();
    let coord = coordinator(&backend, &monitor, None);

    let mut bad = record("zero");
    bad.radius_meters = 0.0;
    let err = coord.register(&bad).await.unwrap_err();
    assert_eq!(err.as_label(), "registration_invalid");
    assert!(monitor.registered_ids().is_empty());
    assert!(coord.registered_ids().is_empty());
}

#[tokio::test]
async fn test_register_store_failure_is_surfaced() {
    let backend = MemoryBackend::new();
    let monitor = FakeMonitor::new();
    let coord = coordinator(&backend, &monitor, None);

    backend.fail_commits(true);
    let err = coord.register(&record("home")).await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Store(StoreError::Unavailable { .. })
    ));
    assert!(coord.registered_ids().is_empty());
}

#[tokio::test]
async fn test_duplicate_register_overwrites() {
    let backend = MemoryBackend::new();
    let monitor = FakeMonitor::new();
    let coord = coordinator(&backend, &monitor, None);

    coord.register(&record("home")).await.unwrap();
    let mut moved = record("home");
    moved.radius_meters = 300.0;
    coord.register(&moved).await.unwrap();

    assert_eq!(coord.registered_ids(), vec!["home"]);
    assert_eq!(coord.registered_regions()[0].radius_meters, 300.0);
}

/// Initial triggers outside the watched set are logged, not rejected.
#[tokio::test]
async fn test_register_accepts_unwatched_initial_triggers() {
    let backend = MemoryBackend::new();
    let monitor = FakeMonitor::new();
    let coord = coordinator(&backend, &monitor, None);

    let rec = record("home").with_initial_triggers(TransitionMask::from(Transition::Dwell));
    coord.register(&rec).await.unwrap();
    assert_eq!(monitor.registered_ids(), vec!["home"]);
    assert_eq!(coord.registered_ids(), vec!["home"]);
}

#[tokio::test]
async fn test_unregister_removes_only_on_success() {
    let backend = MemoryBackend::new();
    let monitor = FakeMonitor::new();
    let coord = coordinator(&backend, &monitor, None);
    coord.register(&record("home")).await.unwrap();
    coord.register(&record("work")).await.unwrap();

    monitor.refuse_all(true);
    let err = coord.unregister(&["home".to_string()]).await.unwrap_err();
    assert_eq!(err.as_label(), "registration_external_failure");
    assert_eq!(coord.registered_ids(), vec!["home", "work"]);

    monitor.refuse_all(false);
    coord
        .unregister(&["home".to_string(), "unknown".to_string()])
        .await
        .unwrap();
    assert_eq!(coord.registered_ids(), vec!["work"]);
    assert_eq!(
        monitor.unregistered.lock().last().cloned(),
        Some(vec!["home".to_string(), "unknown".to_string()])
    );

    // empty request never reaches the monitor
    coord.unregister(&[]).await.unwrap();
    assert_eq!(monitor.unregistered.lock().len(), 1);
}

/// Whichever commit fails, an unregister either removes every id or none.
#[tokio::test]
async fn test_unregister_store_failure_is_all_or_nothing() {
    let ids = vec!["a".to_string(), "b".to_string()];
    // commits 1 and 2 are the registers
    for fail_at in [3, 4] {
        let backend = MemoryBackend::new();
        let monitor = FakeMonitor::new();
        let coord = Coordinator::builder(common::config(), monitor.clone())
            .with_backend(Arc::new(FailNthCommit {
                inner: backend.clone(),
                commits: AtomicUsize::new(0),
                fail_at,
            }))
            .build()
            .unwrap();
        coord.register(&record("a")).await.unwrap();
        coord.register(&record("b")).await.unwrap();

        let res = coord.unregister(&ids).await;
        let stored = backend.snapshot().live_ids().into_iter().collect::<Vec<_>>();
        match res {
            Ok(()) => assert!(stored.is_empty(), "fail_at={fail_at}: {stored:?}"),
            Err(e) => {
                assert!(matches!(e, RegistrationError::Store(StoreError::Unavailable { .. })));
                assert_eq!(stored, ids, "fail_at={fail_at}");
                assert_eq!(coord.registered_ids(), ids);
            }
        }
        assert_eq!(*monitor.unregistered.lock(), vec![ids.clone()]);
    }
}

// ============================================================================
// Reboot recovery
// ============================================================================

/// Register, "restart" (fresh coordinator over the same backend), replay.
#[tokio::test]
async fn test_restart_replays_each_stored_region_once() {
    let backend = MemoryBackend::new();
    let before = FakeMonitor::new();
    let coord = coordinator(&backend, &before, None);
    coord.initialize(HANDLE).unwrap();
    coord.register(&record("home")).await.unwrap();
    coord.shutdown().await.unwrap();
    drop(coord);

    let after = FakeMonitor::new();
    let coord = coordinator(&backend, &after, None);
    assert_eq!(coord.dispatch_state(), DispatchState::NotStarted);
    assert_eq!(coord.dispatch_handle(), Some(HANDLE));

    let report = coord.on_restart_completed().await;
    assert_eq!(report.live, 1);
    assert_eq!(report.registered, vec!["home"]);
    assert!(report.is_complete());
    assert_eq!(*after.registered.lock(), vec![record("home")]);

    // replay does not write
    assert_eq!(coord.registered_ids(), vec!["home"]);
}

#[tokio::test]
async fn test_replay_is_repeatable_and_skips_malformed() {
    let mut ns = Namespace::new();
    for id in ["a", "b", "d"] {
        ns.insert_record(id, serde_json::to_string(&record(id)).unwrap());
    }
    ns.insert_record("c", "{not json".to_string());
    let backend = MemoryBackend::with_namespace(ns);

    let monitor = FakeMonitor::new();
    let coord = coordinator(&backend, &monitor, None);

    let first = coord.on_restart_completed().await;
    let calls_first = monitor.registered.lock().clone();
    monitor.registered.lock().clear();
    let second = coord.on_restart_completed().await;
    let calls_second = monitor.registered.lock().clone();

    assert_eq!(first, second);
    assert_eq!(calls_first, calls_second);
    assert_eq!(first.registered, vec!["a", "b", "d"]);
    assert_eq!(first.skipped, vec!["c"]);
    assert!(!first.is_complete());

    // malformed id is kept for a later attempt
    assert_eq!(coord.registered_ids(), vec!["a", "b", "c", "d"]);
    assert_eq!(coord.registered_regions().len(), 3);
}

/// A live id whose record key is gone is skipped but stays live.
#[tokio::test]
async fn test_replay_skips_live_id_without_record() {
    let a = serde_json::to_string(&record("a")).unwrap();
    let c = serde_json::to_string(&record("c")).unwrap();
    let ns: Namespace = serde_json::from_value(serde_json::json!({
        "persistent_geofences_ids": { "id_set": ["a", "ghost", "c"] },
        "persistent_geofence/a": { "text": a },
        "persistent_geofence/c": { "text": c },
    }))
    .unwrap();
    let backend = MemoryBackend::with_namespace(ns);

    let monitor = FakeMonitor::new();
    let coord = coordinator(&backend, &monitor, None);
    let report = coord.on_restart_completed().await;

    assert_eq!(report.live, 3);
    assert_eq!(report.registered, vec!["a", "c"]);
    assert_eq!(report.skipped, vec!["ghost"]);
    assert!(report.failed.is_empty());
    assert_eq!(monitor.registered_ids(), vec!["a", "c"]);

    assert_eq!(coord.registered_ids(), vec!["a", "c", "ghost"]);
    assert_eq!(coord.registered_regions().len(), 2);
}

#[tokio::test]
async fn test_replay_continues_past_monitor_failure() {
    let backend = MemoryBackend::new();
    let setup = FakeMonitor::new();
    let coord = coordinator(&backend, &setup, None);
    for id in ["a", "b", "c"] {
        coord.register(&record(id)).await.unwrap();
    }

    let flaky = FakeMonitor::new();
    flaky.refuse("b");
    let coord = coordinator(&backend, &flaky, None);
    let report = coord.on_restart_completed().await;

    assert_eq!(report.registered, vec!["a", "c"]);
    assert_eq!(
        report.failed,
        vec![("b".to_string(), "permission denied".to_string())]
    );
    assert_eq!(coord.registered_ids(), vec!["a", "b", "c"]);
}

// ============================================================================
// File backend
// ============================================================================

#[tokio::test]
async fn test_file_backed_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("registrations.json");
    let cfg = Config::default().with_store_path(&path);

    let coord = Coordinator::builder(cfg.clone(), FakeMonitor::new())
        .build()
        .unwrap();
    coord.initialize(HANDLE).unwrap();
    coord.register(&record("home")).await.unwrap();
    coord.shutdown().await.unwrap();
    drop(coord);
    assert!(path.exists());

    let monitor = FakeMonitor::new();
    let coord = Coordinator::builder(cfg, monitor.clone())
        .with_backend(Arc::new(FileBackend::new(&path)))
        .build()
        .unwrap();
    assert_eq!(coord.dispatch_handle(), Some(HANDLE));
    assert_eq!(coord.registered_ids(), vec!["home"]);
    coord.on_restart_completed().await;
    assert_eq!(monitor.registered_ids(), vec!["home"]);
}

#[tokio::test]
async fn test_unreadable_store_fails_build() {
    let backend = MemoryBackend::new();
    backend.fail_loads(true);
    let res = Coordinator::builder(Config::default(), FakeMonitor::new())
        .with_backend(Arc::new(backend))
        .build();
    assert!(matches!(res, Err(StoreError::Unavailable { .. })));
}
