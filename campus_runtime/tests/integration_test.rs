//! Integration tests for campus_runtime.
//!
//! All tests use temporary directories for isolation.

use std::fs;
use std::path::PathBuf;

use campus_ledger::error::LedgerError;
use campus_ledger::events::{EventEnvelope, Intent};
use campus_ledger::hashing::canonical_hash;
use campus_ledger::seed::seeded_state;

use campus_runtime::event_store::EventStore;
use campus_runtime::proto_bridge::{kernel_to_proto, proto_to_kernel};
use campus_runtime::router::ViewRouter;
use campus_runtime::session::Session;
use campus_runtime::snapshot_codec::{export_snapshot_to_file, import_snapshot_from_file};
use campus_runtime::{drift, replay, snapshot, SessionError};

/// Join/complete/redeem run from the seeded user, ending at 70 points.
fn scripted_events() -> Vec<EventEnvelope> {
    [
        Intent::join("A1"),
        Intent::toggle_save("A4"),
        Intent::complete("A1"),
        Intent::join("A2"),
        Intent::redeem("coffee", 100),
        Intent::redeem("coffee", 100),
        Intent::join("A2"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, intent)| EventEnvelope::new(i as u64 + 1, intent))
    .collect()
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("campus_runtime_tests").join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

// ─────────────────────────────────────────────────────────────
// Journal
// ─────────────────────────────────────────────────────────────

#[test]
fn journal_roundtrip_replays_to_same_hash() {
    let dir = temp_dir("journal_roundtrip");
    let events = scripted_events();
    let (state, expected) = replay::rebuild_state(&seeded_state(), &events).unwrap();
    assert_eq!(state.user.points, 70);

    let log_path = dir.join("events.log");
    {
        let mut store = EventStore::open(&log_path).unwrap();
        for evt in &events {
            store.append(&kernel_to_proto(evt)).unwrap();
        }
    }

    let store = EventStore::open(&log_path).unwrap();
    assert_eq!(store.last_sequence(), events.len() as u64);
    let loaded: Vec<EventEnvelope> = store
        .load_all()
        .unwrap()
        .iter()
        .map(|p| proto_to_kernel(p).unwrap())
        .collect();
    assert_eq!(loaded, events);
    assert_eq!(replay::rebuild_hash(&seeded_state(), &loaded).unwrap(), expected);
}

#[test]
fn corrupted_log_detection() {
    let dir = temp_dir("corrupted_log");
    let log_path = dir.join("events.log");
    {
        let mut store = EventStore::open(&log_path).unwrap();
        for evt in &scripted_events()[..3] {
            store.append(&kernel_to_proto(evt)).unwrap();
        }
    }

    let data = fs::read(&log_path).unwrap();
    fs::write(&log_path, &data[..data.len() - 3]).unwrap();

    assert!(EventStore::open(&log_path).is_err());
    // A session over the same directory refuses to open.
    let base = dir.parent().unwrap();
    assert!(matches!(
        Session::open(base, "corrupted_log", seeded_state(), 0),
        Err(SessionError::Io(_))
    ));
}

// ─────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────

#[test]
fn journaled_session_survives_reopen() {
    let dir = temp_dir("reopen");
    let live_hash = {
        let mut session = Session::open(&dir, "alice", seeded_state(), 0).unwrap();
        for evt in scripted_events() {
            session.apply(evt.intent).unwrap();
        }
        assert_eq!(session.state().user.points, 70);
        session.current_hash()
    };

    let mut reopened = Session::open(&dir, "alice", seeded_state(), 0).unwrap();
    assert_eq!(reopened.current_sequence(), scripted_events().len() as u64);
    assert_eq!(reopened.current_hash(), live_hash);

    let (_, replayed) = reopened.replay_full().unwrap();
    assert_eq!(replayed, live_hash);

    // Appending continues the sequence.
    reopened.apply(Intent::complete("A2")).unwrap();
    assert_eq!(reopened.state().user.points, 120);
    assert_eq!(reopened.journal_events().unwrap().len(), 8);
}

#[test]
fn sessions_are_isolated() {
    let dir = temp_dir("isolated");
    let mut a = Session::open(&dir, "session_a", seeded_state(), 0).unwrap();
    let mut b = Session::open(&dir, "session_b", seeded_state(), 0).unwrap();

    for evt in scripted_events() {
        a.apply(evt.intent).unwrap();
    }
    b.apply(Intent::join("A6")).unwrap();

    assert_ne!(a.current_hash(), b.current_hash());
    assert_eq!(b.current_sequence(), 1);
    assert!(b.state().user.has_joined("A6"));
    assert!(!a.state().user.has_joined("A6"));
}

#[test]
fn schema_version_rejection() {
    let dir = temp_dir("schema_rejection");
    let mut session = Session::open(&dir, "schema", seeded_state(), 0).unwrap();

    let mut bad = EventEnvelope::new(1, Intent::join("A1"));
    bad.schema_version = 99;
    let err = session.apply_event(&bad).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Ledger(LedgerError::SchemaVersion { expected: 1, got: 99 })
    ));

    // Nothing was journaled.
    assert!(session.journal_events().unwrap().is_empty());
    assert_eq!(session.current_hash(), canonical_hash(&seeded_state()));
}

// ─────────────────────────────────────────────────────────────
// Snapshots
// ─────────────────────────────────────────────────────────────

#[test]
fn snapshots_follow_interval_and_match_replay() {
    let dir = temp_dir("snapshot_interval");
    let events = scripted_events();
    let mut session = Session::open(&dir, "snap", seeded_state(), 3).unwrap();
    for evt in &events {
        session.apply(evt.intent.clone()).unwrap();
    }

    let snap_dir = session.snapshot_dir().unwrap();
    assert!(snapshot::load_snapshot(&snap_dir, 3).unwrap().is_some());
    assert!(snapshot::load_snapshot(&snap_dir, 4).unwrap().is_none());

    let latest = snapshot::load_latest_snapshot(&snap_dir).unwrap().unwrap();
    assert_eq!(latest.sequence, 6);
    let restored = snapshot::verify_snapshot(&latest).unwrap();
    let (_, prefix_hash) = replay::rebuild_state(&seeded_state(), &events[..6]).unwrap();
    assert_eq!(canonical_hash(&restored), prefix_hash);
}

#[test]
fn exported_state_imports_identically() {
    let dir = temp_dir("export_import");
    let (state, hash) = replay::rebuild_state(&seeded_state(), &scripted_events()).unwrap();
    let path = dir.join("state.json");
    export_snapshot_to_file(&state, &path).unwrap();
    let imported = import_snapshot_from_file(&path).unwrap();
    assert_eq!(canonical_hash(&imported), hash);
}

// ─────────────────────────────────────────────────────────────
// Drift and routing
// ─────────────────────────────────────────────────────────────

#[test]
fn drift_between_seed_and_run() {
    let events = scripted_events();
    let hash = drift::verify_determinism(&seeded_state(), &events).unwrap();
    let (end, end_hash) = replay::rebuild_state(&seeded_state(), &events).unwrap();
    assert_eq!(hash, end_hash);

    let diff = drift::compare_states(&seeded_state(), &end);
    assert_eq!(diff.points_delta, -50);
    assert_eq!(diff.completed_added, vec!["A1"]);
    assert_eq!(diff.joined_added, vec!["A2"]);
    assert_eq!(diff.new_redemptions, vec!["coffee"]);
    assert_eq!(
        diff.registration_deltas,
        vec![("A1".to_string(), 1), ("A2".to_string(), 1)]
    );
}

#[test]
fn router_drives_a_journaled_session() {
    let dir = temp_dir("router");
    let mut session = Session::open(&dir, "ui", seeded_state(), 0).unwrap();
    let view = ViewRouter::new(session.state().user.role);

    let join = view.dispatch(&mut session, Intent::join("A1")).unwrap();
    assert_eq!(join.notice.as_deref(), Some("报名成功！"));
    let again = view.dispatch(&mut session, Intent::join("A1")).unwrap();
    assert_eq!(again.notice.as_deref(), Some("报名成功！"));
    assert!(!again.result.applied);

    view.dispatch(&mut session, Intent::complete("A1")).unwrap();
    let redeem = view.redeem_listed(&mut session, "coffee").unwrap().unwrap();
    assert!(redeem.result.applied);
    assert_eq!(session.state().user.points, 70);

    let reopened = Session::open(&dir, "ui", seeded_state(), 0).unwrap();
    assert_eq!(reopened.current_hash(), session.current_hash());
}
