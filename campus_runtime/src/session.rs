//! Sessions: one user's ledger plus, optionally, its journal.
//!
//! In-memory sessions do no I/O. Journaled sessions live under
//!   <base_dir>/<session_id>/events.log
//!   <base_dir>/<session_id>/snapshots/
//!
//! Apply-before-persist order:
//!   1. engine.apply_event(envelope)  (protocol faults stop here)
//!   2. journal append                (failure rewinds step 1)
//!   3. snapshot if the interval is reached (failure is logged only)

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use campus_ledger::domain::{LedgerState, TransitionResult};
use campus_ledger::engine::LedgerEngine;
use campus_ledger::events::{EventEnvelope, Intent};
use campus_ledger::hashing::canonical_hash;

use crate::error::SessionError;
use crate::event_store::EventStore;
use crate::proto_bridge::{kernel_to_proto, proto_to_kernel};
use crate::replay;
use crate::snapshot;

const IN_MEMORY_ID: &str = "in-memory";

struct Journal {
    dir: PathBuf,
    store: EventStore,
    snapshot_interval: u64,
}

pub struct Session {
    session_id: String,
    engine: LedgerEngine,
    journal: Option<Journal>,
}

impl Session {
    /// A session that lives only as long as this value.
    pub fn in_memory(seed: LedgerState) -> Result<Self, SessionError> {
        Ok(Self {
            session_id: IN_MEMORY_ID.to_string(),
            engine: LedgerEngine::new(seed)?,
            journal: None,
        })
    }

    /// Open (or create) a journaled session, replaying whatever the
    /// journal already holds. `snapshot_interval == 0` disables snapshots.
    pub fn open(
        base_dir: &Path,
        session_id: &str,
        seed: LedgerState,
        snapshot_interval: u64,
    ) -> Result<Self, SessionError> {
        let dir = base_dir.join(session_id);
        let store = EventStore::open(&dir.join("events.log"))?;

        let mut engine = LedgerEngine::new(seed)?;
        let events = load_envelopes(&store)?;
        engine.apply_sequence(&events)?;
        info!(
            session = session_id,
            events = events.len(),
            hash = %canonical_hash(engine.state()),
            "session opened"
        );

        Ok(Self {
            session_id: session_id.to_string(),
            engine,
            journal: Some(Journal {
                dir,
                store,
                snapshot_interval,
            }),
        })
    }

    /// Wrap `intent` in the next envelope and apply it.
    pub fn apply(&mut self, intent: Intent) -> Result<TransitionResult, SessionError> {
        let envelope = EventEnvelope::new(self.engine.last_sequence() + 1, intent);
        self.apply_event(&envelope)
    }

    /// Apply an externally sequenced envelope.
    ///
    /// A failed journal append rewinds the engine to where it stood
    /// before this envelope and returns the error. A failed snapshot
    /// is only logged: the event is already applied and journaled.
    pub fn apply_event(&mut self, envelope: &EventEnvelope) -> Result<TransitionResult, SessionError> {
        let before = self
            .journal
            .is_some()
            .then(|| (self.engine.state().clone(), self.engine.last_sequence()));
        let (_, result) = self.engine.apply_event(envelope)?;

        let (Some(journal), Some((state, sequence))) = (self.journal.as_mut(), before) else {
            return Ok(result);
        };

        if let Err(e) = journal.store.append(&kernel_to_proto(envelope)) {
            warn!(session = %self.session_id, sequence = envelope.sequence, error = %e, "journal append failed");
            self.engine.rewind(state, sequence);
            return Err(e.into());
        }

        if journal.snapshot_interval > 0 && envelope.sequence % journal.snapshot_interval == 0 {
            let dir = journal.dir.join("snapshots");
            if let Err(e) = snapshot::save_snapshot(&dir, envelope.sequence, self.engine.state()) {
                warn!(session = %self.session_id, sequence = envelope.sequence, error = %e, "snapshot failed");
            }
        }

        Ok(result)
    }

    /// Rebuild the engine from the journal and return the replayed state
    /// and hash. In-memory sessions have nothing to replay from and keep
    /// their state.
    pub fn replay_full(&mut self) -> Result<(LedgerState, String), SessionError> {
        let Some(journal) = self.journal.as_ref() else {
            let state = self.engine.state().clone();
            let hash = canonical_hash(&state);
            return Ok((state, hash));
        };

        let events = load_envelopes(&journal.store)?;
        let (state, hash) = replay::rebuild_state(self.engine.seed(), &events)?;
        self.engine.replay(&events)?;
        Ok((state, hash))
    }

    pub fn state(&self) -> &LedgerState {
        self.engine.state()
    }

    pub fn seed(&self) -> &LedgerState {
        self.engine.seed()
    }

    pub fn current_hash(&self) -> String {
        canonical_hash(self.engine.state())
    }

    pub fn current_sequence(&self) -> u64 {
        self.engine.last_sequence()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_journaled(&self) -> bool {
        self.journal.is_some()
    }

    /// Snapshot directory of a journaled session.
    pub fn snapshot_dir(&self) -> Option<PathBuf> {
        self.journal.as_ref().map(|j| j.dir.join("snapshots"))
    }

    /// Every envelope in the journal (empty for in-memory sessions).
    pub fn journal_events(&self) -> Result<Vec<EventEnvelope>, SessionError> {
        match self.journal.as_ref() {
            Some(j) => load_envelopes(&j.store),
            None => Ok(Vec::new()),
        }
    }
}

fn load_envelopes(store: &EventStore) -> Result<Vec<EventEnvelope>, SessionError> {
    store
        .load_all()?
        .iter()
        .map(|p| proto_to_kernel(p).map_err(SessionError::from))
        .collect()
}

/// Mutex-guarded session: each `apply` is one serialised transaction.
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    pub fn apply(&self, intent: Intent) -> Result<TransitionResult, SessionError> {
        self.with(|s| s.apply(intent))
    }

    pub fn current_hash(&self) -> String {
        self.with(|s| s.current_hash())
    }

    pub fn current_sequence(&self) -> u64 {
        self.with(|s| s.current_sequence())
    }

    pub fn state(&self) -> LedgerState {
        self.with(|s| s.state().clone())
    }

    /// Run `f` under the session lock. A poisoned lock is recovered: the
    /// engine never leaves a half-applied state behind.
    pub fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use campus_ledger::seed::seeded_state;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("campus_session_tests").join(name);
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn snapshot_failure_keeps_the_applied_event() {
        let base = scratch("snapshot_failure");
        let mut s = Session::open(&base, "s", seeded_state(), 1).unwrap();
        // A regular file where the snapshot directory belongs.
        fs::write(s.snapshot_dir().unwrap(), b"not a dir").unwrap();

        let result = s.apply(Intent::redeem("coffee", 100)).unwrap();
        assert!(result.applied);
        assert_eq!(s.state().user.points, 20);
        assert_eq!(s.current_sequence(), 1);
        assert_eq!(s.journal_events().unwrap().len(), 1);

        // The caller saw success, so there is no retry to spend twice.
        let reopened = Session::open(&base, "s", seeded_state(), 0).unwrap();
        assert_eq!(reopened.state().user.redeemed_rewards, vec!["coffee"]);
    }

    #[test]
    fn failed_append_rewinds_without_reading_the_journal() {
        let base = scratch("append_failure");
        let mut s = Session::open(&base, "s", seeded_state(), 0).unwrap();
        s.apply(Intent::join("A1")).unwrap();
        let hash_after_join = s.current_hash();

        let log = base.join("s").join("events.log");
        let saved = fs::read(&log).unwrap();
        fs::remove_file(&log).unwrap();
        fs::create_dir(&log).unwrap();

        let err = s.apply(Intent::complete("A1")).unwrap_err();
        assert!(matches!(err, SessionError::Io(_)));
        assert_eq!(s.state().user.points, 120);
        assert_eq!(s.current_sequence(), 1);
        assert_eq!(s.current_hash(), hash_after_join);

        // Once the journal is back, the session carries on at sequence 2.
        fs::remove_dir(&log).unwrap();
        fs::write(&log, saved).unwrap();
        assert!(s.apply(Intent::complete("A1")).unwrap().applied);
        assert_eq!(s.current_sequence(), 2);
        assert_eq!(s.state().user.points, 170);

        let reopened = Session::open(&base, "s", seeded_state(), 0).unwrap();
        assert_eq!(reopened.current_hash(), s.current_hash());
    }

    #[test]
    fn in_memory_sequences_include_noops() {
        let mut s = Session::in_memory(seeded_state()).unwrap();
        assert!(!s.apply(Intent::complete("A1")).unwrap().applied);
        assert!(s.apply(Intent::join("A1")).unwrap().applied);
        assert_eq!(s.current_sequence(), 2);
        assert!(!s.is_journaled());
        assert!(s.journal_events().unwrap().is_empty());
    }

    #[test]
    fn external_envelope_out_of_order_is_rejected() {
        let mut s = Session::in_memory(seeded_state()).unwrap();
        let err = s.apply_event(&EventEnvelope::new(5, Intent::join("A1"))).unwrap_err();
        assert!(matches!(err, SessionError::Ledger(_)));
        assert_eq!(s.state(), s.seed());
    }

    #[test]
    fn shared_session_serialises_writers() {
        let shared = std::sync::Arc::new(SharedSession::new(
            Session::in_memory(seeded_state()).unwrap(),
        ));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.apply(Intent::join("A2")).unwrap().applied)
            })
            .collect();
        let applied = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|a| *a)
            .count();

        assert_eq!(applied, 1);
        assert_eq!(shared.current_sequence(), 4);
        let a2 = shared.state().catalog.get("A2").unwrap().registered_count;
        assert_eq!(a2, seeded_state().catalog.get("A2").unwrap().registered_count + 1);
    }
}
