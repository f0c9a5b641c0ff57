//! Session store — ordered append/query/delete log of practice sessions.
//!
//! The whole log lives as one JSON array under a single key. Every operation
//! is total: read problems degrade to an empty log, write problems are logged
//! and reported through [`WriteOutcome`] instead of an error. Individual
//! records that fail to decode are skipped on read, and their presence blocks
//! writes so they are never silently dropped.

use std::sync::{Arc, Mutex};

use crate::kv::KeyValueStore;
use crate::models::{Session, SessionKind, SessionStats};

/// Key holding the serialized session array.
pub const SESSIONS_KEY: &str = "weebot_sessions";

/// Result of a mutating store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The log was rewritten.
    Written,
    /// Nothing to change (e.g. deleting an unknown id); no write issued.
    Unchanged,
    /// No persistence substrate is attached.
    Unavailable,
    /// The substrate refused the read or write. The log is left as it was.
    Failed { reason: String },
}

impl WriteOutcome {
    /// True when the log is in the state the caller asked for.
    pub fn is_ok(&self) -> bool {
        matches!(self, WriteOutcome::Written | WriteOutcome::Unchanged)
    }
}

pub struct SessionStore {
    kv: Option<Arc<dyn KeyValueStore>>,
    // Serializes read-modify-write cycles issued through this handle
    write_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv: Some(kv),
            write_lock: Mutex::new(()),
        }
    }

    /// A store with no persistence behind it: reads are empty, writes report
    /// [`WriteOutcome::Unavailable`].
    pub fn detached() -> Self {
        Self {
            kv: None,
            write_lock: Mutex::new(()),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.kv.is_some()
    }

    /// All sessions in insertion order.
    pub fn sessions(&self) -> Vec<Session> {
        let Some(kv) = self.kv.as_deref() else {
            return Vec::new();
        };
        match load(kv) {
            Ok(log) => log.sessions,
            Err(e) => {
                tracing::warn!(backend = kv.name(), error = %e, "Failed to read sessions");
                Vec::new()
            }
        }
    }

    /// Append one session. No validation and no uniqueness check.
    pub fn save_session(&self, session: Session) -> WriteOutcome {
        let Some(kv) = self.kv.as_deref() else {
            return WriteOutcome::Unavailable;
        };
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut sessions = match load(kv).and_then(SessionLog::into_writable) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(backend = kv.name(), error = %e, "Error saving session to storage");
                return WriteOutcome::Failed { reason: e };
            }
        };

        let id = session.id().to_string();
        sessions.push(session);

        let outcome = persist(kv, &sessions);
        match &outcome {
            WriteOutcome::Written => {
                tracing::debug!(id = %id, total = sessions.len(), "Session saved")
            }
            WriteOutcome::Failed { reason } => {
                tracing::error!(id = %id, error = %reason, "Error saving session to storage")
            }
            _ => {}
        }
        outcome
    }

    /// First session with the given id.
    pub fn session_by_id(&self, id: &str) -> Option<Session> {
        self.sessions().into_iter().find(|s| s.id() == id)
    }

    /// Sessions of one kind, order preserved.
    pub fn sessions_by_kind(&self, kind: SessionKind) -> Vec<Session> {
        self.sessions()
            .into_iter()
            .filter(|s| s.kind() == kind)
            .collect()
    }

    /// Remove every session with the given id. Unknown ids are a no-op.
    pub fn delete_session(&self, id: &str) -> WriteOutcome {
        let Some(kv) = self.kv.as_deref() else {
            return WriteOutcome::Unavailable;
        };
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let sessions = match load(kv).and_then(SessionLog::into_writable) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(backend = kv.name(), error = %e, "Error deleting session from storage");
                return WriteOutcome::Failed { reason: e };
            }
        };

        let before = sessions.len();
        let remaining: Vec<Session> = sessions.into_iter().filter(|s| s.id() != id).collect();
        if remaining.len() == before {
            return WriteOutcome::Unchanged;
        }

        let outcome = persist(kv, &remaining);
        match &outcome {
            WriteOutcome::Written => tracing::debug!(
                id = %id,
                removed = before - remaining.len(),
                "Session deleted"
            ),
            WriteOutcome::Failed { reason } => {
                tracing::error!(id = %id, error = %reason, "Error deleting session from storage")
            }
            _ => {}
        }
        outcome
    }

    /// Aggregates over all sessions, or over one kind when given.
    pub fn stats(&self, kind: Option<SessionKind>) -> SessionStats {
        let sessions = match kind {
            Some(k) => self.sessions_by_kind(k),
            None => self.sessions(),
        };
        SessionStats::from_sessions(&sessions)
    }
}

/// Decoded log plus a count of records that were valid JSON but not sessions.
struct SessionLog {
    sessions: Vec<Session>,
    undecodable: usize,
}

impl SessionLog {
    /// Sessions safe to rewrite. A log holding records this build cannot
    /// decode is never rewritten, since the rewrite would drop them.
    fn into_writable(self) -> Result<Vec<Session>, String> {
        if self.undecodable > 0 {
            return Err(format!(
                "{} persisted record(s) could not be decoded; refusing to rewrite the log",
                self.undecodable
            ));
        }
        Ok(self.sessions)
    }
}

/// Read and decode the log. A missing key or a blob that is not a JSON array
/// is an empty log. Records that fail to decode are skipped and counted. Only
/// substrate failures are `Err`.
fn load(kv: &dyn KeyValueStore) -> Result<SessionLog, String> {
    let empty = SessionLog {
        sessions: Vec::new(),
        undecodable: 0,
    };
    let raw = match kv.get(SESSIONS_KEY).map_err(|e| e.to_string())? {
        Some(raw) => raw,
        None => return Ok(empty),
    };

    let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(
                backend = kv.name(),
                error = %e,
                "Persisted sessions are not a JSON array, treating as empty"
            );
            return Ok(empty);
        }
    };

    let mut log = empty;
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Session>(record) {
            Ok(session) => log.sessions.push(session),
            Err(e) => {
                tracing::warn!(
                    backend = kv.name(),
                    index = index,
                    error = %e,
                    "Skipping undecodable session record"
                );
                log.undecodable += 1;
            }
        }
    }
    Ok(log)
}

fn persist(kv: &dyn KeyValueStore, sessions: &[Session]) -> WriteOutcome {
    let blob = match serde_json::to_string(sessions) {
        Ok(b) => b,
        Err(e) => {
            return WriteOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };
    match kv.set(SESSIONS_KEY, &blob) {
        Ok(()) => WriteOutcome::Written,
        Err(e) => WriteOutcome::Failed {
            reason: e.to_string(),
        },
    }
}
