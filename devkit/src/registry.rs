//! Explicit, caller-keyed sessions.
//!
//! Every session lives behind its own mutex, and one call's whole pipeline
//! runs inside it. The registry map is locked only for lookup and insert.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::validator::ValidationErrors;

/// Session used when a call does not name one.
pub const DEFAULT_SESSION: &str = "default";
/// Argument field carrying the session identifier.
pub const SESSION_ID_FIELD: &str = "sessionId";

/// Read the session identifier from a call's arguments.
///
/// Absent or `null` selects [`DEFAULT_SESSION`]; anything else must be a
/// non-blank string.
pub fn session_id_from_args(args: &Value) -> Result<String, ValidationErrors> {
    match args.get(SESSION_ID_FIELD) {
        None | Some(Value::Null) => Ok(DEFAULT_SESSION.to_string()),
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        Some(_) => Err(ValidationErrors::single(
            SESSION_ID_FIELD,
            "must be a non-empty string",
        )),
    }
}

/// Sessions of one workflow, keyed by session id.
#[derive(Debug)]
pub struct SessionRegistry<S> {
    sessions: Mutex<HashMap<String, Arc<Mutex<S>>>>,
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl<S: Default> SessionRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session for `id`, creating it on first use.
    pub fn session(&self, id: &str) -> Arc<Mutex<S>> {
        let mut sessions = lock_recovering(&self.sessions, "registry");
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                debug!(session = id, "creating session");
                Arc::new(Mutex::new(S::default()))
            })
            .clone()
    }

    /// Run `f` inside the critical section of session `id`.
    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut S) -> R) -> R {
        let session = self.session(id);
        let mut guard = lock_recovering(session.as_ref(), id);
        f(&mut guard)
    }

    /// Known session ids in lexicographic order.
    pub fn ids(&self) -> Vec<String> {
        let sessions = lock_recovering(&self.sessions, "registry");
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Forget session `id`. Returns whether it existed.
    ///
    /// A call already holding that session keeps its handle and finishes on
    /// the detached state; the next call under `id` starts a fresh session.
    pub fn reset(&self, id: &str) -> bool {
        let mut sessions = lock_recovering(&self.sessions, "registry");
        sessions.remove(id).is_some()
    }
}

/// Lock `mutex`, recovering the data if a previous holder panicked.
fn lock_recovering<'a, T>(mutex: &'a Mutex<T>, label: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!(session = label, "recovering lock poisoned by an earlier panic");
        poisoned.into_inner()
    })
}
