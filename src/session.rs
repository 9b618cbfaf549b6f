//! Session snapshot, live session object, and in-process session store.
//!
//! A [`SessionView`] is the serialized snapshot of session identity and
//! context carried inside `call` frames. It is data, not a live object: the
//! adapter reconstructs the [`Session`] the algorithm code works with from
//! that snapshot.
//!
//! Session state mutated by the algorithm (`set`/`delete`) persists inside
//! the adapter process only, keyed by session id, for the process lifetime.
//! It is never serialized back to the host.
//!
//! # Example
//!
//! ```
//! use procvision_adapter::session::{SessionStore, SessionView};
//!
//! let mut store = SessionStore::new();
//! let view = SessionView::new("s1");
//!
//! let session = store.materialize(&view);
//! session.set("count", serde_json::json!(1));
//!
//! // Same id on a later call resolves to the same logical session.
//! let session = store.materialize(&view);
//! assert_eq!(session.get("count"), Some(&serde_json::json!(1)));
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Serialized cross-boundary representation of a logical session.
///
/// Carried inside `call` frames. The `id` is the session's identity: the
/// same value denotes the same logical session across repeated calls within
/// one adapter process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    /// Session identity.
    pub id: String,
    /// Host-supplied context (product code, operator, trace id, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
}

impl SessionView {
    /// Create a view with an empty context.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            context: Map::new(),
        }
    }

    /// Create a view with a context map.
    pub fn with_context(id: impl Into<String>, context: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            context,
        }
    }
}

/// The live session object handed to algorithm phases.
///
/// Wraps the host-supplied identity and context plus a mutable key/value
/// state store private to the adapter process.
#[derive(Debug, Clone, Default)]
pub struct Session {
    id: String,
    context: Map<String, Value>,
    state: HashMap<String, Value>,
}

impl Session {
    /// Create a fresh session with empty state.
    pub fn new(id: impl Into<String>, context: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            context,
            state: HashMap::new(),
        }
    }

    /// Session identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Host-supplied context.
    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Read a state value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Write a state value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.state.insert(key.into(), value);
    }

    /// Remove a state value. No-op if absent.
    pub fn delete(&mut self, key: &str) {
        self.state.remove(key);
    }

    /// Clear all state.
    pub fn clear(&mut self) {
        self.state.clear();
    }

    fn refresh_context(&mut self, context: &Map<String, Value>) {
        if !context.is_empty() {
            self.context = context.clone();
        }
    }
}

/// In-process session store, keyed by session id.
///
/// Owned by the dispatcher; sessions live for the process lifetime.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a view to its live session, creating it on first sight.
    ///
    /// An existing session keeps its state; its context is refreshed from
    /// the snapshot when the snapshot carries one.
    pub fn materialize(&mut self, view: &SessionView) -> &mut Session {
        let session = self
            .sessions
            .entry(view.id.clone())
            .or_insert_with(|| Session::new(view.id.clone(), view.context.clone()));
        session.refresh_context(&view.context);
        session
    }

    /// Number of known sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if no session has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_state_operations() {
        let mut session = Session::new("s1", Map::new());

        session.set("threshold", json!(0.8));
        assert_eq!(session.get("threshold"), Some(&json!(0.8)));

        session.delete("threshold");
        assert_eq!(session.get("threshold"), None);

        // Deleting an absent key is fine.
        session.delete("missing");

        session.set("a", json!(1));
        session.set("b", json!(2));
        session.clear();
        assert_eq!(session.get("a"), None);
        assert_eq!(session.get("b"), None);
    }

    #[test]
    fn test_store_same_id_same_session() {
        let mut store = SessionStore::new();
        let view = SessionView::new("s1");

        store.materialize(&view).set("seen", json!(true));
        assert_eq!(store.materialize(&view).get("seen"), Some(&json!(true)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_distinct_ids_are_isolated() {
        let mut store = SessionStore::new();

        store.materialize(&SessionView::new("s1")).set("k", json!(1));
        assert_eq!(store.materialize(&SessionView::new("s2")).get("k"), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_refreshes_context() {
        let mut store = SessionStore::new();

        let mut ctx = Map::new();
        ctx.insert("operator".to_string(), json!("dev"));
        store.materialize(&SessionView::with_context("s1", ctx));

        let mut ctx2 = Map::new();
        ctx2.insert("operator".to_string(), json!("qa"));
        let session = store.materialize(&SessionView::with_context("s1", ctx2));
        assert_eq!(session.context().get("operator"), Some(&json!("qa")));
    }

    #[test]
    fn test_store_empty_snapshot_keeps_context() {
        let mut store = SessionStore::new();

        let mut ctx = Map::new();
        ctx.insert("product_code".to_string(), json!("p001"));
        store.materialize(&SessionView::with_context("s1", ctx));

        // A bare {"id": "s1"} snapshot must not wipe the stored context.
        let session = store.materialize(&SessionView::new("s1"));
        assert_eq!(session.context().get("product_code"), Some(&json!("p001")));
    }

    #[test]
    fn test_session_view_serde() {
        let view = SessionView::new("s1");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json, json!({"id": "s1"}));

        let parsed: SessionView = serde_json::from_value(json!({"id": "s2"})).unwrap();
        assert_eq!(parsed.id, "s2");
        assert!(parsed.context.is_empty());
    }
}
