//! Durable session cache.
//!
//! Mirrors the settled `(mode, user)` pair into localStorage so a reload can
//! paint the previous session optimistically. The record is a hint only:
//! the session cookie decides what the backend actually allows.
//!
//! TRADE-OFFS
//! ==========
//! Storage failures are logged and ignored. A missing or malformed record
//! reads as "no prior session".

#[cfg(test)]
#[path = "session_cache_test.rs"]
mod session_cache_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::state::session::{AuthenticatedUser, SessionMode, SessionSnapshot};

/// Modes worth persisting. Anonymous is represented by absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistedMode {
    Authenticated,
    Guest,
}

/// Serialized form stored under the cache key. Never holds identity tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub auth_mode: PersistedMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthenticatedUser>,
}

impl PersistedRecord {
    /// Record for a settled snapshot; `None` means the key should be removed.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Option<Self> {
        match (snapshot.mode, &snapshot.user) {
            (SessionMode::Authenticated, Some(user)) => {
                Some(Self { auth_mode: PersistedMode::Authenticated, user: Some(user.clone()) })
            }
            (SessionMode::Guest, _) => Some(Self { auth_mode: PersistedMode::Guest, user: None }),
            _ => None,
        }
    }

    /// Seed snapshot for process start. An authenticated record without a
    /// user cannot satisfy the snapshot invariant and seeds anonymous.
    pub fn into_snapshot(self) -> SessionSnapshot {
        match (self.auth_mode, self.user) {
            (PersistedMode::Authenticated, Some(user)) => SessionSnapshot::authenticated(user),
            (PersistedMode::Authenticated, None) => SessionSnapshot::default(),
            (PersistedMode::Guest, _) => SessionSnapshot::guest(),
        }
    }
}

/// Key/value store holding one serialized value per key.
pub trait SessionStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// `window.localStorage`; no-ops when storage is unavailable.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

#[cfg(feature = "hydrate")]
impl SessionStore for LocalStorageStore {
    fn read(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn write(&self, key: &str, value: &str) {
        let Some(storage) = local_storage() else {
            return;
        };
        if storage.set_item(key, value).is_err() {
            log::warn!("failed to write session record to localStorage");
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = local_storage()
            && storage.remove_item(key).is_err()
        {
            log::warn!("failed to remove session record from localStorage");
        }
    }
}

/// In-memory store for SSR and tests. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl SessionStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn write(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Passive mirror of the session snapshot into a `SessionStore`.
pub struct SessionCache {
    store: Box<dyn SessionStore>,
    key: String,
    settled: RefCell<Option<PersistedRecord>>,
}

impl SessionCache {
    pub fn new(store: Box<dyn SessionStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into(), settled: RefCell::new(None) }
    }

    /// Read the stored record once and turn it into the initial snapshot.
    ///
    /// Unusable records are removed so the next reload starts clean.
    pub fn restore(&self) -> SessionSnapshot {
        let raw = self.store.read(&self.key);
        let snapshot = raw
            .as_deref()
            .and_then(parse_record)
            .map_or_else(SessionSnapshot::default, PersistedRecord::into_snapshot);
        let settled = PersistedRecord::from_snapshot(&snapshot);
        if raw.is_some() && settled.is_none() {
            self.store.remove(&self.key);
        }
        *self.settled.borrow_mut() = settled;
        snapshot
    }

    /// Write the record when `(mode, user)` settles on a new value; remove it
    /// when the session settles to anonymous.
    pub fn mirror(&self, snapshot: &SessionSnapshot) {
        let next = PersistedRecord::from_snapshot(snapshot);
        if *self.settled.borrow() == next {
            return;
        }
        match &next {
            Some(record) => match serde_json::to_string(record) {
                Ok(raw) => self.store.write(&self.key, &raw),
                Err(e) => {
                    log::warn!("failed to serialize session record: {e}");
                    return;
                }
            },
            None => self.store.remove(&self.key),
        }
        *self.settled.borrow_mut() = next;
    }
}

fn parse_record(raw: &str) -> Option<PersistedRecord> {
    match serde_json::from_str(raw) {
        Ok(record) => Some(record),
        Err(e) => {
            log::debug!("ignoring malformed session record: {e}");
            None
        }
    }
}
