//! Session snapshot shared with every session-aware component.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionSnapshot` is the single source of truth for which UI capabilities
//! are exposed. Only `SessionManager` mutates it; panels read it through the
//! Leptos context signal or `SessionManager::snapshot`.
//!
//! INVARIANTS
//! ==========
//! `user` is present exactly when `mode == Authenticated`.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::SessionMessages;

/// Tri-state classification of the current browsing session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Anonymous,
    /// Read-only, login-free mode backed by a guest cookie.
    Guest,
    /// Identity-bound session.
    Authenticated,
}

impl SessionMode {
    /// Whether write features (progress sync, deck edits) are available.
    pub fn can_write(self) -> bool {
        self == Self::Authenticated
    }

    pub fn is_read_only(self) -> bool {
        self == Self::Guest
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Guest => "guest",
            Self::Authenticated => "authenticated",
        }
    }
}

/// Identity returned by `/auth/exchange`.
///
/// Accepts both camelCase and snake_case field names from the backend.
/// Unknown fields are kept in `extra` so they survive a cache round trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    /// Stable external id.
    #[serde(alias = "sub")]
    pub subject: String,
    pub email: String,
    #[serde(alias = "display_name")]
    pub display_name: String,
    /// Values that are not RFC 3339 are dropped rather than failing the record.
    #[serde(
        default,
        alias = "last_login_at",
        deserialize_with = "lenient_rfc3339",
        serialize_with = "time::serde::rfc3339::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_login_at: Option<OffsetDateTime>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl AuthenticatedUser {
    pub fn new(subject: impl Into<String>, email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: email.into(),
            display_name: display_name.into(),
            last_login_at: None,
            extra: BTreeMap::new(),
        }
    }
}

fn lenient_rfc3339<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::String(text)) = raw else {
        return Ok(None);
    };
    match OffsetDateTime::parse(&text, &Rfc3339) {
        Ok(at) => Ok(Some(at)),
        Err(e) => {
            log::debug!("ignoring lastLoginAt {text:?}: {e}");
            Ok(None)
        }
    }
}

/// In-memory, authoritative session state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub user: Option<AuthenticatedUser>,
    pub is_authenticating: bool,
    pub error: Option<String>,
    pub bypass_active: bool,
    pub config_resolved: bool,
}

impl SessionSnapshot {
    /// Snapshot for a signed-in user.
    pub fn authenticated(user: AuthenticatedUser) -> Self {
        Self { mode: SessionMode::Authenticated, user: Some(user), ..Self::default() }
    }

    pub fn guest() -> Self {
        Self { mode: SessionMode::Guest, ..Self::default() }
    }

    pub fn is_signed_in(&self) -> bool {
        self.mode == SessionMode::Authenticated && self.user.is_some()
    }

    /// Check `user != None <=> mode == Authenticated`.
    pub fn is_consistent(&self) -> bool {
        self.user.is_some() == (self.mode == SessionMode::Authenticated)
    }

    pub(crate) fn enter_anonymous(&mut self) {
        self.mode = SessionMode::Anonymous;
        self.user = None;
    }

    pub(crate) fn enter_guest(&mut self) {
        self.mode = SessionMode::Guest;
        self.user = None;
    }

    pub(crate) fn enter_authenticated(&mut self, user: AuthenticatedUser) {
        self.mode = SessionMode::Authenticated;
        self.user = Some(user);
    }

    /// Warning for a missing identity-provider client id.
    ///
    /// Stays silent until the config probe has resolved, and for bypass
    /// deployments where no client id is needed.
    pub fn identity_client_warning<'a>(&self, client_id: Option<&str>, messages: &'a SessionMessages) -> Option<&'a str> {
        if !self.config_resolved || self.bypass_active {
            return None;
        }
        match client_id.map(str::trim) {
            Some(id) if !id.is_empty() => None,
            _ => Some(messages.identity_client_missing.as_str()),
        }
    }
}
