//! Session subsystem configuration.
//!
//! The browser has no process environment, so overrides are read at build
//! time through `option_env!`. Everything else falls back to fixed defaults.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::state::session::AuthenticatedUser;

pub const DEFAULT_API_BASE: &str = "/api";
pub const DEFAULT_STORAGE_KEY: &str = "vocab.session";
pub const DEFAULT_SESSION_COOKIE: &str = "vocab_session";
pub const DEFAULT_FALLBACK_COOKIE: &str = "session";
pub const DEFAULT_UNAUTHORIZED_EVENT: &str = "vocab:unauthorized";

/// Fixed user-facing strings. Failures other than sign-in are not actionable
/// beyond retrying, so they share generic prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMessages {
    pub sign_in_failed: String,
    pub guest_failed: String,
    pub guest_renewal_failed: String,
    pub session_expired: String,
    /// Shown when no identity-provider client id is configured.
    pub identity_client_missing: String,
}

impl Default for SessionMessages {
    fn default() -> Self {
        Self {
            sign_in_failed: "ログインに失敗しました。もう一度お試しください。".to_owned(),
            guest_failed: "ゲストモードを開始できませんでした。もう一度お試しください。".to_owned(),
            guest_renewal_failed: "ゲストセッションの更新に失敗しました。もう一度お試しください。".to_owned(),
            session_expired: "セッションの有効期限が切れました。もう一度ログインしてください。".to_owned(),
            identity_client_missing: "ログイン用のクライアントIDが設定されていないため、ログインできません。".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Prefix for every backend endpoint, without trailing slash.
    pub api_base: String,
    /// localStorage key holding the persisted session record.
    pub storage_key: String,
    /// Primary session cookie cleared by the janitor.
    pub session_cookie: String,
    /// Legacy cookie name cleared alongside the primary one.
    pub fallback_cookie: String,
    /// DOM event the transport dispatches on `window` for an HTTP 401.
    pub unauthorized_event: String,
    /// Identity assigned when the deployment runs with auth bypass.
    pub bypass_user: AuthenticatedUser,
    pub messages: SessionMessages,
    /// Log at debug level in the browser console.
    pub debug_logging: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_owned(),
            fallback_cookie: DEFAULT_FALLBACK_COOKIE.to_owned(),
            unauthorized_event: DEFAULT_UNAUTHORIZED_EVENT.to_owned(),
            bypass_user: default_bypass_user(),
            messages: SessionMessages::default(),
            debug_logging: false,
        }
    }
}

impl SessionConfig {
    /// Build config from compile-time overrides.
    ///
    /// Optional:
    /// - `VOCAB_SESSION_API_BASE`: default `/api`
    /// - `VOCAB_SESSION_STORAGE_KEY`: default `vocab.session`
    /// - `VOCAB_SESSION_COOKIE`: default `vocab_session`
    /// - `VOCAB_SESSION_DEBUG`: `1/true/yes/on` enables debug logging
    pub fn from_build_env() -> Self {
        let mut config = Self::from_overrides(
            option_env!("VOCAB_SESSION_API_BASE"),
            option_env!("VOCAB_SESSION_STORAGE_KEY"),
            option_env!("VOCAB_SESSION_COOKIE"),
        );
        config.debug_logging = option_env!("VOCAB_SESSION_DEBUG").and_then(parse_bool).unwrap_or(false);
        config
    }

    pub(crate) fn from_overrides(api_base: Option<&str>, storage_key: Option<&str>, session_cookie: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(base) = non_blank(api_base) {
            config.api_base = normalize_base(base);
        }
        if let Some(key) = non_blank(storage_key) {
            config.storage_key = key.to_owned();
        }
        if let Some(name) = non_blank(session_cookie) {
            config.session_cookie = name.to_owned();
        }
        config
    }

    #[must_use]
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = normalize_base(base);
        self
    }

    /// Join `path` onto the API base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// Both cookie names the janitor clears, primary first.
    pub fn cookie_names(&self) -> Vec<String> {
        vec![self.session_cookie.clone(), self.fallback_cookie.clone()]
    }
}

fn default_bypass_user() -> AuthenticatedUser {
    AuthenticatedUser::new("dev-bypass", "dev@localhost", "Developer")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_owned()
}

/// Parse a boolean flag using the `1/true/yes/on` convention.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
