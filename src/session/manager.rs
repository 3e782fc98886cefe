//! Session state manager.
//!
//! ARCHITECTURE
//! ============
//! One `SessionManager` exists per page. It owns the `SessionSnapshot` and is
//! the only thing that mutates it; the durable cache and UI subscribers react
//! to snapshot changes.
//!
//! CONCURRENCY
//! ===========
//! Everything runs on the page's single event loop. Network calls are the
//! only suspension points, and their results land in completion order, not
//! issue order. No `RefCell` borrow is held across an `.await`, and any code
//! that acts on a network result re-reads the current state first.
//!
//! The guest reissue is single-flighted by a flag that is checked and set in
//! one non-suspending step and released when the call settles, whatever the
//! outcome.

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::net::api::AuthApi;
use crate::net::transport::AuthTransport;
use crate::state::session::{SessionMode, SessionSnapshot};
use crate::util::cookies::{CookieJanitor, CookieJar};
use crate::util::session_cache::{SessionCache, SessionStore};

type Listener = Rc<dyn Fn(&SessionSnapshot)>;

/// Clears a `Cell<bool>` flag on drop.
struct FlagGuard<'a>(&'a Cell<bool>);

impl<'a> FlagGuard<'a> {
    /// `None` when the flag is already held.
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) { None } else { Some(Self(flag)) }
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Keeps `is_authenticating` set while at least one user operation runs.
struct PendingOperation<'a>(&'a SessionManager);

impl Drop for PendingOperation<'_> {
    fn drop(&mut self) {
        let manager = self.0;
        let remaining = manager.pending.get().saturating_sub(1);
        manager.pending.set(remaining);
        if remaining == 0 {
            manager.update(|s| s.is_authenticating = false);
        }
    }
}

pub struct SessionManager {
    config: SessionConfig,
    api: AuthApi,
    cache: SessionCache,
    janitor: CookieJanitor,
    state: RefCell<SessionSnapshot>,
    /// User operations currently outstanding.
    pending: Cell<u32>,
    /// Bumped on every intentional mode transition.
    generation: Cell<u64>,
    reissue_in_flight: Cell<bool>,
    probe_claimed: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
}

impl SessionManager {
    /// Build the manager, seeding the snapshot from the durable cache.
    pub fn new(
        config: SessionConfig,
        transport: Rc<dyn AuthTransport>,
        store: Box<dyn SessionStore>,
        jar: Box<dyn CookieJar>,
    ) -> Self {
        let api = AuthApi::new(transport, &config);
        let cache = SessionCache::new(store, config.storage_key.clone());
        let janitor = CookieJanitor::new(jar, config.cookie_names());
        let initial = cache.restore();
        log::debug!("session restored as {}", initial.mode.as_str());
        Self {
            config,
            api,
            cache,
            janitor,
            state: RefCell::new(initial),
            pending: Cell::new(0),
            generation: Cell::new(0),
            reissue_in_flight: Cell::new(false),
            probe_claimed: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn mode(&self) -> SessionMode {
        self.state.borrow().mode
    }

    /// Register `listener` to run after every effective snapshot change.
    pub fn subscribe(&self, listener: impl Fn(&SessionSnapshot) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub(crate) fn api(&self) -> &AuthApi {
        &self.api
    }

    /// Apply `f`; persist and notify only if the snapshot actually changed.
    fn update(&self, f: impl FnOnce(&mut SessionSnapshot)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            let before = state.clone();
            f(&mut state);
            debug_assert!(state.is_consistent(), "user must be present exactly when authenticated");
            if *state == before {
                return;
            }
            state.clone()
        };
        self.cache.mirror(&snapshot);
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// `update` for intentional mode transitions.
    fn transition(&self, f: impl FnOnce(&mut SessionSnapshot)) {
        self.generation.set(self.generation.get().wrapping_add(1));
        self.update(f);
    }

    fn begin_operation(&self) -> PendingOperation<'_> {
        self.pending.set(self.pending.get() + 1);
        self.update(|s| s.is_authenticating = true);
        PendingOperation(self)
    }

    fn fail_with(&self, message: String) {
        self.update(|s| s.error = Some(message));
    }

    fn message_or_detail(err: &SessionError, fallback: &str) -> String {
        err.detail().map_or_else(|| fallback.to_owned(), str::to_owned)
    }

    /// Exchange a one-time identity token for an authenticated session.
    ///
    /// On failure the mode is left as it was and `error` carries the most
    /// specific message available. The token is dropped when this returns.
    pub async fn sign_in(&self, id_token: String) {
        let _pending = self.begin_operation();
        self.update(|s| s.error = None);

        let result = self.api.exchange(&id_token).await;
        drop(id_token);

        match result {
            Ok(user) => {
                log::info!("signed in as {}", user.subject);
                self.transition(|s| {
                    s.enter_authenticated(user);
                    s.error = None;
                });
            }
            Err(err) => {
                log::warn!("sign-in failed: {err}");
                self.fail_with(Self::message_or_detail(&err, &self.config.messages.sign_in_failed));
            }
        }
    }

    /// Log out and drop to anonymous, whatever the backend says.
    ///
    /// When the backend does not confirm the logout, session cookies are
    /// cleared locally as a fallback.
    pub async fn sign_out(&self) {
        let _pending = self.begin_operation();

        if let Err(err) = self.api.logout().await {
            log::warn!("logout not confirmed ({err}); clearing session cookies locally");
            self.janitor.sweep();
        }
        self.transition(SessionSnapshot::enter_anonymous);
        log::info!("signed out");
    }

    /// Switch to read-only guest mode.
    ///
    /// Any existing session is logged out first on a best-effort basis. A
    /// failed guest start leaves the current mode untouched and sets a retry
    /// message.
    pub async fn enter_guest_mode(&self) {
        let _pending = self.begin_operation();
        self.update(|s| s.error = None);

        if let Err(err) = self.api.logout().await {
            log::debug!("precautionary logout before guest mode failed: {err}");
        }

        match self.api.start_guest().await {
            Ok(()) => {
                // A guest must not inherit a leftover authenticated cookie.
                self.janitor.sweep();
                self.transition(|s| {
                    s.enter_guest();
                    s.error = None;
                });
                log::info!("entered guest mode");
            }
            Err(err) => {
                log::warn!("guest mode failed: {err}");
                self.fail_with(Self::message_or_detail(&err, &self.config.messages.guest_failed));
            }
        }
    }

    pub fn clear_error(&self) {
        self.update(|s| s.error = None);
    }

    /// Renew the guest cookie after a 401 while in guest mode.
    ///
    /// Callers arriving while a renewal is in flight return immediately and
    /// observe the winner's outcome. A result that lands after the mode moved
    /// on is discarded.
    pub(crate) async fn reissue_guest_session(&self) {
        let Some(_in_flight) = FlagGuard::acquire(&self.reissue_in_flight) else {
            log::debug!("guest reissue already in flight");
            return;
        };
        let generation = self.generation.get();

        let result = self.api.start_guest().await;

        if self.mode() != SessionMode::Guest || self.generation.get() != generation {
            log::debug!("discarding stale guest reissue result");
            return;
        }
        match result {
            Ok(()) => {
                log::debug!("guest session renewed");
                self.update(|s| s.error = None);
            }
            Err(err) => {
                log::warn!("guest session renewal failed: {err}");
                let message = self.config.messages.guest_renewal_failed.clone();
                self.transition(|s| {
                    s.enter_anonymous();
                    s.error = Some(message);
                });
                self.janitor.sweep();
            }
        }
    }

    /// Drop to anonymous after the backend rejected the session.
    pub(crate) fn expire_session(&self) {
        let message = self.config.messages.session_expired.clone();
        self.transition(|s| {
            s.enter_anonymous();
            s.error = Some(message);
        });
        self.janitor.sweep();
    }

    /// Claim the one config probe allowed per manager.
    pub(crate) fn claim_probe(&self) -> bool {
        !self.probe_claimed.replace(true)
    }

    /// Record the probe outcome. Only the first resolution counts.
    pub(crate) fn resolve_config(&self, bypass: bool) {
        if self.state.borrow().config_resolved {
            return;
        }
        self.update(|s| {
            s.bypass_active = s.bypass_active || bypass;
            s.config_resolved = true;
        });
        self.apply_bypass_login();
    }

    /// Sign in as the fixed bypass identity, but only from a clean anonymous
    /// session. A mode chosen by the user first is left alone.
    fn apply_bypass_login(&self) {
        let snapshot = self.snapshot();
        if !snapshot.bypass_active {
            return;
        }
        if snapshot.mode != SessionMode::Anonymous || snapshot.user.is_some() {
            log::debug!("auth bypass active; keeping {} session", snapshot.mode.as_str());
            return;
        }
        let user = self.config.bypass_user.clone();
        log::info!("auth bypass active; signed in as {}", user.subject);
        self.transition(|s| {
            s.enter_authenticated(user);
            s.error = None;
        });
    }
}
