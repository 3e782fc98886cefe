//! Page startup for the session subsystem.
//!
//! SYSTEM CONTEXT
//! ==============
//! `start` builds the browser adapters, constructs and installs the page's
//! `SessionManager`, then spawns the two background tasks: the one-shot
//! config probe and the standing unauthorized bridge. Spawning goes through
//! `spawn_background_tasks` so the wiring can run on any local executor.

#[cfg(test)]
#[path = "boot_test.rs"]
mod boot_test;

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::config::SessionConfig;
use crate::net::unauthorized::{UnauthorizedNotifier, unauthorized_channel};
use crate::session::bridge::run_unauthorized_bridge;
use crate::session::config_probe::run_config_probe;
use crate::session::manager::SessionManager;

/// Install the console logger and panic hook in the browser.
pub fn init_logging(config: &SessionConfig) {
    #[cfg(feature = "hydrate")]
    {
        console_error_panic_hook::set_once();
        let level = if config.debug_logging { log::Level::Debug } else { log::Level::Info };
        // Already initialized by the host app is fine.
        let _ = console_log::init_with_level(level);
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = config;
    }
}

/// Spawn the config probe and the unauthorized bridge for `manager`.
///
/// Returns the notifier that 401 sources should raise.
pub fn spawn_background_tasks<F>(manager: &Rc<SessionManager>, spawn: F) -> UnauthorizedNotifier
where
    F: Fn(LocalBoxFuture<'static, ()>),
{
    let (notifier, signals) = unauthorized_channel();

    let probe = Rc::clone(manager);
    spawn(Box::pin(async move { run_config_probe(&probe).await }));

    let bridge = Rc::clone(manager);
    spawn(Box::pin(async move { run_unauthorized_bridge(&bridge, signals).await }));

    notifier
}

/// `start` with `SessionConfig::from_build_env`.
#[cfg(feature = "hydrate")]
pub fn start_default() -> Rc<SessionManager> {
    start(SessionConfig::from_build_env())
}

/// Start the session subsystem for this page and return its manager.
///
/// Calling again returns the manager installed by the first call.
#[cfg(feature = "hydrate")]
pub fn start(config: SessionConfig) -> Rc<SessionManager> {
    use crate::net::transport::BrowserTransport;
    use crate::net::unauthorized::listen_window_event;
    use crate::session::global;
    use crate::util::cookies::DocumentCookieJar;
    use crate::util::session_cache::LocalStorageStore;

    init_logging(&config);
    if let Some(existing) = global::manager() {
        log::warn!("session subsystem already started");
        return existing;
    }

    let event_name = config.unauthorized_event.clone();
    let manager = Rc::new(SessionManager::new(
        config,
        Rc::new(BrowserTransport),
        Box::new(LocalStorageStore),
        Box::new(DocumentCookieJar),
    ));
    if let Err(existing) = global::install(Rc::clone(&manager)) {
        return existing;
    }

    let notifier = spawn_background_tasks(&manager, |task| leptos::task::spawn_local(task));
    if let Err(e) = listen_window_event(&event_name, notifier) {
        log::warn!("unauthorized listener not attached: {e}");
    }
    manager
}
