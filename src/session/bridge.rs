//! Unauthorized event bridge.
//!
//! SYSTEM CONTEXT
//! ==============
//! The transport raises a context-free signal on every HTTP 401. The bridge
//! reconciles it against the mode the session is in when the signal is
//! handled, not when the failing request was issued.
//!
//! Signals are handled concurrently so a burst of 401s in guest mode reaches
//! the reissue single-flight guard together instead of queueing one renewal
//! per signal.

#[cfg(test)]
#[path = "bridge_test.rs"]
mod bridge_test;

use futures::{Stream, StreamExt};

use crate::net::unauthorized::UnauthorizedSignal;
use crate::session::manager::SessionManager;
use crate::state::session::SessionMode;

/// Reconcile one unauthorized signal.
///
/// Guest sessions try a renewal; anything else drops to anonymous with a
/// "session expired" message.
pub async fn handle_unauthorized(manager: &SessionManager, signal: UnauthorizedSignal) {
    if !signal.is_unauthorized() {
        log::debug!("ignoring non-401 signal: status {}", signal.status);
        return;
    }

    match manager.mode() {
        SessionMode::Guest => manager.reissue_guest_session().await,
        SessionMode::Authenticated | SessionMode::Anonymous => {
            log::info!("backend rejected the session; signing out locally");
            manager.expire_session();
        }
    }
}

/// Drain `signals` until the stream ends.
pub async fn run_unauthorized_bridge<S>(manager: &SessionManager, signals: S)
where
    S: Stream<Item = UnauthorizedSignal>,
{
    signals.for_each_concurrent(None, |signal| handle_unauthorized(manager, signal)).await;
    log::debug!("unauthorized bridge stopped");
}
