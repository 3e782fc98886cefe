//! Leptos context binding for the session snapshot.
//!
//! DESIGN
//! ======
//! The manager keeps plain state and notifies subscribers; this module mirrors
//! each change into an `RwSignal` so components react without touching the
//! manager directly.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use leptos::prelude::*;

use crate::session::manager::SessionManager;
use crate::state::session::SessionSnapshot;

/// Create the snapshot signal, keep it synced with `manager`, and provide it
/// as context for child components.
pub fn provide_session_signal(manager: &SessionManager) -> RwSignal<SessionSnapshot> {
    let signal = RwSignal::new(manager.snapshot());
    manager.subscribe(move |snapshot| signal.set(snapshot.clone()));
    provide_context(signal);
    signal
}

/// Fetch the snapshot signal provided by `provide_session_signal`.
pub fn use_session_signal() -> Option<RwSignal<SessionSnapshot>> {
    use_context::<RwSignal<SessionSnapshot>>()
}
