//! Decoupled "unauthorized" notification raised by the transport layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! Any backend call answered with HTTP 401 raises one signal with no
//! correlation data. In the browser the transport dispatches a DOM event on
//! `window`; `listen_window_event` forwards those into an in-process channel
//! that the session bridge drains.

#[cfg(test)]
#[path = "unauthorized_test.rs"]
mod unauthorized_test;

use futures::channel::mpsc;
use serde::{Deserialize, Serialize};

pub const UNAUTHORIZED_STATUS: u16 = 401;

/// Context-free "some call just received a 401".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnauthorizedSignal {
    pub status: u16,
}

impl UnauthorizedSignal {
    pub const fn new() -> Self {
        Self { status: UNAUTHORIZED_STATUS }
    }

    /// Signal for a response status, if it warrants one.
    pub fn for_status(status: u16) -> Option<Self> {
        (status == UNAUTHORIZED_STATUS).then(Self::new)
    }

    pub fn is_unauthorized(self) -> bool {
        self.status == UNAUTHORIZED_STATUS
    }
}

impl Default for UnauthorizedSignal {
    fn default() -> Self {
        Self::new()
    }
}

pub type UnauthorizedReceiver = mpsc::UnboundedReceiver<UnauthorizedSignal>;

/// Sending half handed to whatever raises 401 notifications.
#[derive(Debug, Clone)]
pub struct UnauthorizedNotifier {
    tx: mpsc::UnboundedSender<UnauthorizedSignal>,
}

impl UnauthorizedNotifier {
    pub fn notify(&self, signal: UnauthorizedSignal) {
        if self.tx.unbounded_send(signal).is_err() {
            log::debug!("unauthorized signal dropped: bridge is not listening");
        }
    }

    /// Raise the standard 401 signal.
    pub fn raise(&self) {
        self.notify(UnauthorizedSignal::new());
    }
}

pub fn unauthorized_channel() -> (UnauthorizedNotifier, UnauthorizedReceiver) {
    let (tx, rx) = mpsc::unbounded();
    (UnauthorizedNotifier { tx }, rx)
}

/// Forward `event_name` DOM events on `window` into `notifier`.
///
/// The listener lives for the rest of the page.
///
/// # Errors
///
/// Returns a description if there is no window or the listener could not be
/// attached.
#[cfg(feature = "hydrate")]
pub fn listen_window_event(event_name: &str, notifier: UnauthorizedNotifier) -> Result<(), String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    let window = web_sys::window().ok_or_else(|| "no window".to_owned())?;
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| notifier.raise());
    window
        .add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())
        .map_err(|e| format!("addEventListener failed: {e:?}"))?;
    callback.forget();
    Ok(())
}

/// Dispatch `event_name` on `window`; used by HTTP helpers on a 401.
#[cfg(feature = "hydrate")]
pub fn dispatch_window_event(event_name: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    match web_sys::Event::new(event_name) {
        Ok(event) => {
            if let Err(e) = window.dispatch_event(&event) {
                log::warn!("failed to dispatch {event_name} event: {e:?}");
            }
        }
        Err(e) => log::warn!("failed to create {event_name} event: {e:?}"),
    }
}
