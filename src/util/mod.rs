//! Browser persistence helpers used by the session manager.
//!
//! SYSTEM CONTEXT
//! ==============
//! These modules isolate localStorage and `document.cookie` access behind
//! small traits so the state machine stays testable off the browser.

pub mod cookies;
pub mod session_cache;
