//! Page-wide accessor for the single `SessionManager`.

#[cfg(test)]
#[path = "global_test.rs"]
mod global_test;

use std::cell::OnceCell;
use std::rc::Rc;

use crate::session::manager::SessionManager;

thread_local! {
    static SESSION: OnceCell<Rc<SessionManager>> = const { OnceCell::new() };
}

/// Install the page's manager.
///
/// # Errors
///
/// Returns the rejected manager if one is already installed.
pub fn install(manager: Rc<SessionManager>) -> Result<(), Rc<SessionManager>> {
    SESSION.with(|cell| cell.set(manager))
}

/// The installed manager, if `install` has run.
pub fn manager() -> Option<Rc<SessionManager>> {
    SESSION.with(|cell| cell.get().cloned())
}
