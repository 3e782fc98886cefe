//! # vocab-session
//!
//! Browser-side session and authentication state for the vocabulary client.
//!
//! Tracks whether the page is anonymous, in read-only guest mode, or signed
//! in, and coordinates every transition with the backend that owns the real
//! session cookie. Browser adapters (HTTP, localStorage, cookies, DOM events)
//! are gated behind the `hydrate` feature; the state machine itself is plain
//! Rust driven by whatever executor hosts it.

pub mod boot;
pub mod config;
pub mod error;
pub mod net;
pub mod session;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::SessionConfig;
pub use error::SessionError;
pub use session::manager::SessionManager;
pub use state::session::{AuthenticatedUser, SessionMode, SessionSnapshot};
