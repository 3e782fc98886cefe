//! Error types for backend calls made by the session subsystem.
//!
//! ERROR HANDLING
//! ==============
//! These never escape `SessionManager`'s public operations. The manager
//! folds them into the snapshot's `error` field, preferring the backend's
//! `detail` text where the operation surfaces it.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The request never produced an HTTP response (network failure, timeout).
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    /// The backend answered with a status outside the endpoint's success range.
    #[error("{path} responded with status {status}")]
    Status { path: String, status: u16, detail: Option<String> },

    /// A success status whose body does not satisfy the endpoint contract.
    #[error("unexpected response from {path}: {reason}")]
    Contract { path: String, reason: String, detail: Option<String> },
}

impl SessionError {
    /// Backend-provided explanation, when the response carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Transport { .. } => None,
            Self::Status { detail, .. } | Self::Contract { detail, .. } => detail.as_deref(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
