//! Wire schema for the backend auth endpoints.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

use crate::state::session::AuthenticatedUser;

/// `GET /config`. A missing flag means auth is enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigResponse {
    #[serde(default)]
    pub session_auth_disabled: Option<bool>,
}

impl ConfigResponse {
    pub fn bypass_enabled(&self) -> bool {
        self.session_auth_disabled.unwrap_or(false)
    }
}

/// `POST /auth/exchange` request body.
#[derive(Serialize)]
pub struct ExchangeRequest<'a> {
    pub id_token: &'a str,
}

/// `POST /auth/exchange` success body.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeResponse {
    #[serde(default)]
    pub user: Option<AuthenticatedUser>,
}

/// `POST /auth/guest` success body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestResponse {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl GuestResponse {
    pub fn is_guest(&self) -> bool {
        self.mode.as_deref() == Some("guest")
    }
}

/// Error body shape shared by every endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

/// Extract a human-readable `detail` string from a response body.
///
/// Structured details (validation error lists) are ignored so callers fall
/// back to their generic message.
pub fn detail_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    detail_text(parsed.detail.as_ref())
}

pub(crate) fn detail_text(detail: Option<&serde_json::Value>) -> Option<String> {
    match detail? {
        serde_json::Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        _ => None,
    }
}
