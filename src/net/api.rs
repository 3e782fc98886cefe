//! Backend auth endpoint calls.
//!
//! ERROR HANDLING
//! ==============
//! Each method applies its endpoint's success contract and reports anything
//! else as a `SessionError`. Transport failures and contract violations are
//! deliberately the same shape so the manager can treat them alike.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::rc::Rc;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::net::transport::{AuthTransport, RawResponse};
use crate::net::types::{
    ConfigResponse, ExchangeRequest, ExchangeResponse, GuestResponse, detail_from_body, detail_text,
};
use crate::state::session::AuthenticatedUser;

/// Logout is confirmed only by these statuses; anything else leaves
/// server-side cleanup uncertain.
pub(crate) fn is_logout_confirmed(status: u16) -> bool {
    matches!(status, 200 | 204)
}

fn status_error(url: &str, resp: &RawResponse) -> SessionError {
    SessionError::Status { path: url.to_owned(), status: resp.status, detail: detail_from_body(&resp.body) }
}

fn contract_error(url: &str, reason: impl Into<String>, detail: Option<String>) -> SessionError {
    SessionError::Contract { path: url.to_owned(), reason: reason.into(), detail }
}

/// Typed client for `/config` and `/auth/*`.
#[derive(Clone)]
pub struct AuthApi {
    transport: Rc<dyn AuthTransport>,
    config_url: String,
    exchange_url: String,
    logout_url: String,
    guest_url: String,
}

impl AuthApi {
    pub fn new(transport: Rc<dyn AuthTransport>, config: &SessionConfig) -> Self {
        Self {
            transport,
            config_url: config.endpoint("config"),
            exchange_url: config.endpoint("auth/exchange"),
            logout_url: config.endpoint("auth/logout"),
            guest_url: config.endpoint("auth/guest"),
        }
    }

    /// Fetch deployment config from `GET /config`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// unparseable body.
    pub async fn fetch_config(&self) -> Result<ConfigResponse, SessionError> {
        let url = &self.config_url;
        let resp = self.transport.get(url).await?;
        if !resp.is_success() {
            return Err(status_error(url, &resp));
        }
        serde_json::from_str(&resp.body).map_err(|e| contract_error(url, e.to_string(), None))
    }

    /// Exchange a one-time identity token for a session via `POST /auth/exchange`.
    ///
    /// The token is only borrowed for the request body and never stored.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status (carrying the
    /// backend `detail` when present), or a 2xx body without a usable user.
    pub async fn exchange(&self, id_token: &str) -> Result<AuthenticatedUser, SessionError> {
        let url = &self.exchange_url;
        let body = serde_json::to_value(ExchangeRequest { id_token }).map_err(|e| contract_error(url, e.to_string(), None))?;
        let resp = self.transport.post(url, Some(&body)).await?;
        if !resp.is_success() {
            return Err(status_error(url, &resp));
        }
        let parsed: ExchangeResponse = serde_json::from_str(&resp.body)
            .map_err(|e| contract_error(url, format!("malformed body: {e}"), detail_from_body(&resp.body)))?;
        parsed.user.ok_or_else(|| contract_error(url, "response did not include a user", detail_from_body(&resp.body)))
    }

    /// Ask the backend to end the session via `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the backend answered exactly 200 or 204.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let url = &self.logout_url;
        let resp = self.transport.post(url, None).await?;
        if is_logout_confirmed(resp.status) {
            Ok(())
        } else {
            Err(status_error(url, &resp))
        }
    }

    /// Start or renew a guest session via `POST /auth/guest`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the status is 2xx and the body is explicitly
    /// marked `mode: "guest"`.
    pub async fn start_guest(&self) -> Result<(), SessionError> {
        let url = &self.guest_url;
        let resp = self.transport.post(url, None).await?;
        if !resp.is_success() {
            return Err(status_error(url, &resp));
        }
        let parsed: GuestResponse = serde_json::from_str(&resp.body).unwrap_or_default();
        if parsed.is_guest() {
            Ok(())
        } else {
            let found = parsed.mode.as_deref().unwrap_or("none");
            Err(contract_error(url, format!("expected guest mode, got {found}"), detail_text(parsed.detail.as_ref())))
        }
    }
}
