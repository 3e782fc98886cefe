//! HTTP seam between the session subsystem and the browser.
//!
//! Client-side (hydrate): `BrowserTransport` issues real requests via
//! `gloo-net` with credentials included so the backend can set and read the
//! session cookie. Tests script responses through the same trait.
//!
//! Timeouts belong to the underlying fetch implementation; a timeout surfaces
//! here as an ordinary `SessionError::Transport`.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use async_trait::async_trait;

use crate::error::SessionError;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP surface used by the auth endpoints.
///
/// `?Send` because everything runs on the page's single event loop.
#[async_trait(?Send)]
pub trait AuthTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, SessionError>;

    async fn post(&self, url: &str, body: Option<&serde_json::Value>) -> Result<RawResponse, SessionError>;
}

#[cfg(any(test, feature = "hydrate"))]
fn transport_error(url: &str, err: impl std::fmt::Display) -> SessionError {
    SessionError::Transport { path: url.to_owned(), message: err.to_string() }
}

/// `gloo-net` transport with `credentials: "include"` on every request.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTransport;

#[cfg(feature = "hydrate")]
#[async_trait(?Send)]
impl AuthTransport for BrowserTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, SessionError> {
        let resp = gloo_net::http::Request::get(url)
            .credentials(web_sys::RequestCredentials::Include)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;
        Ok(read_response(resp).await)
    }

    async fn post(&self, url: &str, body: Option<&serde_json::Value>) -> Result<RawResponse, SessionError> {
        let builder = gloo_net::http::Request::post(url).credentials(web_sys::RequestCredentials::Include);
        let sent = match body {
            Some(body) => builder.json(body).map_err(|e| transport_error(url, e))?.send().await,
            None => builder.send().await,
        };
        let resp = sent.map_err(|e| transport_error(url, e))?;
        Ok(read_response(resp).await)
    }
}

#[cfg(feature = "hydrate")]
async fn read_response(resp: gloo_net::http::Response) -> RawResponse {
    let status = resp.status();
    // An unreadable body is treated like an empty one; callers judge by status.
    let body = resp.text().await.unwrap_or_default();
    RawResponse { status, body }
}
