//! Cookie janitor.
//!
//! Best-effort client-side removal of session cookies for when the server
//! cannot be relied on to have cleared them. The server stays the authority;
//! HttpOnly cookies are out of reach from script and survive a sweep.

#[cfg(test)]
#[path = "cookies_test.rs"]
mod cookies_test;

use std::cell::RefCell;
use std::rc::Rc;

use cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

/// Sink for raw `Set-Cookie`-style strings.
pub trait CookieJar {
    fn set_raw(&self, cookie: &str);
}

/// Immediately-expiring, path-root, lax cookie that overwrites `name`.
pub fn expired_cookie(name: &str) -> String {
    Cookie::build((name.to_owned(), ""))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
        .to_string()
}

/// Writes to `document.cookie`.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentCookieJar;

#[cfg(feature = "hydrate")]
impl CookieJar for DocumentCookieJar {
    fn set_raw(&self, cookie: &str) {
        use wasm_bindgen::JsCast;

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Ok(html) = document.dyn_into::<web_sys::HtmlDocument>() else {
            return;
        };
        if html.set_cookie(cookie).is_err() {
            log::warn!("failed to write document.cookie");
        }
    }
}

/// Records every write; used for SSR and tests. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    written: Rc<RefCell<Vec<String>>>,
}

impl MemoryCookieJar {
    pub fn written(&self) -> Vec<String> {
        self.written.borrow().clone()
    }

    /// Names of cookies written so far, in order.
    pub fn cleared_names(&self) -> Vec<String> {
        self.written
            .borrow()
            .iter()
            .filter_map(|raw| Cookie::parse(raw.clone()).ok())
            .map(|c| c.name().to_owned())
            .collect()
    }
}

impl CookieJar for MemoryCookieJar {
    fn set_raw(&self, cookie: &str) {
        self.written.borrow_mut().push(cookie.to_owned());
    }
}

/// Clears a fixed set of cookie names.
pub struct CookieJanitor {
    jar: Box<dyn CookieJar>,
    names: Vec<String>,
}

impl CookieJanitor {
    pub fn new(jar: Box<dyn CookieJar>, names: Vec<String>) -> Self {
        Self { jar, names }
    }

    pub fn sweep(&self) {
        for name in &self.names {
            self.jar.set_raw(&expired_cookie(name));
        }
        log::debug!("cleared session cookies: {}", self.names.join(", "));
    }
}
