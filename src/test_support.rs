//! Shared fakes for exercising the session state machine natively.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::net::transport::{AuthTransport, RawResponse};
use crate::session::manager::SessionManager;
use crate::util::cookies::MemoryCookieJar;
use crate::util::session_cache::MemoryStore;

pub(crate) const CONFIG_URL: &str = "/api/config";
pub(crate) const EXCHANGE_URL: &str = "/api/auth/exchange";
pub(crate) const LOGOUT_URL: &str = "/api/auth/logout";
pub(crate) const GUEST_URL: &str = "/api/auth/guest";

pub(crate) type GateResult = Result<RawResponse, String>;

enum Scripted {
    Reply(RawResponse),
    Fail(String),
    Gated(oneshot::Receiver<GateResult>),
}

/// One recorded request.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub method: &'static str,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

/// Transport answering from per-URL queues of scripted replies.
///
/// An unscripted request fails like a network error.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: RefCell<HashMap<String, VecDeque<Scripted>>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn push(&self, url: &str, scripted: Scripted) {
        self.replies.borrow_mut().entry(url.to_owned()).or_default().push_back(scripted);
    }

    pub(crate) fn reply(&self, url: &str, status: u16, body: &str) {
        self.push(url, Scripted::Reply(RawResponse::new(status, body)));
    }

    pub(crate) fn fail(&self, url: &str, message: &str) {
        self.push(url, Scripted::Fail(message.to_owned()));
    }

    /// Queue a reply that stays pending until the returned sender fires.
    pub(crate) fn gate(&self, url: &str) -> oneshot::Sender<GateResult> {
        let (tx, rx) = oneshot::channel();
        self.push(url, Scripted::Gated(rx));
        tx
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn calls_to(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.url == url).count()
    }

    async fn respond(&self, method: &'static str, url: &str, body: Option<&serde_json::Value>) -> Result<RawResponse, SessionError> {
        self.calls.borrow_mut().push(Call { method, url: url.to_owned(), body: body.cloned() });
        let next = self.replies.borrow_mut().get_mut(url).and_then(VecDeque::pop_front);
        let failed = |message: String| SessionError::Transport { path: url.to_owned(), message };
        match next {
            None => Err(failed("no scripted reply".to_owned())),
            Some(Scripted::Reply(resp)) => Ok(resp),
            Some(Scripted::Fail(message)) => Err(failed(message)),
            Some(Scripted::Gated(rx)) => match rx.await {
                Ok(Ok(resp)) => Ok(resp),
                Ok(Err(message)) => Err(failed(message)),
                Err(_) => Err(failed("gate dropped".to_owned())),
            },
        }
    }
}

#[async_trait(?Send)]
impl AuthTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, SessionError> {
        self.respond("GET", url, None).await
    }

    async fn post(&self, url: &str, body: Option<&serde_json::Value>) -> Result<RawResponse, SessionError> {
        self.respond("POST", url, body).await
    }
}

/// Everything a manager test needs to inspect afterwards.
pub(crate) struct Harness {
    pub manager: Rc<SessionManager>,
    pub transport: Rc<ScriptedTransport>,
    pub store: MemoryStore,
    pub cookies: MemoryCookieJar,
}

pub(crate) fn harness() -> Harness {
    harness_with_store(MemoryStore::default())
}

pub(crate) fn harness_with_store(store: MemoryStore) -> Harness {
    let transport = ScriptedTransport::new();
    let cookies = MemoryCookieJar::default();
    let manager = SessionManager::new(
        SessionConfig::default(),
        transport.clone(),
        Box::new(store.clone()),
        Box::new(cookies.clone()),
    );
    Harness { manager: Rc::new(manager), transport, store, cookies }
}

pub(crate) fn guest_ok() -> &'static str {
    r#"{"mode":"guest"}"#
}

pub(crate) fn user_body(subject: &str) -> String {
    serde_json::json!({
        "user": { "subject": subject, "email": format!("{subject}@example.jp"), "displayName": "Test User" }
    })
    .to_string()
}

/// Future that returns `Pending` once, waking itself, so other branches of a
/// `join!` get a turn.
pub(crate) fn yield_now() -> impl Future<Output = ()> {
    struct YieldNow(bool);

    impl Future for YieldNow {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    YieldNow(false)
}
