//! Shared fixtures for the client integration tests: a scripted transport that
//! records every request, and a helper that wires a `ReaderApp` around it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use client_lib::adapters::ConsoleRedirect;
use client_lib::app::ReaderApp;
use client_lib::config::Config;
use novel_reader_core::ports::{HttpRequest, HttpResponse, HttpTransport, PortResult};
use novel_reader_core::MemoryStorage;
use serde_json::Value;
use tokio::sync::Notify;

pub const REFRESH_PATH: &str = "/auth/refresh";

type Handler = Box<dyn Fn(&HttpRequest) -> PortResult<HttpResponse> + Send + Sync>;

/// Answers requests with a closure. Any path can be held until released so tests
/// can pile requests up behind a running refresh or order their responses.
pub struct ScriptedTransport {
    handler: Handler,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> PortResult<HttpResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            holds: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Makes the next call to `path` wait until the returned `Notify` fires.
    pub fn hold(&self, path: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds
            .lock()
            .unwrap()
            .insert(path.to_string(), notify.clone());
        notify
    }

    pub fn hold_refresh(&self) -> Arc<Notify> {
        self.hold(REFRESH_PATH)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|r| r.path == path).count()
    }

    pub fn last_to(&self, path: &str) -> Option<HttpRequest> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.path == path)
            .cloned()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> PortResult<HttpResponse> {
        self.log.lock().unwrap().push(request.clone());

        let hold = self.holds.lock().unwrap().remove(&request.path);
        if let Some(notify) = hold {
            notify.notified().await;
        }

        (self.handler)(&request)
    }
}

pub fn respond(status: u16, body: Value) -> PortResult<HttpResponse> {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

pub struct Harness {
    pub app: ReaderApp,
    pub storage: Arc<MemoryStorage>,
    pub redirect: Arc<ConsoleRedirect>,
    pub transport: Arc<ScriptedTransport>,
}

pub fn harness(transport: Arc<ScriptedTransport>) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    harness_with_storage(transport, storage)
}

pub fn harness_with_storage(transport: Arc<ScriptedTransport>, storage: Arc<MemoryStorage>) -> Harness {
    let redirect = Arc::new(ConsoleRedirect::new());
    let app = ReaderApp::new(
        Config::default(),
        transport.clone(),
        storage.clone(),
        redirect.clone(),
    );
    Harness {
        app,
        storage,
        redirect,
        transport,
    }
}

/// Seeds a stored token pair the way a previous login would have left it.
pub fn seed_tokens(storage: &MemoryStorage, access: &str, refresh: &str) {
    use novel_reader_core::ports::KeyValueStorage;
    storage.set("authToken", access).unwrap();
    storage.set("refreshToken", refresh).unwrap();
}

pub fn stored(storage: &MemoryStorage, key: &str) -> Option<String> {
    use novel_reader_core::ports::KeyValueStorage;
    storage.get(key).unwrap()
}
