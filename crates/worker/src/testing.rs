//! Scripted collaborators for manager tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use swcache_core::{AppConfig, BucketInfo, CacheDb, CacheStorage, Error, Request, Response, StoredEntry};
use url::Url;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::fetch::Network;
use crate::host::{WindowClient, WorkerHost};
use crate::manager::{CacheManager, ManagerConfig};
use crate::push::Notification;

const ORIGIN: &str = "http://localhost:8080";

pub fn get(path: &str) -> Request {
    Request::get(Url::parse(ORIGIN).unwrap().join(path).unwrap())
}

pub fn navigate(path: &str) -> Request {
    Request::navigate(Url::parse(ORIGIN).unwrap().join(path).unwrap())
}

#[derive(Clone)]
enum Script {
    Respond(Response),
    Fail,
    Hang,
}

/// Network keyed by URL path. Unscripted paths answer 404.
#[derive(Default)]
pub struct FakeNetwork {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<HashMap<String, usize>>,
    navigations: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl FakeNetwork {
    /// Every default manifest URL answers 200.
    pub fn site() -> Self {
        let network = Self::default();
        for path in AppConfig::default().precache {
            let response = match path.as_str() {
                "/offline.html" => Response::html(200, "<h1>offline page</h1>"),
                p if p.ends_with(".css") => Response::new(200, Some("text/css".into()), format!("/* {p} */")),
                p if p.ends_with(".js") => Response::new(200, Some("text/javascript".into()), format!("// {p}")),
                p => Response::html(200, format!("<p>{p}</p>")),
            };
            network.respond(&path, response);
        }
        network
    }

    pub fn respond(&self, path: &str, response: Response) {
        self.script(path, Script::Respond(response));
    }

    pub fn fail(&self, path: &str) {
        self.script(path, Script::Fail);
    }

    /// The request never completes.
    pub fn hang(&self, path: &str) {
        self.script(path, Script::Hang);
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    /// Paths requested in navigation mode, in call order.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn script(&self, path: &str, script: Script) {
        self.scripts.lock().unwrap().insert(path.to_string(), script);
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let path = request.url.path().to_string();
        *self.calls.lock().unwrap().entry(path.clone()).or_default() += 1;
        if request.is_navigation() {
            self.navigations.lock().unwrap().push(path.clone());
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{}: offline", request.url)));
        }

        let script = self.scripts.lock().unwrap().get(&path).cloned();
        match script {
            Some(Script::Respond(response)) => Ok(response),
            Some(Script::Fail) => Err(Error::Network(format!("{}: connection reset", request.url))),
            Some(Script::Hang) => futures_util::future::pending().await,
            None => Ok(Response::text(404, "not found")),
        }
    }
}

/// `CacheDb` whose writes can be made to fail.
pub struct FlakyStorage {
    inner: CacheDb,
    fail_puts: AtomicBool,
}

impl FlakyStorage {
    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStorage for FlakyStorage {
    async fn open_bucket(&self, name: &str) -> Result<(), Error> {
        self.inner.create_bucket(name).await
    }

    async fn has_bucket(&self, name: &str) -> Result<bool, Error> {
        self.inner.has_bucket(name).await
    }

    async fn bucket_names(&self) -> Result<Vec<String>, Error> {
        self.inner.bucket_names().await
    }

    async fn delete_bucket(&self, name: &str) -> Result<bool, Error> {
        self.inner.delete_bucket(name).await
    }

    async fn match_entry(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.inner.match_entry(bucket, request).await
    }

    async fn put_entry(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::InvalidInput("quota exceeded".into()));
        }
        self.inner.put_entry(bucket, request, response).await
    }

    async fn entries(&self, bucket: &str) -> Result<Vec<StoredEntry>, Error> {
        self.inner.entries(bucket).await
    }

    async fn delete_entry(&self, bucket: &str, request: &Request) -> Result<bool, Error> {
        self.inner.delete_entry(bucket, request).await
    }

    async fn bucket_info(&self) -> Result<Vec<BucketInfo>, Error> {
        self.inner.bucket_info().await
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().unwrap().clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.events.lock().unwrap().push(diagnostic);
    }
}

#[derive(Default)]
pub struct RecordingHost {
    windows: Mutex<Vec<WindowClient>>,
    claims: AtomicUsize,
    focused: Mutex<Vec<String>>,
    opened: Mutex<Vec<String>>,
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingHost {
    pub fn with_windows(windows: Vec<WindowClient>) -> Self {
        Self { windows: Mutex::new(windows), ..Default::default() }
    }

    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    pub fn focused(&self) -> Vec<String> {
        self.focused.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkerHost for RecordingHost {
    async fn claim_clients(&self) -> Result<usize, Error> {
        self.claims.fetch_add(1, Ordering::SeqCst);
        Ok(self.windows.lock().unwrap().len())
    }

    async fn window_clients(&self) -> Result<Vec<WindowClient>, Error> {
        Ok(self.windows.lock().unwrap().clone())
    }

    async fn focus(&self, client_id: &str) -> Result<(), Error> {
        self.focused.lock().unwrap().push(client_id.to_string());
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<String, Error> {
        let mut windows = self.windows.lock().unwrap();
        let id = format!("tab-{}", windows.len() + 1);
        windows.push(WindowClient { id: id.clone(), url: url.to_string() });
        self.opened.lock().unwrap().push(url.to_string());
        Ok(id)
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub struct Fixture {
    pub manager: CacheManager,
    pub db: CacheDb,
    pub storage: Arc<FlakyStorage>,
    pub network: Arc<FakeNetwork>,
    pub host: Arc<RecordingHost>,
    pub sink: Arc<RecordingSink>,
}

/// Manager for the default config over an in-memory database, a fake site
/// and two open tabs (`/` and `/contact.html`).
pub async fn fixture() -> Fixture {
    let db = CacheDb::open_in_memory().await.unwrap();
    let storage = Arc::new(FlakyStorage { inner: db.clone(), fail_puts: AtomicBool::new(false) });
    let network = Arc::new(FakeNetwork::site());
    let host = Arc::new(RecordingHost::with_windows(vec![
        WindowClient { id: "tab-1".into(), url: format!("{ORIGIN}/") },
        WindowClient { id: "tab-2".into(), url: format!("{ORIGIN}/contact.html") },
    ]));
    let sink = Arc::new(RecordingSink::default());

    let config = ManagerConfig::from_app(&AppConfig::default()).unwrap();
    let manager = CacheManager::new(config, storage.clone(), network.clone(), host.clone()).with_sink(sink.clone());

    Fixture { manager, db, storage, network, host, sink }
}
