//! The offline cache manager.
//!
//! One manager owns one version of the site's cache. The host drives it
//! through five event handlers:
//!
//! - [`CacheManager::on_install`] precaches the manifest into the current bucket
//! - [`CacheManager::on_activate`] purges every other bucket and claims open pages
//! - [`CacheManager::on_fetch`] answers an intercepted request
//! - [`CacheManager::on_push`] turns a push message into a notification
//! - [`CacheManager::on_notification_click`] focuses or opens the target page

mod strategies;

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::try_join_all;
use serde::Serialize;
use swcache_core::{AppConfig, CacheStorage, Error, Request, Response};
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use url::Url;

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::fetch::{Network, parse_origin, resolve, same_origin};
use crate::host::WorkerHost;
use crate::push::{ClickOutcome, Notification, PushPayload};
use crate::strategy::Strategy;

/// Immutable per-instance configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Current bucket, `<prefix>-<version>`.
    pub cache_name: String,
    pub origin: Url,
    /// Root-relative URLs, duplicates removed, order kept.
    pub precache: Vec<String>,
    pub offline_page: String,
    pub home_page: String,
    pub notification_icon: Option<String>,
    pub notification_badge: Option<String>,
}

impl ManagerConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = parse_origin(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let mut precache: Vec<String> = Vec::with_capacity(config.precache.len());
        for path in &config.precache {
            if !precache.contains(path) {
                precache.push(path.clone());
            }
        }

        Ok(Self {
            cache_name: config.cache_name(),
            origin,
            precache,
            offline_page: config.offline_page.clone(),
            home_page: config.home_page.clone(),
            notification_icon: config.notification_icon.clone(),
            notification_badge: config.notification_badge.clone(),
        })
    }

    /// Build a GET request for a root-relative path on this origin.
    pub fn request_for(&self, path: &str) -> Result<Request, Error> {
        let url = resolve(&self.origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;
        Ok(Request::get(url))
    }

    /// Manifest request for `path`. Documents are fetched as navigations.
    fn precache_request(&self, path: &str) -> Result<Request, Error> {
        let request = self.request_for(path)?;
        if Strategy::classify(request.url.path(), false) == Strategy::NetworkFirst {
            return Ok(Request::navigate(request.url));
        }
        Ok(request)
    }
}

/// Lifecycle position of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Constructed, no install attempted.
    Parsed,
    Installing,
    /// Installed; ready to activate.
    Waiting,
    Active,
    /// Install failed or the worker was superseded.
    Redundant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallOutcome {
    pub cache_name: String,
    pub precached: usize,
    /// Activate without waiting for old pages to close.
    pub skip_waiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivateOutcome {
    /// Buckets purged, in enumeration order.
    pub deleted: Vec<String>,
    pub claimed: usize,
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Network,
    /// Offline page, home page, or a synthesized response.
    Fallback,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Network => "network",
            ResponseSource::Fallback => "fallback",
        }
    }
}

/// Result of intercepting a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not ours to handle: non-GET or cross-origin. The host fetches it directly.
    Passthrough,
    Respond { strategy: Strategy, source: ResponseSource, response: Response },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { response, .. } => Some(response),
        }
    }
}

/// Offline cache manager for one deployed version.
pub struct CacheManager {
    config: Arc<ManagerConfig>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    host: Arc<dyn WorkerHost>,
    sink: Arc<dyn DiagnosticSink>,
    state: RwLock<WorkerState>,
    background: Mutex<JoinSet<()>>,
}

impl CacheManager {
    pub fn new(
        config: ManagerConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>, host: Arc<dyn WorkerHost>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            network,
            host,
            sink: Arc::new(TracingSink),
            state: RwLock::new(WorkerState::Parsed),
            background: Mutex::new(JoinSet::new()),
        }
    }

    /// Replace the default tracing sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: WorkerState) {
        let mut current = self.state.write().await;
        tracing::debug!(from = ?*current, to = ?state, cache = %self.config.cache_name, "worker state change");
        *current = state;
    }

    /// Precache the manifest into the current bucket.
    ///
    /// All-or-nothing: every manifest URL is fetched before anything is
    /// stored, so a failed install leaves the bucket as it was.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` if any manifest fetch fails or answers
    /// with a non-2xx status, or if the responses cannot be stored. The
    /// manager becomes `Redundant` and must not be activated.
    pub async fn on_install(&self) -> Result<InstallOutcome, Error> {
        self.set_state(WorkerState::Installing).await;

        match self.precache().await {
            Ok(precached) => {
                self.set_state(WorkerState::Waiting).await;
                tracing::info!(cache = %self.config.cache_name, precached, "install complete");
                Ok(InstallOutcome { cache_name: self.config.cache_name.clone(), precached, skip_waiting: true })
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant).await;
                tracing::error!(cache = %self.config.cache_name, error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let bucket = &self.config.cache_name;
        let requests = self
            .config
            .precache
            .iter()
            .map(|path| self.config.precache_request(path))
            .collect::<Result<Vec<_>, _>>()?;

        let responses = try_join_all(requests.iter().map(|request| async move {
            match self.network.fetch(request).await {
                Ok(response) if response.is_success() => Ok(response),
                Ok(response) => {
                    Err(Error::InstallFailed(format!("{} returned status {}", request.url, response.status)))
                }
                Err(e) => Err(Error::InstallFailed(format!("{}: {e}", request.url))),
            }
        }))
        .await?;

        self.storage
            .open_bucket(bucket)
            .await
            .map_err(|e| Error::InstallFailed(format!("cannot open {bucket}: {e}")))?;
        for (request, response) in requests.iter().zip(&responses) {
            self.storage
                .put_entry(bucket, request, response)
                .await
                .map_err(|e| Error::InstallFailed(format!("storing {}: {e}", request.url)))?;
        }

        Ok(responses.len())
    }

    /// Delete every bucket except the current one, then claim open pages.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` unless a successful install came first.
    /// No bucket is touched in that case, so the previous version keeps control.
    pub async fn on_activate(&self) -> Result<ActivateOutcome, Error> {
        let state = self.state().await;
        if !matches!(state, WorkerState::Waiting | WorkerState::Active) {
            return Err(Error::InvalidInput(format!("cannot activate: worker is {state:?}")));
        }

        let current = &self.config.cache_name;
        let mut deleted = Vec::new();

        for name in self.storage.bucket_names().await? {
            if &name == current {
                continue;
            }
            if self.storage.delete_bucket(&name).await? {
                tracing::info!(bucket = %name, "deleted stale cache bucket");
                deleted.push(name);
            }
        }

        let claimed = self.host.claim_clients().await?;
        self.set_state(WorkerState::Active).await;
        tracing::info!(cache = %current, purged = deleted.len(), claimed, "activated");

        Ok(ActivateOutcome { deleted, claimed })
    }

    /// Answer an intercepted request.
    ///
    /// Never fails: network and storage problems resolve to a cached copy or
    /// a synthesized response, and are reported to the diagnostic sink.
    pub async fn on_fetch(&self, request: Request) -> FetchOutcome {
        if !request.is_get() || !same_origin(&request.url, &self.config.origin) {
            tracing::trace!(method = %request.method, url = %request.url, "passthrough");
            return FetchOutcome::Passthrough;
        }

        let strategy = Strategy::for_request(&request);
        let (source, response) = match strategy {
            Strategy::CacheFirst => self.cache_first(&request).await,
            Strategy::NetworkFirst => self.network_first(&request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request.clone()).await,
        };

        tracing::debug!(
            url = %request.url,
            %strategy,
            source = ?source,
            status = response.status,
            "served"
        );

        FetchOutcome::Respond { strategy, source, response }
    }

    /// Show a notification for a push message.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for empty or malformed payloads.
    pub async fn on_push(&self, data: &[u8]) -> Result<Notification, Error> {
        let payload = PushPayload::parse(data)?;
        let notification = Notification::from_payload(
            payload,
            self.config.notification_icon.clone(),
            self.config.notification_badge.clone(),
        );
        self.host.show_notification(&notification).await?;
        tracing::debug!(title = %notification.title, url = %notification.url, "notification shown");
        Ok(notification)
    }

    /// Focus a window already showing the notification's page, or open one.
    pub async fn on_notification_click(&self, notification: &Notification) -> Result<ClickOutcome, Error> {
        let target = resolve(&self.config.origin, &notification.url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", notification.url)))?;

        let clients = self.host.window_clients().await?;
        let existing = clients
            .into_iter()
            .find(|client| Url::parse(&client.url).is_ok_and(|u| u == target));

        if let Some(client) = existing {
            self.host.focus(&client.id).await?;
            return Ok(ClickOutcome::Focused { client_id: client.id, url: target.into() });
        }

        let client_id = self.host.open_window(target.as_str()).await?;
        Ok(ClickOutcome::Opened { client_id, url: target.into() })
    }

    /// Wait for every background refresh started so far.
    pub async fn wait_until_idle(&self) {
        let mut tasks = std::mem::take(&mut *self.background.lock().unwrap_or_else(PoisonError::into_inner));
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "background refresh task aborted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeNetwork, RecordingHost, fixture};
    use swcache_core::CacheDb;

    #[test]
    fn test_manager_config_from_app() {
        let app = AppConfig {
            precache: vec!["/".into(), "/offline.html".into(), "/".into(), "/css/styles.css".into()],
            ..Default::default()
        };
        let config = ManagerConfig::from_app(&app).unwrap();
        assert_eq!(config.cache_name, "app-cache-v1.2");
        assert_eq!(config.precache, vec!["/", "/offline.html", "/css/styles.css"]);
        assert_eq!(config.origin.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_manager_config_bad_origin() {
        let app = AppConfig { origin: "not a url".into(), ..Default::default() };
        assert!(matches!(ManagerConfig::from_app(&app), Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_install_precaches_every_manifest_url() {
        let fx = fixture().await;
        let outcome = fx.manager.on_install().await.unwrap();

        assert_eq!(outcome.cache_name, "app-cache-v1.2");
        assert!(outcome.skip_waiting);
        assert_eq!(outcome.precached, fx.manager.config().precache.len());
        assert_eq!(fx.manager.state().await, WorkerState::Waiting);

        for path in &fx.manager.config().precache {
            let request = fx.manager.config().request_for(path).unwrap();
            let hit = fx.db.match_entry("app-cache-v1.2", &request).await.unwrap();
            assert!(hit.is_some(), "{path} missing after install");
        }
    }

    #[tokio::test]
    async fn test_install_failure_stores_nothing() {
        let fx = fixture().await;
        fx.network.respond("/css/styles.css", Response::text(404, "gone"));

        let err = fx.manager.on_install().await.unwrap_err();
        assert!(matches!(err, Error::InstallFailed(msg) if msg.contains("404")));
        assert_eq!(fx.manager.state().await, WorkerState::Redundant);
        assert!(fx.db.entries("app-cache-v1.2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_failure_keeps_previous_bucket() {
        let fx = fixture().await;
        let old = fx.manager.config().request_for("/").unwrap();
        fx.db.put_entry("app-cache-v1.1", &old, &Response::html(200, "old home")).await.unwrap();
        fx.network.fail("/offline.html");

        assert!(fx.manager.on_install().await.is_err());

        let hit = fx.db.match_entry("app-cache-v1.1", &old).await.unwrap().unwrap();
        assert_eq!(hit.text_body(), "old home");
    }

    #[tokio::test]
    async fn test_activate_purges_stale_buckets() {
        let fx = fixture().await;
        fx.db.create_bucket("app-cache-v1.0").await.unwrap();
        fx.db.create_bucket("app-cache-v1.1").await.unwrap();
        fx.manager.on_install().await.unwrap();

        let outcome = fx.manager.on_activate().await.unwrap();

        assert_eq!(outcome.deleted, vec!["app-cache-v1.0", "app-cache-v1.1"]);
        assert_eq!(fx.db.bucket_names().await.unwrap(), vec!["app-cache-v1.2"]);
        assert_eq!(outcome.claimed, 2);
        assert_eq!(fx.host.claims(), 1);
        assert_eq!(fx.manager.state().await, WorkerState::Active);
    }

    #[tokio::test]
    async fn test_activate_after_failed_install_keeps_previous_bucket() {
        let fx = fixture().await;
        let old = fx.manager.config().request_for("/").unwrap();
        fx.db.put_entry("app-cache-v1.1", &old, &Response::html(200, "old home")).await.unwrap();
        fx.network.fail("/offline.html");
        assert!(fx.manager.on_install().await.is_err());

        let err = fx.manager.on_activate().await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("Redundant")));
        assert_eq!(fx.manager.state().await, WorkerState::Redundant);
        assert_eq!(fx.db.bucket_names().await.unwrap(), vec!["app-cache-v1.1"]);
        assert_eq!(fx.host.claims(), 0);
    }

    #[tokio::test]
    async fn test_activate_before_install_is_rejected() {
        let fx = fixture().await;
        fx.db.create_bucket("app-cache-v1.1").await.unwrap();

        assert!(matches!(fx.manager.on_activate().await, Err(Error::InvalidInput(_))));
        assert_eq!(fx.manager.state().await, WorkerState::Parsed);
        assert_eq!(fx.db.bucket_names().await.unwrap(), vec!["app-cache-v1.1"]);
    }

    #[tokio::test]
    async fn test_failed_install_leaves_no_empty_bucket() {
        let fx = fixture().await;
        fx.network.fail("/js/main.js");

        assert!(fx.manager.on_install().await.is_err());
        assert!(fx.db.bucket_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_fetches_documents_as_navigations() {
        let fx = fixture().await;
        fx.manager.on_install().await.unwrap();

        let mut navigations = fx.network.navigations();
        navigations.sort();
        assert_eq!(
            navigations,
            vec!["/", "/contact.html", "/gallery.html", "/index.html", "/offline.html", "/services.html"]
        );
    }

    #[tokio::test]
    async fn test_activate_twice_is_stable() {
        let fx = fixture().await;
        fx.manager.on_install().await.unwrap();
        fx.manager.on_activate().await.unwrap();

        let second = fx.manager.on_activate().await.unwrap();
        assert!(second.deleted.is_empty());
        assert_eq!(fx.db.bucket_names().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_push_shows_notification() {
        let fx = fixture().await;
        let n = fx
            .manager
            .on_push(br#"{"title":"Appointment confirmed","body":"See you Tuesday"}"#)
            .await
            .unwrap();

        assert_eq!(n.url, "/");
        assert_eq!(n.icon.as_deref(), Some("/images/icons/icon-192x192.png"));
        assert_eq!(fx.host.notifications(), vec![n]);
    }

    #[tokio::test]
    async fn test_push_rejects_bad_payload() {
        let fx = fixture().await;
        assert!(matches!(fx.manager.on_push(b"").await, Err(Error::InvalidInput(_))));
        assert!(fx.host.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_notification_click_focuses_existing_window() {
        let fx = fixture().await;
        let n = fx
            .manager
            .on_push(br#"{"title":"Quote ready","body":"Tap to view","url":"/contact.html"}"#)
            .await
            .unwrap();

        let outcome = fx.manager.on_notification_click(&n).await.unwrap();
        assert_eq!(
            outcome,
            ClickOutcome::Focused { client_id: "tab-2".into(), url: "http://localhost:8080/contact.html".into() }
        );
        assert_eq!(fx.host.focused(), vec!["tab-2"]);
    }

    #[tokio::test]
    async fn test_notification_click_opens_window() {
        let fx = fixture().await;
        let n = fx
            .manager
            .on_push(br#"{"title":"New gallery","body":"Fresh installs","url":"/gallery.html"}"#)
            .await
            .unwrap();

        let outcome = fx.manager.on_notification_click(&n).await.unwrap();
        assert!(matches!(outcome, ClickOutcome::Opened { ref url, .. } if url == "http://localhost:8080/gallery.html"));
        assert_eq!(fx.host.opened(), vec!["http://localhost:8080/gallery.html"]);
    }

    #[tokio::test]
    async fn test_independent_managers_share_nothing() {
        let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let network = Arc::new(FakeNetwork::site());
        let host = Arc::new(RecordingHost::default());

        let v1 = ManagerConfig {
            cache_name: "app-cache-v1".into(),
            ..ManagerConfig::from_app(&AppConfig::default()).unwrap()
        };
        let v2 = ManagerConfig { cache_name: "app-cache-v2".into(), ..v1.clone() };

        let old = CacheManager::new(v1, db.clone(), network.clone(), host.clone());
        let new = CacheManager::new(v2, db.clone(), network, host);

        old.on_install().await.unwrap();
        old.on_activate().await.unwrap();
        new.on_install().await.unwrap();
        new.on_activate().await.unwrap();

        assert_eq!(db.bucket_names().await.unwrap(), vec!["app-cache-v2"]);
        assert_eq!(old.cache_name(), "app-cache-v1");
    }
}
