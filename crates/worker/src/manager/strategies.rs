//! Per-strategy request handlers.

use std::sync::{Arc, PoisonError};

use swcache_core::{CacheStorage, Error, Request, Response};
use tokio::sync::oneshot;

use super::{CacheManager, ResponseSource};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::fallback;

type Served = (ResponseSource, Response);

/// Write a 200 response into the bucket. Failures are reported, never returned.
async fn store(
    storage: &dyn CacheStorage, sink: &dyn DiagnosticSink, bucket: &str, request: &Request, response: &Response,
) {
    if !response.is_cacheable() {
        return;
    }
    if let Err(e) = storage.put_entry(bucket, request, response).await {
        sink.report(Diagnostic::StorePutFailed { url: request.url.to_string(), error: e.to_string() });
    }
}

impl CacheManager {
    pub(super) async fn cache_first(&self, request: &Request) -> Served {
        if let Some(hit) = self.lookup(request).await {
            return (ResponseSource::Cache, hit);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                self.store(request, &response).await;
                (ResponseSource::Network, response)
            }
            Err(e) => self.offline_fallback(request, &e).await,
        }
    }

    pub(super) async fn network_first(&self, request: &Request) -> Served {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store(request, &response).await;
                (ResponseSource::Network, response)
            }
            Err(e) => match self.lookup(request).await {
                Some(hit) => {
                    tracing::debug!(url = %request.url, error = %e, "network failed, serving cached copy");
                    (ResponseSource::Cache, hit)
                }
                None => self.offline_fallback(request, &e).await,
            },
        }
    }

    pub(super) async fn stale_while_revalidate(&self, request: Request) -> Served {
        let stale = self.lookup(&request).await;
        let fresh = self.spawn_refresh(request.clone(), stale.is_some());

        if let Some(stale) = stale {
            return (ResponseSource::Cache, stale);
        }

        match fresh.await {
            Ok(Ok(response)) => (ResponseSource::Network, response),
            Ok(Err(e)) => self.offline_fallback(&request, &e).await,
            Err(_) => {
                let e = Error::Network("refresh task ended without a result".into());
                self.offline_fallback(&request, &e).await
            }
        }
    }

    /// Fetch in the background and overwrite the entry on a 200.
    ///
    /// The receiver yields the network result once the entry is stored. When
    /// `stale_served` is set nobody waits on it, so a failure goes to the sink.
    fn spawn_refresh(&self, request: Request, stale_served: bool) -> oneshot::Receiver<Result<Response, Error>> {
        let (tx, rx) = oneshot::channel();
        let network = Arc::clone(&self.network);
        let storage = Arc::clone(&self.storage);
        let sink = Arc::clone(&self.sink);
        let bucket = self.config.cache_name.clone();

        let task = async move {
            let result = network.fetch(&request).await;
            match &result {
                Ok(response) => store(storage.as_ref(), sink.as_ref(), &bucket, &request, response).await,
                Err(e) if stale_served => {
                    sink.report(Diagnostic::RevalidationFailed { url: request.url.to_string(), error: e.to_string() })
                }
                Err(_) => {}
            }
            let _ = tx.send(result);
        };

        let mut tasks = self.background.lock().unwrap_or_else(PoisonError::into_inner);
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);

        rx
    }

    /// Bucket lookup; storage errors count as a miss.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        match self.storage.match_entry(&self.config.cache_name, request).await {
            Ok(hit) => hit,
            Err(e) => {
                self.sink
                    .report(Diagnostic::StoreLookupFailed { url: request.url.to_string(), error: e.to_string() });
                None
            }
        }
    }

    async fn store(&self, request: &Request, response: &Response) {
        store(self.storage.as_ref(), self.sink.as_ref(), &self.config.cache_name, request, response).await;
    }

    /// Navigations get the offline page, then the home page, then an inline
    /// notice. Everything else gets a 408.
    async fn offline_fallback(&self, request: &Request, error: &Error) -> Served {
        self.sink.report(Diagnostic::NetworkFailed { url: request.url.to_string(), error: error.to_string() });

        if !request.is_navigation() {
            return (ResponseSource::Fallback, fallback::network_error());
        }

        for page in [&self.config.offline_page, &self.config.home_page] {
            let Ok(page_request) = self.config.request_for(page) else {
                continue;
            };
            if let Some(hit) = self.lookup(&page_request).await {
                return (ResponseSource::Fallback, hit);
            }
        }

        (ResponseSource::Fallback, fallback::offline_document())
    }
}
