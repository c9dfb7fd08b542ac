//! In-process stand-in for the browser's client and notification services.
//!
//! The stdio host has no real windows; it keeps a registry of the pages the
//! worker opened or was told about and logs notifications.

use std::sync::Mutex;

use async_trait::async_trait;
use swcache_core::Error;
use swcache_worker::{Notification, WindowClient, WorkerHost};

#[derive(Debug, Default)]
pub struct StdioHost {
    windows: Mutex<Vec<WindowClient>>,
}

impl StdioHost {
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<WindowClient>> {
        self.windows.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl WorkerHost for StdioHost {
    async fn claim_clients(&self) -> Result<usize, Error> {
        let claimed = self.lock().len();
        tracing::info!(claimed, "claimed clients");
        Ok(claimed)
    }

    async fn window_clients(&self) -> Result<Vec<WindowClient>, Error> {
        Ok(self.lock().clone())
    }

    async fn focus(&self, client_id: &str) -> Result<(), Error> {
        if !self.lock().iter().any(|w| w.id == client_id) {
            return Err(Error::InvalidInput(format!("no window client {client_id}")));
        }
        tracing::info!(client_id, "focus window");
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<String, Error> {
        let mut windows = self.lock();
        let id = format!("window-{}", windows.len() + 1);
        windows.push(WindowClient { id: id.clone(), url: url.to_string() });
        tracing::info!(client_id = %id, url, "open window");
        Ok(id)
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, body = %notification.body, url = %notification.url, "notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_then_focus() {
        let host = StdioHost::default();
        let id = host.open_window("http://localhost:8080/gallery.html").await.unwrap();

        assert_eq!(id, "window-1");
        assert_eq!(host.claim_clients().await.unwrap(), 1);
        assert!(host.focus(&id).await.is_ok());
        assert!(host.focus("window-9").await.is_err());
    }
}
