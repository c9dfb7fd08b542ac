//! Services the hosting runtime provides to the worker: open window clients
//! and the notification surface.

use async_trait::async_trait;
use swcache_core::Error;

use crate::push::Notification;

/// An open page controlled (or controllable) by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Take control of every open page. Returns how many were claimed.
    async fn claim_clients(&self) -> Result<usize, Error>;

    async fn window_clients(&self) -> Result<Vec<WindowClient>, Error>;

    async fn focus(&self, client_id: &str) -> Result<(), Error>;

    /// Open a new window and return its client id.
    async fn open_window(&self, url: &str) -> Result<String, Error>;

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;
}
