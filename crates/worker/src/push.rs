//! Push payloads and the notifications built from them.

use serde::{Deserialize, Serialize};
use swcache_core::Error;

/// Body of an incoming push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl PushPayload {
    /// Decode a push message body.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the data is empty or not the expected JSON.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::InvalidInput("push message has no payload".into()));
        }
        serde_json::from_slice(data).map_err(|e| Error::InvalidInput(format!("malformed push payload: {e}")))
    }
}

/// A notification as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
    /// Page opened on click.
    pub url: String,
}

pub const DEFAULT_CLICK_URL: &str = "/";

impl Notification {
    pub fn from_payload(payload: PushPayload, icon: Option<String>, badge: Option<String>) -> Self {
        Self {
            title: payload.title,
            body: payload.body,
            icon,
            badge,
            url: payload
                .url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CLICK_URL.to_string()),
        }
    }
}

/// What a notification click did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// An existing window already showed the target and was focused.
    Focused { client_id: String, url: String },
    /// A new window was opened at the target.
    Opened { client_id: String, url: String },
}
