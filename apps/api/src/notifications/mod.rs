//! Short-lived progress messages for long-running operations (provider
//! activation, model listing, tailoring). The browser polls the list.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

pub const DEFAULT_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
    /// Held until updated to another kind.
    Loading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Lifetime in milliseconds once the entry stops loading.
    pub duration: u64,
}

/// Receives progress updates. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    /// Adds an entry and returns its id.
    fn add(&self, message: &str, kind: NotificationKind) -> String;

    /// Changes the message, and the kind when given. Unknown ids are ignored.
    fn update(&self, id: &str, message: &str, kind: Option<NotificationKind>);

    fn remove(&self, id: &str);
}

struct Entry {
    notification: Notification,
    expires_at: Option<Instant>,
}

/// Newest-first list of notifications. Expired entries are pruned lazily.
#[derive(Clone)]
pub struct NotificationQueue {
    entries: Arc<Mutex<Vec<Entry>>>,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            ttl,
        }
    }

    // A poisoned lock only means another thread panicked mid-update; the
    // list itself is still well formed.
    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn expiry(&self, kind: NotificationKind) -> Option<Instant> {
        match kind {
            NotificationKind::Loading => None,
            _ => Some(Instant::now() + self.ttl),
        }
    }

    /// Live entries, newest first.
    pub fn list(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|e| e.expires_at.map_or(true, |at| at > now));
        entries.iter().map(|e| e.notification.clone()).collect()
    }
}

impl NotificationSink for NotificationQueue {
    fn add(&self, message: &str, kind: NotificationKind) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let entry = Entry {
            notification: Notification {
                id: id.clone(),
                message: message.to_string(),
                kind,
                duration: self.ttl.as_millis() as u64,
            },
            expires_at: self.expiry(kind),
        };
        self.lock().insert(0, entry);
        id
    }

    fn update(&self, id: &str, message: &str, kind: Option<NotificationKind>) {
        let expiry = kind.map(|k| self.expiry(k));
        let mut entries = self.lock();
        if let Some(entry) = entries.iter_mut().find(|e| e.notification.id == id) {
            entry.notification.message = message.to_string();
            if let Some(kind) = kind {
                let was_loading = entry.notification.kind == NotificationKind::Loading;
                entry.notification.kind = kind;
                // Leaving the loading state starts the countdown; other
                // changes keep the original deadline.
                if was_loading || kind == NotificationKind::Loading {
                    entry.expires_at = expiry.flatten();
                }
            }
        }
    }

    fn remove(&self, id: &str) {
        self.lock().retain(|e| e.notification.id != id);
    }
}
