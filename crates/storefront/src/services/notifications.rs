//! In-app notifications, newest first, persisted as JSON.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::session::{SessionError, write_private};

/// Receives messages raised by background tasks such as the order watcher.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: String);
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            created_at: Utc::now(),
            read: false,
        }
    }
}

/// Notification list shared by the front end and background tasks.
///
/// Cheap to clone; clones share state. Persistence failures are logged and
/// never fail the caller.
#[derive(Clone, Default)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Vec<Notification>>>,
    path: Option<Arc<PathBuf>>,
}

impl NotificationCenter {
    /// A center that is not persisted.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load notifications from `path`; a missing file starts empty.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let list = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), count = list.len(), "Notifications loaded");

        Ok(Self {
            inner: Arc::new(Mutex::new(list)),
            path: Some(Arc::new(path)),
        })
    }

    /// Prepend an unread notification.
    pub fn add(&self, message: impl Into<String>) -> Notification {
        let notification = Notification::new(message);
        self.update(|list| list.insert(0, notification.clone()));
        notification
    }

    pub fn mark_all_read(&self) {
        self.update(|list| {
            for n in list.iter_mut() {
                n.read = true;
            }
        });
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.lock().iter().filter(|n| !n.read).count()
    }

    /// All notifications, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut Vec<Notification>)) {
        let mut list = self.lock();
        f(&mut list);
        if let Some(path) = &self.path {
            persist(path, &list);
        }
    }
}

impl NotificationSink for NotificationCenter {
    fn notify(&self, message: String) {
        self.add(message);
    }
}

fn persist(path: &Path, list: &[Notification]) {
    let result = serde_json::to_vec_pretty(list)
        .map_err(SessionError::from)
        .and_then(|bytes| write_private(path, &bytes).map_err(SessionError::from));
    if let Err(e) = result {
        warn!(error = %e, path = %path.display(), "Could not save notifications");
    }
}
