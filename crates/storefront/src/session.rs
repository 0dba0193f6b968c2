//! Persisted login session.
//!
//! Holds what the browser kept in local storage: the bearer token, the
//! logged-in user and the address picked for checkout.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use fruity_core::AddressId;

use crate::api::User;

/// Errors reading or writing the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Current session state.
#[derive(Default)]
pub struct Session {
    pub token: Option<SecretString>,
    pub user: Option<User>,
    pub selected_address_id: Option<AddressId>,
}

impl Session {
    /// A fresh session for a successful login.
    #[must_use]
    pub fn logged_in(token: SecretString, user: Option<User>) -> Self {
        Self {
            token: Some(token),
            user,
            selected_address_id: None,
        }
    }

    /// Whether a bearer token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self {
            token: self
                .token
                .as_ref()
                .map(|t| SecretString::from(t.expose_secret().to_owned())),
            user: self.user.clone(),
            selected_address_id: self.selected_address_id,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user.as_ref().map(|u| u.id))
            .field("selected_address_id", &self.selected_address_id)
            .finish()
    }
}

/// On-disk shape of a session.
#[derive(Serialize, Deserialize, Default)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_address_id: Option<AddressId>,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            token: stored
                .token
                .filter(|t| !t.trim().is_empty())
                .map(SecretString::from),
            user: stored.user,
            selected_address_id: stored.selected_address_id,
        }
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token.as_ref().map(|t| t.expose_secret().to_owned()),
            user: session.user.clone(),
            selected_address_id: session.selected_address_id,
        }
    }
}

// =============================================================================
// Stores
// =============================================================================

/// Where the session lives between runs.
pub trait SessionStore: Send + Sync {
    /// Load the saved session; a missing session is the default one.
    ///
    /// # Errors
    ///
    /// Returns an error if a saved session exists but cannot be read.
    fn load(&self) -> Result<Session, SessionError>;

    /// Replace the saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Forget the saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be removed.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Session stored as a JSON file, written atomically.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved session");
                return Ok(Session::default());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Session::default());
        }

        let stored: StoredSession = serde_json::from_str(&raw)?;
        Ok(stored.into())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(&StoredSession::from(session))?;
        write_private(&self.path, json.as_bytes())?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `contents` to `path` through a temporary sibling, readable only by
/// the owner on Unix.
pub(crate) fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600)) {
            warn!(error = %e, "Could not restrict session file permissions");
        }
    }

    fs::rename(&tmp, path)
}

/// Session kept in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Session>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session, SessionError> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Session::default();
        Ok(())
    }
}
