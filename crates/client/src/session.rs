//! Session context shared by every request.
//!
//! The bearer credential is opaque to the client: it is written at login,
//! cleared at logout and read on every outgoing request. There is no expiry
//! tracking; an expired token surfaces as an `Unauthorized` error.
//!
//! [`SessionStore`] persists the session as a small key/value JSON file,
//! keyed by the fixed names [`TOKEN_KEY`] and [`USER_KEY`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Storage key holding the bearer credential.
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the signed-in user summary (JSON-encoded).
pub const USER_KEY: &str = "user";

/// File name of the key/value store inside the state directory.
const STORAGE_FILE: &str = "storage.json";

/// Errors that can occur when loading or saving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the storage file failed.
    #[error("session storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The storage file is not valid JSON.
    #[error("session storage is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

/// Who is signed in, as remembered from the login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    /// Admin flag; gates the dashboard routes.
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Default)]
struct SessionState {
    token: Option<SecretString>,
    user: Option<SessionUser>,
}

/// Injected, cloneable session context.
///
/// Clones share state, so signing out through one handle is visible to the
/// adapter holding another.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Session {
    /// A session with no credential.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::from_parts(Some(SecretString::from(token.into())), None)
    }

    /// A session from an optional token and user summary.
    #[must_use]
    pub fn from_parts(token: Option<SecretString>, user: Option<SessionUser>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState { token, user })),
        }
    }

    /// The current credential, if any.
    pub async fn token(&self) -> Option<SecretString> {
        self.inner.read().await.token.clone()
    }

    /// The signed-in user summary, if known.
    pub async fn user(&self) -> Option<SessionUser> {
        self.inner.read().await.user.clone()
    }

    /// Whether a credential is stored.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.token.is_some()
    }

    /// Store a credential (and optionally the user it belongs to).
    pub async fn sign_in(&self, token: SecretString, user: Option<SessionUser>) {
        let mut state = self.inner.write().await;
        state.token = Some(token);
        state.user = user;
    }

    /// Forget the credential and user.
    pub async fn sign_out(&self) {
        let mut state = self.inner.write().await;
        state.token = None;
        state.user = None;
    }
}

/// File-backed key/value storage for the session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Storage inside `state_dir` (created on first save).
    #[must_use]
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(STORAGE_FILE),
        }
    }

    /// Path of the storage file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session; a missing file yields an anonymous session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Session, SessionError> {
        let entries = self.read_entries().await?;

        let token = entries
            .get(TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::from(t.clone()));
        let user = match entries.get(USER_KEY) {
            Some(raw) => Some(serde_json::from_str::<SessionUser>(raw)?),
            None => None,
        };

        debug!(authenticated = token.is_some(), "Session loaded");
        Ok(Session::from_parts(token, user))
    }

    /// Persist the session, replacing the stored token and user.
    ///
    /// A storage file that does not parse is replaced rather than merged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    #[instrument(skip(self, session), fields(path = %self.path.display()))]
    pub async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(SessionError::Format(e)) => {
                warn!(error = %e, "Replacing corrupt session storage");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        match session.token().await {
            Some(token) => {
                entries.insert(TOKEN_KEY.to_owned(), token.expose_secret().to_owned());
            }
            None => {
                entries.remove(TOKEN_KEY);
            }
        }
        match session.user().await {
            Some(user) => {
                entries.insert(USER_KEY.to_owned(), serde_json::to_string(&user)?);
            }
            None => {
                entries.remove(USER_KEY);
            }
        }

        self.write_entries(&entries).await?;
        debug!("Session saved");
        Ok(())
    }

    /// Remove the token and user, keeping any other stored keys. A corrupt
    /// storage file is reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be rewritten.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.save(&Session::anonymous()).await
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(SessionError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, bytes).await.map_err(io_err)
    }
}
