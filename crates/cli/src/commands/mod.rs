//! Command implementations.
//!
//! Every command builds a [`Context`] from the environment, drives a page
//! controller or the session store, and writes plain text to stdout.

pub mod categories;
pub mod open;
pub mod products;
pub mod reviews;
pub mod session;
pub mod users;

use std::io::Write;

use emporium_client::{
    ApiClient, ApiError, ClientConfig, ConfigError, DashboardApi, Session, SessionError,
    SessionStore,
};
use emporium_dashboard::{Confirm, Outcome};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A mutation was rejected; carries the message already shown.
    #[error("{0}")]
    Failed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Everything a command needs: configuration, session and API access.
pub struct Context {
    pub config: ClientConfig,
    pub store: SessionStore,
    pub session: Session,
    pub api: DashboardApi,
    pub confirm: Box<dyn Confirm>,
}

impl Context {
    /// Load configuration and the stored session.
    ///
    /// `EMPORIUM_API_TOKEN` takes precedence over the stored token; the
    /// stored user summary is kept either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file is unreadable or the HTTP
    /// client cannot be built.
    pub async fn load(config: ClientConfig, confirm: Box<dyn Confirm>) -> Result<Self, CommandError> {
        let store = SessionStore::new(&config.state_dir);
        let stored = stored_session(&store).await?;
        let session = match &config.api_token {
            Some(token) => Session::from_parts(Some(token.clone()), stored.user().await),
            None => stored,
        };

        let client = ApiClient::new(config.api_origin.clone(), session.clone())?;
        tracing::debug!(origin = %config.api_origin, "Client ready");

        Ok(Self {
            config,
            store,
            session,
            api: DashboardApi::new(client),
            confirm,
        })
    }
}

/// The stored session; a storage file that does not parse reads as signed
/// out so `session clear` and `session set-token` can replace it.
async fn stored_session(store: &SessionStore) -> Result<Session, CommandError> {
    match store.load().await {
        Ok(session) => Ok(session),
        Err(SessionError::Format(e)) => {
            tracing::warn!(
                path = %store.path().display(),
                error = %e,
                "Ignoring corrupt session storage"
            );
            Ok(Session::anonymous())
        }
        Err(e) => Err(e.into()),
    }
}

/// Write `text` to stdout followed by a newline.
pub fn print(text: &str) -> Result<(), CommandError> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{text}")?;
    Ok(())
}

/// Report a mutation outcome; failures become command errors.
pub fn report(outcome: Outcome, done: &str) -> Result<(), CommandError> {
    match outcome {
        Outcome::Completed => print(done),
        Outcome::Declined => print("Cancelled."),
        Outcome::Failed(err) => Err(CommandError::Failed(err.message)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_corrupt_session_reads_as_signed_out() {
        let dir = std::env::temp_dir()
            .join(format!("emporium-cli-corrupt-{}", std::process::id()));
        let store = SessionStore::new(&dir);
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(store.path(), br#"{"token": 42}"#).await.unwrap();

        let session = stored_session(&store).await.unwrap();
        assert!(!session.is_authenticated().await);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
