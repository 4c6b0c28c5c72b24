//! Integration tests for Emporium.
//!
//! The tests under `tests/` run the real client and page controllers
//! against [`StubBackend`], an in-process axum server that implements the
//! store backend's dashboard REST surface over an in-memory [`Store`] and
//! records every request it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use emporium_integration_tests::StubBackend;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = StubBackend::spawn().await?;
//! let api = backend.admin_api()?;
//! let stats = api.stats().await?.data;
//! assert_eq!(stats.total_products, 4);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod routes;
pub mod state;
pub mod store;

use std::net::SocketAddr;

use emporium_client::{ApiClient, ApiError, ApiOrigin, DashboardApi, Session, SessionUser};
use tokio::net::TcpListener;
use tokio::sync::MutexGuard;
use tokio::task::JoinHandle;

pub use state::StubState;
pub use store::{ADMIN_TOKEN, CUSTOMER_TOKEN, PASSWORD, RecordedRequest, Store, UploadedImage};

/// A stub backend listening on an ephemeral local port. The server stops
/// when this value is dropped.
pub struct StubBackend {
    addr: SocketAddr,
    state: StubState,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Start a backend over [`Store::seeded`].
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        Self::spawn_with(Store::seeded()).await
    }

    /// Start a backend over `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn_with(store: Store) -> std::io::Result<Self> {
        let state = StubState::new(store);
        let app = routes::router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tracing::debug!(%addr, "Stub backend listening");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Stub backend stopped");
            }
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL requests are resolved against, e.g. `http://127.0.0.1:4242/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// The backend as an API origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse as an origin.
    pub fn origin(&self) -> Result<ApiOrigin, ApiError> {
        ApiOrigin::parse(&self.base_url()).map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    /// An adapter for `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn client(&self, session: Session) -> Result<ApiClient, ApiError> {
        ApiClient::new(self.origin()?, session)
    }

    /// A resource service for `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn api(&self, session: Session) -> Result<DashboardApi, ApiError> {
        Ok(DashboardApi::new(self.client(session)?))
    }

    /// A resource service signed in as the seeded staff user.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn admin_api(&self) -> Result<DashboardApi, ApiError> {
        self.api(admin_session())
    }

    /// Lock the backend's store for inspection or setup.
    pub async fn store(&self) -> MutexGuard<'_, Store> {
        self.state.store().await
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests().await
    }

    /// Requests whose path starts with `prefix`.
    pub async fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }

    pub async fn clear_requests(&self) {
        self.state.clear_requests().await;
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Session of the seeded staff user.
#[must_use]
pub fn admin_session() -> Session {
    Session::from_parts(
        Some(ADMIN_TOKEN.to_owned().into()),
        Some(SessionUser {
            email: "admin@example.com".to_owned(),
            is_staff: true,
        }),
    )
}

/// Session of the seeded customer.
#[must_use]
pub fn customer_session() -> Session {
    Session::from_parts(
        Some(CUSTOMER_TOKEN.to_owned().into()),
        Some(SessionUser {
            email: "customer@example.com".to_owned(),
            is_staff: false,
        }),
    )
}
