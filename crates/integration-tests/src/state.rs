//! Shared state of the stub backend.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::store::{RecordedRequest, Store};

/// Store and request log, shared between handlers and the test driving
/// the backend.
#[derive(Clone)]
pub struct StubState {
    inner: Arc<StubStateInner>,
}

struct StubStateInner {
    store: Mutex<Store>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubState {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(StubStateInner {
                store: Mutex::new(store),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Lock the store.
    pub async fn store(&self) -> MutexGuard<'_, Store> {
        self.inner.store.lock().await
    }

    pub async fn record(&self, request: RecordedRequest) {
        self.inner.requests.lock().await.push(request);
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.requests.lock().await.clone()
    }

    pub async fn clear_requests(&self) {
        self.inner.requests.lock().await.clear();
    }
}
