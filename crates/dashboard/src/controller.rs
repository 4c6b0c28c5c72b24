//! Load state shared by every page controller.
//!
//! A controller re-enters `Loading` on every filter change or mutation and
//! settles into `Success` or `Error` when the response arrives. Each fetch
//! carries a [`Ticket`]; with [`Sequencing::LatestIssued`] only the latest
//! ticket may settle, so a slow response to an older filter never replaces
//! fresher results.

use std::time::{Duration, Instant};

use emporium_client::{ApiError, ApiResponse, ErrorKind};
use tracing::debug;

/// How long a success notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// An error ready to show next to the view that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayError {
    pub kind: ErrorKind,
    pub message: String,
}

impl DisplayError {
    /// The server's message when it sent one, otherwise `fallback`.
    #[must_use]
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        Self {
            kind: err.kind(),
            message: err
                .server_message()
                .unwrap_or_else(|| fallback.to_owned()),
        }
    }
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Where a controller's data currently stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(DisplayError),
}

/// Which responses may settle a [`Loadable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sequencing {
    /// Discard any response whose ticket is not the latest issued.
    #[default]
    LatestIssued,
    /// Accept every response; whichever resolves last wins, even if it
    /// belongs to a superseded request.
    LastResolved,
}

/// Sequence number of one fetch, increasing per [`Loadable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

/// The outcome of one fetch, tagged with the ticket it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled<T> {
    pub ticket: Ticket,
    pub result: Result<T, DisplayError>,
}

impl<T> Settled<T> {
    /// Unwrap a response body, or turn the error into a [`DisplayError`].
    #[must_use]
    pub fn from_response(
        ticket: Ticket,
        response: Result<ApiResponse<T>, ApiError>,
        fallback: &str,
    ) -> Self {
        Self {
            ticket,
            result: response
                .map(ApiResponse::into_data)
                .map_err(|e| DisplayError::from_api(&e, fallback)),
        }
    }
}

/// A value fetched from the backend with its load state.
#[derive(Debug, Clone)]
pub struct Loadable<T> {
    state: LoadState<T>,
    issued: u64,
    sequencing: Sequencing,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::new(Sequencing::default())
    }
}

impl<T> Loadable<T> {
    #[must_use]
    pub const fn new(sequencing: Sequencing) -> Self {
        Self {
            state: LoadState::Idle,
            issued: 0,
            sequencing,
        }
    }

    /// Enter `Loading` and issue the next ticket.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.state = LoadState::Loading;
        Ticket(self.issued)
    }

    /// Apply a fetch outcome. Returns `false` when the outcome was stale and
    /// discarded.
    pub fn settle(&mut self, settled: Settled<T>) -> bool {
        if self.sequencing == Sequencing::LatestIssued && settled.ticket.0 != self.issued {
            debug!(
                ticket = settled.ticket.0,
                latest = self.issued,
                "Discarding stale response"
            );
            return false;
        }
        self.state = match settled.result {
            Ok(value) => LoadState::Success(value),
            Err(err) => LoadState::Error(err),
        };
        true
    }

    #[must_use]
    pub const fn state(&self) -> &LoadState<T> {
        &self.state
    }

    #[must_use]
    pub const fn sequencing(&self) -> Sequencing {
        self.sequencing
    }

    /// The latest ticket issued, if any fetch has started.
    #[must_use]
    pub const fn latest_ticket(&self) -> Option<Ticket> {
        if self.issued == 0 {
            None
        } else {
            Some(Ticket(self.issued))
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Loaded data, only in `Success`.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match &self.state {
            LoadState::Success(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&DisplayError> {
        match &self.state {
            LoadState::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// A transient success message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    message: String,
    shown_at: Instant,
}

impl Notice {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::shown_at(message, Instant::now())
    }

    #[must_use]
    pub fn shown_at(message: impl Into<String>, shown_at: Instant) -> Self {
        Self {
            message: message.into(),
            shown_at,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the notice is still visible at `now`.
    #[must_use]
    pub fn visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < NOTICE_TTL
    }
}

/// Result of a user-triggered mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The request succeeded and the list was refetched.
    Completed,
    /// The user declined the prompt; nothing was sent.
    Declined,
    /// The request failed; the message is also kept on the controller.
    Failed(DisplayError),
}

impl Outcome {
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_client::StatusCode;
    use serde_json::json;

    use super::*;

    fn ok(ticket: Ticket, value: &'static str) -> Settled<&'static str> {
        Settled {
            ticket,
            result: Ok(value),
        }
    }

    #[test]
    fn test_begin_enters_loading() {
        let mut loadable: Loadable<&str> = Loadable::default();
        assert_eq!(loadable.state(), &LoadState::Idle);
        assert_eq!(loadable.latest_ticket(), None);
        let ticket = loadable.begin();
        assert!(loadable.is_loading());
        assert_eq!(loadable.latest_ticket(), Some(ticket));
        assert!(loadable.settle(ok(ticket, "a")));
        assert_eq!(loadable.data(), Some(&"a"));
    }

    #[test]
    fn test_latest_issued_discards_stale_response() {
        let mut loadable = Loadable::new(Sequencing::LatestIssued);
        let a = loadable.begin();
        let b = loadable.begin();
        assert!(loadable.settle(ok(b, "b")));
        assert!(!loadable.settle(ok(a, "a")));
        assert_eq!(loadable.data(), Some(&"b"));
    }

    #[test]
    fn test_latest_issued_waits_for_latest() {
        let mut loadable = Loadable::new(Sequencing::LatestIssued);
        let a = loadable.begin();
        let b = loadable.begin();
        assert!(!loadable.settle(ok(a, "a")));
        assert!(loadable.is_loading());
        assert!(loadable.settle(ok(b, "b")));
        assert_eq!(loadable.data(), Some(&"b"));
    }

    #[test]
    fn test_last_resolved_lets_stale_response_win() {
        let mut loadable = Loadable::new(Sequencing::LastResolved);
        let a = loadable.begin();
        let b = loadable.begin();
        assert!(loadable.settle(ok(b, "b")));
        assert!(loadable.settle(ok(a, "a")));
        assert_eq!(loadable.data(), Some(&"a"));
    }

    #[test]
    fn test_error_state() {
        let mut loadable: Loadable<&str> = Loadable::default();
        let ticket = loadable.begin();
        let err = DisplayError {
            kind: ErrorKind::Server,
            message: "Failed to fetch products".to_string(),
        };
        loadable.settle(Settled {
            ticket,
            result: Err(err.clone()),
        });
        assert_eq!(loadable.error(), Some(&err));
        assert_eq!(loadable.data(), None);
    }

    #[test]
    fn test_display_error_prefers_server_message() {
        let err = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            url: "http://127.0.0.1:8000/api/users/admin/users/".to_string(),
            body: json!({"error": "Admin access required"}),
        };
        let shown = DisplayError::from_api(&err, "Failed to fetch users");
        assert_eq!(shown.kind, ErrorKind::Unauthorized);
        assert_eq!(shown.message, "Admin access required");

        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            url: "http://127.0.0.1:8000/api/users/admin/users/".to_string(),
            body: json!("<html>"),
        };
        let shown = DisplayError::from_api(&err, "Failed to fetch users");
        assert_eq!(shown.kind, ErrorKind::Server);
        assert_eq!(shown.to_string(), "Failed to fetch users");
    }

    #[test]
    fn test_notice_expires_after_three_seconds() {
        let start = Instant::now();
        let notice = Notice::shown_at("User has been made an admin successfully", start);
        assert!(notice.visible_at(start));
        assert!(notice.visible_at(start + Duration::from_millis(2999)));
        assert!(!notice.visible_at(start + NOTICE_TTL));
    }
}
