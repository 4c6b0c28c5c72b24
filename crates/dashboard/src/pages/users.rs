//! User administration: list and promote-to-admin.

use std::time::Instant;

use askama::Template;
use emporium_client::DashboardApi;
use emporium_core::{User, UserId};
use tracing::instrument;

use crate::confirm::Confirm;
use crate::controller::{DisplayError, Loadable, Notice, Outcome, Sequencing, Settled};

const FETCH_FALLBACK: &str = "Failed to fetch users";
const PROMOTE_FALLBACK: &str = "Failed to make user admin";
const PROMOTE_PROMPT: &str = "Are you sure you want to make this user an admin?";
const PROMOTE_NOTICE: &str = "User has been made an admin successfully";

/// Whether the "Make Admin" action is offered for `user`.
#[must_use]
pub const fn can_promote(user: &User) -> bool {
    !user.is_staff
}

/// Controller behind `/dashboard/users`.
#[derive(Debug)]
pub struct UsersController {
    api: DashboardApi,
    users: Loadable<Vec<User>>,
    mutation_error: Option<DisplayError>,
    notice: Option<Notice>,
}

impl UsersController {
    #[must_use]
    pub fn new(api: DashboardApi) -> Self {
        Self::with_sequencing(api, Sequencing::default())
    }

    #[must_use]
    pub const fn with_sequencing(api: DashboardApi, sequencing: Sequencing) -> Self {
        Self {
            api,
            users: Loadable::new(sequencing),
            mutation_error: None,
            notice: None,
        }
    }

    #[must_use]
    pub const fn users(&self) -> &Loadable<Vec<User>> {
        &self.users
    }

    #[must_use]
    pub const fn mutation_error(&self) -> Option<&DisplayError> {
        self.mutation_error.as_ref()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice_at(Instant::now())
    }

    /// The success notice if it is still visible at `now`.
    #[must_use]
    pub fn notice_at(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| n.visible_at(now))
            .map(Notice::message)
    }

    /// Fetch every user.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let ticket = self.users.begin();
        let response = self.api.users().await;
        self.users
            .settle(Settled::from_response(ticket, response, FETCH_FALLBACK));
    }

    /// Grant admin rights after confirmation, then show a notice and
    /// refetch. Users already known to be staff are skipped without a
    /// request.
    #[instrument(skip(self, confirm), fields(user_id = %id))]
    pub async fn promote(&mut self, id: UserId, confirm: &dyn Confirm) -> Outcome {
        let already_staff = self
            .users
            .data()
            .and_then(|users| users.iter().find(|u| u.id == id))
            .is_some_and(|u| !can_promote(u));
        if already_staff || !confirm.confirm(PROMOTE_PROMPT) {
            return Outcome::Declined;
        }

        match self.api.make_user_admin(id).await {
            Ok(_) => {
                self.mutation_error = None;
                self.notice = Some(Notice::new(PROMOTE_NOTICE));
                self.load().await;
                Outcome::Completed
            }
            Err(e) => {
                let shown = DisplayError::from_api(&e, PROMOTE_FALLBACK);
                self.mutation_error = Some(shown.clone());
                Outcome::Failed(shown)
            }
        }
    }

    /// Render the page as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> askama::Result<String> {
        let rows = self
            .users
            .data()
            .map(|users| users.iter().map(UserRow::from).collect())
            .unwrap_or_default();

        UsersView {
            notice: self.notice(),
            error: self
                .mutation_error
                .as_ref()
                .or_else(|| self.users.error())
                .map(|e| e.message.as_str()),
            loading: self.users.is_loading(),
            rows,
        }
        .render()
    }
}

#[derive(Debug, Clone)]
struct UserRow {
    id: UserId,
    initial: char,
    name: String,
    email: String,
    joined: String,
    badges: String,
    promotable: bool,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        let mut badges = Vec::new();
        if user.is_staff {
            badges.push("Admin");
        }
        badges.push(if user.is_active { "Active" } else { "Inactive" });

        Self {
            id: user.id,
            initial: user.initial(),
            name: user.display_name(),
            email: user.email.clone(),
            joined: user
                .date_joined
                .map_or_else(|| "-".to_owned(), |d| d.format("%Y-%m-%d").to_string()),
            badges: badges
                .iter()
                .map(|b| format!("[{b}]"))
                .collect::<Vec<_>>()
                .join(" "),
            promotable: can_promote(user),
        }
    }
}

#[derive(Template)]
#[template(path = "users.txt")]
struct UsersView<'a> {
    notice: Option<&'a str>,
    error: Option<&'a str>,
    loading: bool,
    rows: Vec<UserRow>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn user(id: i64, staff: bool, active: bool) -> User {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "email": format!("user{id}@example.com"),
            "first_name": "Ada",
            "last_name": "Lovelace",
            "is_staff": staff,
            "is_active": active,
            "date_joined": "2024-11-02T08:00:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn test_can_promote_only_non_staff() {
        assert!(can_promote(&user(1, false, true)));
        assert!(!can_promote(&user(2, true, true)));
    }

    #[test]
    fn test_row_badges() {
        let row = UserRow::from(&user(1, true, true));
        assert_eq!(row.badges, "[Admin] [Active]");
        assert!(!row.promotable);
        let row = UserRow::from(&user(2, false, false));
        assert_eq!(row.badges, "[Inactive]");
        assert_eq!(row.joined, "2024-11-02");
        assert_eq!(row.initial, 'U');
    }

    #[test]
    fn test_render() {
        let view = UsersView {
            notice: Some(PROMOTE_NOTICE),
            error: None,
            loading: false,
            rows: vec![
                UserRow::from(&user(1, true, true)),
                UserRow::from(&user(2, false, true)),
            ],
        };
        let text = view.render().unwrap();
        assert!(text.contains(PROMOTE_NOTICE));
        assert!(text.contains("#1 (U) Ada Lovelace <user1@example.com>  Joined: 2024-11-02  [Admin] [Active]\n"));
        assert!(text.contains("#2 (U) Ada Lovelace <user2@example.com>  Joined: 2024-11-02  [Active]  [Make Admin]"));
    }

    #[test]
    fn test_notice_hidden_after_ttl() {
        let api = DashboardApi::new(
            emporium_client::ApiClient::new(
                emporium_client::ApiOrigin::local(),
                emporium_client::Session::anonymous(),
            )
            .unwrap(),
        );
        let mut controller = UsersController::new(api);
        let shown = Instant::now();
        controller.notice = Some(Notice::shown_at(PROMOTE_NOTICE, shown));
        assert_eq!(controller.notice_at(shown), Some(PROMOTE_NOTICE));
        assert_eq!(controller.notice_at(shown + Duration::from_secs(3)), None);
    }
}
