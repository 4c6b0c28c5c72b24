//! Store user accounts as seen by the admin endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Admin flag.
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

const fn default_active() -> bool {
    true
}

impl User {
    /// "First Last" when both name parts are present, otherwise the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.first_name.is_empty() || self.last_name.is_empty() {
            self.email.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    /// Uppercased first letter of the email, used as an avatar.
    #[must_use]
    pub fn initial(&self) -> char {
        self.email
            .chars()
            .next()
            .map_or('?', |c| c.to_ascii_uppercase())
    }
}

/// Response of the promote-to-admin endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoteResult {
    pub message: String,
    pub user: User,
}
