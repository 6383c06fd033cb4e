//! Requesting principal passed to permission predicates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a user in the external auth system.
pub type UserId = Uuid;

/// The principal a permission check runs against.
///
/// Replaces implicit "is the session authenticated" state with an explicit
/// value: anonymous viewers never pass ownership or grant checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viewer {
    Anonymous,
    User(UserId),
}

impl Viewer {
    /// Returns whether this viewer is an authenticated user.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Returns the authenticated user id, if any.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }
}
