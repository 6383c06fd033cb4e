//! Per-blog access grant rows.
//!
//! Pure data holder. `(blog_id, user_id)` is deliberately not unique, so the
//! same user can hold several rows; consumers must use existence checks,
//! never single-row lookups.

use crate::model::blog::BlogId;
use crate::model::viewer::UserId;
use serde::{Deserialize, Serialize};

/// Grant of moderator/read/write capabilities on one blog for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogUserAccess {
    /// Row id; `None` until first persisted.
    pub id: Option<i64>,
    pub blog_id: BlogId,
    pub user_id: UserId,
    pub is_moderator: bool,
    pub can_read: bool,
    pub can_write: bool,
}

impl BlogUserAccess {
    /// Creates a grant with all capability flags off.
    pub fn new(blog_id: BlogId, user_id: UserId) -> Self {
        Self {
            id: None,
            blog_id,
            user_id,
            is_moderator: false,
            can_read: false,
            can_write: false,
        }
    }

    /// Creates a moderator grant.
    pub fn moderator(blog_id: BlogId, user_id: UserId) -> Self {
        Self {
            is_moderator: true,
            ..Self::new(blog_id, user_id)
        }
    }
}
