//! Wire types for the external comment subsystem's notifications.

use serde::{Deserialize, Serialize};

/// Moderation status of a comment, as defined by the comment subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Public,
    Unapproved,
    Deleted,
}

/// Payload the comment subsystem sends alongside a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNotice {
    /// Comment id inside the external subsystem.
    pub comment_id: i64,
    /// Comment creation time, Unix epoch milliseconds.
    pub created_at: i64,
}
