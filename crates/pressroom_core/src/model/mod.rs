//! Domain model for blogs, posts and per-blog access grants.
//!
//! # Responsibility
//! - Define the canonical records persisted by the repository layer.
//! - Keep permission predicates pure; anything that needs storage lives in
//!   the service layer.
//!
//! # Invariants
//! - Users are externally-owned identities; only opaque ids are stored.
//! - Timestamps are Unix epoch milliseconds, captured at construction.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod access;
pub mod blog;
pub mod comment;
pub mod post;
pub mod viewer;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Falls back to 0 when the system clock reads before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}
