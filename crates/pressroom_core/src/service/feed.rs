//! Seam for the external feed-regeneration subsystem.

use crate::model::post::Post;

/// Collaborator notified after a post save so downstream feeds can
/// regenerate. Saves triggered by comment bookkeeping suppress it.
pub trait FeedNotifier {
    fn post_saved(&self, post: &Post);
}
