//! Data layer for the pressroom multi-author blogging application.
//! This crate is the single source of truth for blog/post/access invariants;
//! routing, rendering and authentication live in the surrounding web stack.

pub mod capability;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod routes;
pub mod service;
pub mod slug;

pub use capability::{parse_component, Capabilities, Component, ComponentError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::access::BlogUserAccess;
pub use model::blog::{Blog, BlogId, BlogValidationError, DEFAULT_BLOG_ICON};
pub use model::comment::{CommentNotice, CommentStatus};
pub use model::post::{Post, PostId, PostStatus, PostValidationError};
pub use model::viewer::{UserId, Viewer};
pub use repo::blog_repo::{BlogListQuery, BlogRepository, SqliteBlogRepository};
pub use repo::post_repo::{
    PostListQuery, PostRepository, RepoError, RepoResult, SqlitePostRepository,
};
pub use service::blog_service::{BlogService, BlogServiceError, NewBlogRequest};
pub use service::feed::FeedNotifier;
pub use service::post_service::{DraftPostRequest, PostService, PostServiceError, SaveOptions};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
