//! Post use-case service.
//!
//! # Responsibility
//! - Provide post save/get/list/delete entry points with feed notification.
//! - Enforce the status transition guard and edit permissions.
//! - Apply comment-count bookkeeping when the comment subsystem notifies a
//!   moderation change.
//!
//! # Invariants
//! - `comments_count` changes only pass through `comment_status_changed`.
//! - Saves triggered by comment bookkeeping never notify the feed.
//! - Capability-gated operations are complete no-ops or errors when the
//!   component is not installed.

use crate::capability::{Capabilities, Component};
use crate::model::blog::BlogId;
use crate::model::comment::{CommentNotice, CommentStatus};
use crate::model::post::{Post, PostId, PostStatus};
use crate::model::viewer::{UserId, Viewer};
use crate::repo::post_repo::{PostListQuery, PostRepository, RepoError, RepoResult};
use crate::service::feed::FeedNotifier;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Options for one save operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Skip the dependent feed-update notification for this save only.
    pub suppress_feed_update: bool,
}

/// Request model for creating a draft post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftPostRequest {
    pub author: UserId,
    pub title: String,
    pub body: String,
    pub tease: String,
    /// Free-form tag string handed to the external tagging subsystem.
    pub tags: String,
    pub blog_id: Option<BlogId>,
    pub creator_ip: Option<String>,
}

/// Service error for post use-cases.
#[derive(Debug)]
pub enum PostServiceError {
    PostNotFound(PostId),
    InvalidStatusTransition { from: PostStatus, to: PostStatus },
    ComponentNotInstalled(Component),
    Repo(RepoError),
}

impl Display for PostServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PostNotFound(id) => write!(f, "post not found: {id}"),
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "invalid post status transition: {from:?} -> {to:?}")
            }
            Self::ComponentNotInstalled(component) => {
                write!(f, "component is not installed: {component}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PostServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PostServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PostNotFound(id) => Self::PostNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Post service facade over repository implementations.
pub struct PostService<R: PostRepository> {
    repo: R,
    capabilities: Capabilities,
    feed: Option<Box<dyn FeedNotifier>>,
}

impl<R: PostRepository> PostService<R> {
    /// Creates a service with the given installed-component configuration
    /// and no feed notifier.
    pub fn new(repo: R, capabilities: Capabilities) -> Self {
        Self {
            repo,
            capabilities,
            feed: None,
        }
    }

    /// Attaches the external feed collaborator.
    pub fn with_feed_notifier(mut self, feed: Box<dyn FeedNotifier>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Creates and persists a draft from request input.
    pub fn create_draft(&mut self, request: DraftPostRequest) -> Result<Post, PostServiceError> {
        let mut post = Post::new(request.author, request.title, request.body);
        post.tease = request.tease;
        post.tags = request.tags;
        post.blog_id = request.blog_id;
        post.creator_ip = request.creator_ip;
        self.save_post(&mut post)?;
        Ok(post)
    }

    /// Persists the post and notifies the feed collaborator.
    ///
    /// First saves assign `id` and the `"<id>-<title>"` slug; a non-empty
    /// slug is left untouched even when the title changed.
    pub fn save_post(&mut self, post: &mut Post) -> Result<PostId, PostServiceError> {
        self.save_post_with(post, &SaveOptions::default())
    }

    /// Persists the post with explicit save options.
    pub fn save_post_with(
        &mut self,
        post: &mut Post,
        options: &SaveOptions,
    ) -> Result<PostId, PostServiceError> {
        let id = self.repo.save_post(post)?;
        if !options.suppress_feed_update {
            if let Some(feed) = &self.feed {
                feed.post_saved(post);
            }
        }
        Ok(id)
    }

    /// Gets one post by id.
    pub fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        self.repo.get_post(id)
    }

    /// Gets one post by slug (most recent match).
    pub fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        self.repo.get_post_by_slug(slug)
    }

    /// Lists posts using filter and pagination options.
    pub fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<Post>> {
        self.repo.list_posts(query)
    }

    /// Removes a post permanently.
    pub fn delete_post(&mut self, id: PostId) -> Result<(), PostServiceError> {
        self.repo.delete_post(id)?;
        Ok(())
    }

    /// Moves the post to `next` and persists, rejecting transitions the
    /// lifecycle guard forbids.
    pub fn set_status(
        &mut self,
        post: &mut Post,
        next: PostStatus,
    ) -> Result<(), PostServiceError> {
        if !post.status.can_transition_to(next) {
            return Err(PostServiceError::InvalidStatusTransition {
                from: post.status,
                to: next,
            });
        }
        post.status = next;
        self.save_post(post)?;
        Ok(())
    }

    /// Writes rating aggregates; rejected unless the rating component is
    /// installed.
    pub fn set_rating(
        &mut self,
        post: &mut Post,
        rating: i64,
        rating_score: f64,
    ) -> Result<(), PostServiceError> {
        if !self.capabilities.has(Component::Rating) {
            return Err(PostServiceError::ComponentNotInstalled(Component::Rating));
        }
        post.rating = Some(rating);
        post.rating_score = Some(rating_score);
        self.save_post(post)?;
        Ok(())
    }

    /// Edit permission: authenticated, and either the author or a moderator
    /// of the post's blog. Never fails closed into an error; missing
    /// relations degrade to `false`.
    pub fn can_edit(&self, post: &Post, viewer: &Viewer) -> RepoResult<bool> {
        let user_id = match viewer.user_id() {
            Some(id) => id,
            None => return Ok(false),
        };

        if post.author == user_id {
            return Ok(true);
        }

        match post.blog_id {
            Some(blog_id) => self.repo.moderator_grant_exists(blog_id, user_id),
            None => Ok(false),
        }
    }

    /// Notification hook for the external comment subsystem.
    ///
    /// A comment becoming public bumps `comments_count` and refreshes
    /// `last_comment_datetime`; unapproval or deletion decrements the
    /// count. The post is persisted with the feed notification suppressed.
    /// Complete no-op when the comments component is not installed.
    pub fn comment_status_changed(
        &mut self,
        post: &mut Post,
        notice: &CommentNotice,
        status: CommentStatus,
    ) -> Result<(), PostServiceError> {
        if !self.capabilities.has(Component::Comments) {
            return Ok(());
        }

        match status {
            CommentStatus::Public => {
                post.comments_count += 1;
                post.last_comment_datetime = notice.created_at;
            }
            CommentStatus::Unapproved | CommentStatus::Deleted => {
                post.comments_count -= 1;
            }
        }

        self.save_post_with(
            post,
            &SaveOptions {
                suppress_feed_update: true,
            },
        )?;
        Ok(())
    }
}
