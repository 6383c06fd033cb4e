//! Post domain model.
//!
//! # Responsibility
//! - Define the authored-article record and its lifecycle status.
//! - Keep the permission predicates pure; `can_edit` needs storage and
//!   therefore lives in `PostService`.
//!
//! # Invariants
//! - `slug`, once non-empty, is never recomputed, even when the title
//!   changes later.
//! - `comments_count` is only ever mutated by the comment status-change
//!   hook, never by a direct caller.
//! - Posts order most-recently-updated first.

use crate::model::blog::{Blog, BlogId};
use crate::model::viewer::{UserId, Viewer};
use crate::model::now_epoch_ms;
use crate::routes;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned post row id.
pub type PostId = i64;

/// Maximum post title length, in characters.
pub const POST_TITLE_MAX_CHARS: usize = 200;

/// Lifecycle status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Draft,
    Public,
    Deleted,
}

impl PostStatus {
    /// Returns whether a transition to `next` is allowed.
    ///
    /// Everything is permitted except resurrecting a deleted post straight
    /// to public; it has to pass through draft first.
    pub fn can_transition_to(self, next: PostStatus) -> bool {
        !(self == Self::Deleted && next == Self::Public)
    }
}

/// An authored article, optionally belonging to a blog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Row id; `None` until first persisted.
    pub id: Option<PostId>,
    pub title: String,
    /// Empty string until assigned on first save.
    pub slug: String,
    pub author: UserId,
    /// IP address the post was created from, free-form.
    pub creator_ip: Option<String>,
    /// Short preview text shown in listings.
    pub tease: String,
    pub body: String,
    pub status: PostStatus,
    pub allow_comments: bool,
    /// Publication timestamp, epoch milliseconds.
    pub publish: i64,
    pub created_at: i64,
    pub updated_at: i64,
    /// Free-form tag string; the external tagging subsystem parses it.
    pub tags: String,
    /// Owning blog; `None` for personal posts.
    pub blog_id: Option<BlogId>,
    /// Cache maintained by the comment status-change hook.
    pub comments_count: i64,
    /// Cache of the newest public comment's creation time.
    pub last_comment_datetime: i64,
    /// Vote count written by the rating subsystem, when installed.
    pub rating: Option<i64>,
    /// Aggregate score written by the rating subsystem, when installed.
    pub rating_score: Option<f64>,
}

impl Post {
    /// Creates a draft with all timestamps set to now.
    pub fn new(author: UserId, title: impl Into<String>, body: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: None,
            title: title.into(),
            slug: String::new(),
            author,
            creator_ip: None,
            tease: String::new(),
            body: body.into(),
            status: PostStatus::Draft,
            allow_comments: true,
            publish: now,
            created_at: now,
            updated_at: now,
            tags: String::new(),
            blog_id: None,
            comments_count: 0,
            last_comment_datetime: now,
            rating: None,
            rating_score: None,
        }
    }

    /// Checks field-level constraints before persistence.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        if self.title.trim().is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        let title_chars = self.title.chars().count();
        if title_chars > POST_TITLE_MAX_CHARS {
            return Err(PostValidationError::TitleTooLong { chars: title_chars });
        }
        Ok(())
    }

    /// True iff the post is publicly visible.
    pub fn is_public(&self) -> bool {
        self.status == PostStatus::Public
    }

    /// Visibility check: public posts are visible to everyone, authors
    /// always see their own posts. Blog access lists deliberately play no
    /// part here (unlike editing).
    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        self.is_public() || viewer.user_id() == Some(self.author)
    }

    /// Comment gate. The viewer is accepted for future per-user gating but
    /// currently unused.
    pub fn can_comment(&self, _viewer: &Viewer) -> bool {
        self.allow_comments
    }

    /// The users owning this post. Single-element today; extension point
    /// for co-authored posts.
    pub fn owners(&self) -> Vec<UserId> {
        vec![self.author]
    }

    /// Canonical URL; assumes `slug` is already populated.
    ///
    /// Blog posts resolve under their blog; personal posts resolve under
    /// the author's username, which lives in the external auth system and
    /// is passed in by the caller.
    pub fn absolute_url(&self, blog: Option<&Blog>, author_username: &str) -> String {
        match blog {
            Some(blog) => routes::blog_post_detail(&blog.slug, &self.slug),
            None => routes::blog_user_post_detail(author_username, &self.slug),
        }
    }
}

/// Field-level post validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    EmptyTitle,
    TitleTooLong { chars: usize },
}

impl Display for PostValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "post title must not be empty"),
            Self::TitleTooLong { chars } => write!(
                f,
                "post title is {chars} characters, maximum is {POST_TITLE_MAX_CHARS}"
            ),
        }
    }
}

impl Error for PostValidationError {}

#[cfg(test)]
mod tests {
    use super::{Post, PostStatus, PostValidationError};
    use crate::model::blog::Blog;
    use crate::model::viewer::Viewer;
    use uuid::Uuid;

    fn draft() -> Post {
        Post::new(Uuid::new_v4(), "Hello World", "body")
    }

    #[test]
    fn new_post_is_a_commentable_draft() {
        let post = draft();
        assert_eq!(post.status, PostStatus::Draft);
        assert!(post.allow_comments);
        assert!(!post.is_public());
        assert_eq!(post.comments_count, 0);
        assert_eq!(post.created_at, post.updated_at);
        post.validate().expect("fresh post should validate");
    }

    #[test]
    fn author_sees_own_post_regardless_of_status() {
        let mut post = draft();
        let author = Viewer::User(post.author);
        for status in [PostStatus::Draft, PostStatus::Public, PostStatus::Deleted] {
            post.status = status;
            assert!(post.is_visible_to(&author));
        }
    }

    #[test]
    fn others_see_only_public_posts() {
        let mut post = draft();
        let stranger = Viewer::User(Uuid::new_v4());
        assert!(!post.is_visible_to(&stranger));
        assert!(!post.is_visible_to(&Viewer::Anonymous));

        post.status = PostStatus::Public;
        assert!(post.is_visible_to(&stranger));
        assert!(post.is_visible_to(&Viewer::Anonymous));
    }

    #[test]
    fn can_comment_tracks_allow_comments_only() {
        let mut post = draft();
        assert!(post.can_comment(&Viewer::Anonymous));
        post.allow_comments = false;
        assert!(!post.can_comment(&Viewer::User(post.author)));
    }

    #[test]
    fn owners_contains_exactly_the_author() {
        let post = draft();
        assert_eq!(post.owners(), vec![post.author]);
    }

    #[test]
    fn deleted_posts_cannot_go_straight_public() {
        assert!(!PostStatus::Deleted.can_transition_to(PostStatus::Public));
        assert!(PostStatus::Deleted.can_transition_to(PostStatus::Draft));
        assert!(PostStatus::Draft.can_transition_to(PostStatus::Public));
        assert!(PostStatus::Public.can_transition_to(PostStatus::Deleted));
        assert!(PostStatus::Public.can_transition_to(PostStatus::Public));
    }

    #[test]
    fn absolute_url_picks_blog_or_user_pattern() {
        let mut post = draft();
        post.slug = "42-hello-world".to_string();

        let mut blog = Blog::new("Team Blog", "team-blog");
        blog.id = Some(1);
        post.blog_id = blog.id;
        assert_eq!(
            post.absolute_url(Some(&blog), "alice"),
            "/blogs/team-blog/42-hello-world/"
        );

        post.blog_id = None;
        assert_eq!(
            post.absolute_url(None, "alice"),
            "/users/alice/42-hello-world/"
        );
    }

    #[test]
    fn validate_rejects_blank_and_overlong_titles() {
        let mut post = draft();
        post.title = "  ".to_string();
        assert_eq!(post.validate(), Err(PostValidationError::EmptyTitle));

        post.title = "x".repeat(201);
        assert_eq!(
            post.validate(),
            Err(PostValidationError::TitleTooLong { chars: 201 })
        );
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&PostStatus::Public).expect("status serializes");
        assert_eq!(json, "\"public\"");
    }
}
