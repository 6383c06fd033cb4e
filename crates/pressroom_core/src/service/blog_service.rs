//! Blog use-case service.
//!
//! # Responsibility
//! - Provide blog CRUD and access-list management.
//! - Compute the effective read/write policy from global flags and grants.
//!
//! # Invariants
//! - Effective policy is the union: a global flag or any matching grant is
//!   enough.
//! - Anonymous viewers only ever get the global flags.
//!
//! # See also
//! - docs/architecture/access-control.md

use crate::model::access::BlogUserAccess;
use crate::model::blog::{Blog, BlogId};
use crate::model::post::Post;
use crate::model::viewer::{UserId, Viewer};
use crate::repo::blog_repo::{BlogListQuery, BlogRepository};
use crate::repo::post_repo::{RepoError, RepoResult};
use crate::slug::slugify;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Request model for creating a blog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlogRequest {
    pub name: String,
    /// Left empty, the slug is derived from the name.
    pub slug: String,
    pub description: String,
}

/// Service error for blog use-cases.
#[derive(Debug)]
pub enum BlogServiceError {
    BlogNotFound(BlogId),
    Repo(RepoError),
}

impl Display for BlogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlogNotFound(id) => write!(f, "blog not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BlogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::BlogNotFound(_) => None,
        }
    }
}

impl From<RepoError> for BlogServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::BlogNotFound(id) => Self::BlogNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Blog service facade over repository implementations.
pub struct BlogService<R: BlogRepository> {
    repo: R,
}

impl<R: BlogRepository> BlogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates and persists a blog, deriving the slug from the name when
    /// the request leaves it empty.
    pub fn create_blog(&self, request: NewBlogRequest) -> Result<Blog, BlogServiceError> {
        let mut blog = Blog::new(request.name, request.slug);
        blog.description = request.description;
        if blog.slug.is_empty() {
            blog.slug = slugify(&blog.name);
        }
        self.repo.create_blog(&mut blog)?;
        Ok(blog)
    }

    /// Persists changed blog fields.
    pub fn update_blog(&self, blog: &Blog) -> Result<(), BlogServiceError> {
        self.repo.update_blog(blog)?;
        Ok(())
    }

    /// Gets one blog by id.
    pub fn get_blog(&self, id: BlogId) -> RepoResult<Option<Blog>> {
        self.repo.get_blog(id)
    }

    /// Gets one blog by slug.
    pub fn get_blog_by_slug(&self, slug: &str) -> RepoResult<Option<Blog>> {
        self.repo.get_blog_by_slug(slug)
    }

    /// Lists blogs with pagination options.
    pub fn list_blogs(&self, query: &BlogListQuery) -> RepoResult<Vec<Blog>> {
        self.repo.list_blogs(query)
    }

    /// Deletes a blog; grants cascade away and owned posts are detached.
    pub fn delete_blog(&self, id: BlogId) -> Result<(), BlogServiceError> {
        self.repo.delete_blog(id)?;
        Ok(())
    }

    /// Persists one access grant row.
    pub fn grant_access(&self, access: &mut BlogUserAccess) -> Result<i64, BlogServiceError> {
        let id = self.repo.grant_access(access)?;
        Ok(id)
    }

    /// Removes every grant row for the pair; returns how many were removed.
    pub fn revoke_access(
        &self,
        blog_id: BlogId,
        user_id: UserId,
    ) -> Result<usize, BlogServiceError> {
        let removed = self.repo.revoke_access(blog_id, user_id)?;
        Ok(removed)
    }

    /// Lists every grant row of one blog, duplicates included.
    pub fn list_access(&self, blog_id: BlogId) -> RepoResult<Vec<BlogUserAccess>> {
        self.repo.list_access(blog_id)
    }

    /// Effective read policy: global flag, or a read grant for the viewer.
    pub fn can_user_read(&self, blog: &Blog, viewer: &Viewer) -> RepoResult<bool> {
        if blog.can_read {
            return Ok(true);
        }
        match (blog.id, viewer.user_id()) {
            (Some(blog_id), Some(user_id)) => self.repo.read_grant_exists(blog_id, user_id),
            _ => Ok(false),
        }
    }

    /// Effective write policy: global flag, or a write grant for the viewer.
    pub fn can_user_write(&self, blog: &Blog, viewer: &Viewer) -> RepoResult<bool> {
        if blog.can_write {
            return Ok(true);
        }
        match (blog.id, viewer.user_id()) {
            (Some(blog_id), Some(user_id)) => self.repo.write_grant_exists(blog_id, user_id),
            _ => Ok(false),
        }
    }

    /// The most recently updated public post of the blog, or `None` for an
    /// unsaved blog or a blog without public posts.
    pub fn get_last_post(&self, blog: &Blog) -> RepoResult<Option<Post>> {
        match blog.id {
            Some(blog_id) => self.repo.last_public_post(blog_id),
            None => Ok(None),
        }
    }
}
