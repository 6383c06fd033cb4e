//! Blog domain model.
//!
//! # Responsibility
//! - Define the blog container record and its validation rules.
//! - Derive the canonical blog URL.
//!
//! # Invariants
//! - `can_read`/`can_write` are the global policy; per-user grants only ever
//!   widen it (the union is computed in `BlogService`).
//! - `slug` is not unique at the schema level.

use crate::routes;
use crate::slug::is_valid_slug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned blog row id.
pub type BlogId = i64;

/// Asset path used when no icon has been uploaded.
pub const DEFAULT_BLOG_ICON: &str = "blog_icons/default.jpg";

/// Maximum blog name length, in characters.
pub const BLOG_NAME_MAX_CHARS: usize = 200;
/// Maximum blog description length, in characters.
pub const BLOG_DESCRIPTION_MAX_CHARS: usize = 256;

/// A named container of posts with a visibility policy and an access list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    /// Row id; `None` until first persisted.
    pub id: Option<BlogId>,
    pub name: String,
    /// URL-safe identifier; not enforced unique.
    pub slug: String,
    /// Path of the uploaded icon in the external image store.
    pub icon: String,
    pub description: String,
    /// Whether everybody can read, regardless of grants.
    pub can_read: bool,
    /// Whether everybody can write, regardless of grants.
    pub can_write: bool,
}

impl Blog {
    /// Creates a blog with the default icon and open read/write policy.
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            slug: slug.into(),
            icon: DEFAULT_BLOG_ICON.to_string(),
            description: String::new(),
            can_read: true,
            can_write: true,
        }
    }

    /// Checks field-level constraints before persistence.
    pub fn validate(&self) -> Result<(), BlogValidationError> {
        if self.name.trim().is_empty() {
            return Err(BlogValidationError::EmptyName);
        }
        let name_chars = self.name.chars().count();
        if name_chars > BLOG_NAME_MAX_CHARS {
            return Err(BlogValidationError::NameTooLong { chars: name_chars });
        }
        let description_chars = self.description.chars().count();
        if description_chars > BLOG_DESCRIPTION_MAX_CHARS {
            return Err(BlogValidationError::DescriptionTooLong {
                chars: description_chars,
            });
        }
        if !self.slug.is_empty() && !is_valid_slug(&self.slug) {
            return Err(BlogValidationError::InvalidSlug(self.slug.clone()));
        }
        Ok(())
    }

    /// Canonical URL; assumes `slug` is already populated.
    pub fn absolute_url(&self) -> String {
        routes::blog_detail(&self.slug)
    }
}

/// Field-level blog validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlogValidationError {
    EmptyName,
    NameTooLong { chars: usize },
    DescriptionTooLong { chars: usize },
    InvalidSlug(String),
}

impl Display for BlogValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "blog name must not be empty"),
            Self::NameTooLong { chars } => write!(
                f,
                "blog name is {chars} characters, maximum is {BLOG_NAME_MAX_CHARS}"
            ),
            Self::DescriptionTooLong { chars } => write!(
                f,
                "blog description is {chars} characters, maximum is {BLOG_DESCRIPTION_MAX_CHARS}"
            ),
            Self::InvalidSlug(value) => write!(f, "blog slug is not URL-safe: `{value}`"),
        }
    }
}

impl Error for BlogValidationError {}

#[cfg(test)]
mod tests {
    use super::{Blog, BlogValidationError, DEFAULT_BLOG_ICON};

    #[test]
    fn new_blog_defaults_to_open_policy_and_default_icon() {
        let blog = Blog::new("Team Blog", "team-blog");
        assert!(blog.can_read);
        assert!(blog.can_write);
        assert_eq!(blog.icon, DEFAULT_BLOG_ICON);
        assert_eq!(blog.id, None);
        blog.validate().expect("fresh blog should validate");
    }

    #[test]
    fn validate_rejects_empty_name() {
        let blog = Blog::new("   ", "team-blog");
        assert_eq!(blog.validate(), Err(BlogValidationError::EmptyName));
    }

    #[test]
    fn validate_rejects_overlong_description() {
        let mut blog = Blog::new("Team Blog", "team-blog");
        blog.description = "x".repeat(300);
        assert_eq!(
            blog.validate(),
            Err(BlogValidationError::DescriptionTooLong { chars: 300 })
        );
    }

    #[test]
    fn validate_rejects_unsafe_slug() {
        let blog = Blog::new("Team Blog", "team blog!");
        assert!(matches!(
            blog.validate(),
            Err(BlogValidationError::InvalidSlug(_))
        ));
    }

    #[test]
    fn absolute_url_uses_blog_detail_pattern() {
        let blog = Blog::new("Team Blog", "team-blog");
        assert_eq!(blog.absolute_url(), "/blogs/team-blog/");
    }
}
