//! Named route patterns for canonical URLs.
//!
//! The surrounding web application owns actual routing; this module only
//! reproduces the named patterns models resolve their URLs against.

/// Canonical URL for one blog.
pub fn blog_detail(slug: &str) -> String {
    format!("/blogs/{slug}/")
}

/// Canonical URL for a post published inside a blog.
pub fn blog_post_detail(blog_slug: &str, slug: &str) -> String {
    format!("/blogs/{blog_slug}/{slug}/")
}

/// Canonical URL for a personal post outside any blog.
pub fn blog_user_post_detail(username: &str, slug: &str) -> String {
    format!("/users/{username}/{slug}/")
}
