//! Blog and access-list repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide blog CRUD and access-grant persistence.
//! - Own the "latest public post" lookup a blog page needs.
//!
//! # Invariants
//! - Grant queries are `EXISTS` checks; duplicate `(blog, user)` rows are
//!   tolerated everywhere, and revocation removes all of them.
//! - Deleting a blog cascades its grants and detaches its posts (enforced
//!   by the schema's foreign-key actions).

use crate::model::access::BlogUserAccess;
use crate::model::blog::{Blog, BlogId};
use crate::model::post::{Post, PostStatus};
use crate::model::viewer::UserId;
use crate::repo::post_repo::{
    parse_post_row, post_status_to_db, RepoError, RepoResult, POST_SELECT_SQL,
};
use crate::repo::{bool_to_int, ensure_connection_ready, TableRequirement};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const BLOG_SELECT_SQL: &str = "SELECT
    id,
    name,
    slug,
    icon,
    description,
    can_read,
    can_write
FROM blogs";

const ACCESS_SELECT_SQL: &str = "SELECT
    id,
    blog_id,
    user_id,
    is_moderator,
    can_read,
    can_write
FROM blog_user_access";

const BLOG_COLUMNS: &[&str] = &[
    "id",
    "name",
    "slug",
    "icon",
    "description",
    "can_read",
    "can_write",
];

const ACCESS_COLUMNS: &[&str] = &[
    "id",
    "blog_id",
    "user_id",
    "is_moderator",
    "can_read",
    "can_write",
];

/// Query options for listing blogs.
#[derive(Debug, Clone, Default)]
pub struct BlogListQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for blogs and their access lists.
pub trait BlogRepository {
    /// Persists a new blog and assigns its `id`.
    fn create_blog(&self, blog: &mut Blog) -> RepoResult<BlogId>;
    fn update_blog(&self, blog: &Blog) -> RepoResult<()>;
    fn get_blog(&self, id: BlogId) -> RepoResult<Option<Blog>>;
    fn get_blog_by_slug(&self, slug: &str) -> RepoResult<Option<Blog>>;
    fn list_blogs(&self, query: &BlogListQuery) -> RepoResult<Vec<Blog>>;
    fn delete_blog(&self, id: BlogId) -> RepoResult<()>;

    /// Persists one grant row; duplicates for the same pair are legal.
    fn grant_access(&self, access: &mut BlogUserAccess) -> RepoResult<i64>;
    /// Removes every grant row for the pair; returns how many were removed.
    fn revoke_access(&self, blog_id: BlogId, user_id: UserId) -> RepoResult<usize>;
    fn list_access(&self, blog_id: BlogId) -> RepoResult<Vec<BlogUserAccess>>;
    fn moderator_grant_exists(&self, blog_id: BlogId, user_id: UserId) -> RepoResult<bool>;
    fn read_grant_exists(&self, blog_id: BlogId, user_id: UserId) -> RepoResult<bool>;
    fn write_grant_exists(&self, blog_id: BlogId, user_id: UserId) -> RepoResult<bool>;

    /// The most recently updated public post of the blog, if any.
    fn last_public_post(&self, blog_id: BlogId) -> RepoResult<Option<Post>>;
}

/// SQLite-backed blog repository.
pub struct SqliteBlogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBlogRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                TableRequirement {
                    table: "blogs",
                    columns: BLOG_COLUMNS,
                },
                TableRequirement {
                    table: "blog_user_access",
                    columns: ACCESS_COLUMNS,
                },
                TableRequirement {
                    table: "posts",
                    columns: &["id", "blog_id", "status", "updated_at"],
                },
            ],
        )?;
        Ok(Self { conn })
    }
}

impl BlogRepository for SqliteBlogRepository<'_> {
    fn create_blog(&self, blog: &mut Blog) -> RepoResult<BlogId> {
        blog.validate()?;

        self.conn.execute(
            "INSERT INTO blogs (name, slug, icon, description, can_read, can_write)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                blog.name.as_str(),
                blog.slug.as_str(),
                blog.icon.as_str(),
                blog.description.as_str(),
                bool_to_int(blog.can_read),
                bool_to_int(blog.can_write),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        blog.id = Some(id);
        Ok(id)
    }

    fn update_blog(&self, blog: &Blog) -> RepoResult<()> {
        blog.validate()?;
        let id = blog
            .id
            .ok_or_else(|| RepoError::InvalidData("cannot update a blog without id".to_string()))?;

        let changed = self.conn.execute(
            "UPDATE blogs
             SET
                name = ?1,
                slug = ?2,
                icon = ?3,
                description = ?4,
                can_read = ?5,
                can_write = ?6
             WHERE id = ?7;",
            params![
                blog.name.as_str(),
                blog.slug.as_str(),
                blog.icon.as_str(),
                blog.description.as_str(),
                bool_to_int(blog.can_read),
                bool_to_int(blog.can_write),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::BlogNotFound(id));
        }

        Ok(())
    }

    fn get_blog(&self, id: BlogId) -> RepoResult<Option<Blog>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BLOG_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_blog_row(row)?));
        }

        Ok(None)
    }

    fn get_blog_by_slug(&self, slug: &str) -> RepoResult<Option<Blog>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BLOG_SELECT_SQL}
             WHERE slug = ?1
             ORDER BY id DESC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query(params![slug])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_blog_row(row)?));
        }

        Ok(None)
    }

    fn list_blogs(&self, query: &BlogListQuery) -> RepoResult<Vec<Blog>> {
        let mut sql = format!("{BLOG_SELECT_SQL} ORDER BY name ASC, id ASC");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut blogs = Vec::new();

        while let Some(row) = rows.next()? {
            blogs.push(parse_blog_row(row)?);
        }

        Ok(blogs)
    }

    fn delete_blog(&self, id: BlogId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM blogs WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::BlogNotFound(id));
        }

        Ok(())
    }

    fn grant_access(&self, access: &mut BlogUserAccess) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO blog_user_access (blog_id, user_id, is_moderator, can_read, can_write)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                access.blog_id,
                access.user_id.to_string(),
                bool_to_int(access.is_moderator),
                bool_to_int(access.can_read),
                bool_to_int(access.can_write),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        access.id = Some(id);
        Ok(id)
    }

    fn revoke_access(&self, blog_id: BlogId, user_id: UserId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM blog_user_access WHERE blog_id = ?1 AND user_id = ?2;",
            params![blog_id, user_id.to_string()],
        )?;
        Ok(removed)
    }

    fn list_access(&self, blog_id: BlogId) -> RepoResult<Vec<BlogUserAccess>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACCESS_SELECT_SQL} WHERE blog_id = ?1 ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query(params![blog_id])?;
        let mut grants = Vec::new();
        while let Some(row) = rows.next()? {
            grants.push(parse_access_row(row)?);
        }

        Ok(grants)
    }

    fn moderator_grant_exists(&self, blog_id: BlogId, user_id: UserId) -> RepoResult<bool> {
        self.grant_exists(blog_id, user_id, "is_moderator")
    }

    fn read_grant_exists(&self, blog_id: BlogId, user_id: UserId) -> RepoResult<bool> {
        self.grant_exists(blog_id, user_id, "can_read")
    }

    fn write_grant_exists(&self, blog_id: BlogId, user_id: UserId) -> RepoResult<bool> {
        self.grant_exists(blog_id, user_id, "can_write")
    }

    fn last_public_post(&self, blog_id: BlogId) -> RepoResult<Option<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL}
             WHERE blog_id = ?1
               AND status = ?2
             ORDER BY updated_at DESC, id DESC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query(params![blog_id, post_status_to_db(PostStatus::Public)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }

        Ok(None)
    }
}

impl SqliteBlogRepository<'_> {
    fn grant_exists(
        &self,
        blog_id: BlogId,
        user_id: UserId,
        flag_column: &'static str,
    ) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(
                    SELECT 1
                    FROM blog_user_access
                    WHERE blog_id = ?1
                      AND user_id = ?2
                      AND {flag_column} = 1
                );"
            ),
            params![blog_id, user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_blog_row(row: &Row<'_>) -> RepoResult<Blog> {
    Ok(Blog {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        slug: row.get("slug")?,
        icon: row.get("icon")?,
        description: row.get("description")?,
        can_read: parse_flag(row, "can_read", "blogs")?,
        can_write: parse_flag(row, "can_write", "blogs")?,
    })
}

fn parse_access_row(row: &Row<'_>) -> RepoResult<BlogUserAccess> {
    let user_text: String = row.get("user_id")?;
    let user_id = Uuid::parse_str(&user_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{user_text}` in blog_user_access.user_id"
        ))
    })?;

    Ok(BlogUserAccess {
        id: Some(row.get("id")?),
        blog_id: row.get("blog_id")?,
        user_id,
        is_moderator: parse_flag(row, "is_moderator", "blog_user_access")?,
        can_read: parse_flag(row, "can_read", "blog_user_access")?,
        can_write: parse_flag(row, "can_write", "blog_user_access")?,
    })
}

fn parse_flag(row: &Row<'_>, column: &'static str, table: &'static str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {table}.{column}"
        ))),
    }
}
