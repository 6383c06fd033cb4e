//! Post repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide post persistence with the two-phase slug-assigning first save.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save_post` runs both phases of a first save in one transaction.
//! - A non-empty slug is never recomputed.
//! - Lists and by-slug lookups order `updated_at DESC, id DESC`.

use crate::db::DbError;
use crate::model::blog::{BlogId, BlogValidationError};
use crate::model::now_epoch_ms;
use crate::model::post::{Post, PostId, PostStatus, PostValidationError};
use crate::model::viewer::UserId;
use crate::repo::{bool_to_int, ensure_connection_ready, TableRequirement};
use crate::slug::compose_post_slug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub(crate) const POST_SELECT_SQL: &str = "SELECT
    id,
    title,
    slug,
    author_id,
    creator_ip,
    tease,
    body,
    status,
    allow_comments,
    publish,
    created_at,
    updated_at,
    tags,
    blog_id,
    comments_count,
    last_comment_datetime,
    rating,
    rating_score
FROM posts";

const POST_COLUMNS: &[&str] = &[
    "id",
    "title",
    "slug",
    "author_id",
    "creator_ip",
    "tease",
    "body",
    "status",
    "allow_comments",
    "publish",
    "created_at",
    "updated_at",
    "tags",
    "blog_id",
    "comments_count",
    "last_comment_datetime",
    "rating",
    "rating_score",
];

const ACCESS_COLUMNS: &[&str] = &[
    "id",
    "blog_id",
    "user_id",
    "is_moderator",
    "can_read",
    "can_write",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by post and blog persistence.
#[derive(Debug)]
pub enum RepoError {
    PostValidation(PostValidationError),
    BlogValidation(BlogValidationError),
    Db(DbError),
    PostNotFound(PostId),
    BlogNotFound(BlogId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PostValidation(err) => write!(f, "{err}"),
            Self::BlogValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::PostNotFound(id) => write!(f, "post not found: {id}"),
            Self::BlogNotFound(id) => write!(f, "blog not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PostValidation(err) => Some(err),
            Self::BlogValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PostValidationError> for RepoError {
    fn from(value: PostValidationError) -> Self {
        Self::PostValidation(value)
    }
}

impl From<BlogValidationError> for RepoError {
    fn from(value: BlogValidationError) -> Self {
        Self::BlogValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing posts.
#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    pub blog: Option<BlogId>,
    pub author: Option<UserId>,
    pub status: Option<PostStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for post persistence.
pub trait PostRepository {
    /// Persists the post, assigning `id` and `slug` on first save.
    fn save_post(&mut self, post: &mut Post) -> RepoResult<PostId>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    /// Most recent match wins; slugs are not schema-unique.
    fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<Post>>;
    fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<Post>>;
    fn delete_post(&mut self, id: PostId) -> RepoResult<()>;
    /// Existence check for a moderator-flagged access row.
    fn moderator_grant_exists(&self, blog_id: BlogId, user_id: UserId) -> RepoResult<bool>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                TableRequirement {
                    table: "posts",
                    columns: POST_COLUMNS,
                },
                TableRequirement {
                    table: "blog_user_access",
                    columns: ACCESS_COLUMNS,
                },
            ],
        )?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn save_post(&mut self, post: &mut Post) -> RepoResult<PostId> {
        post.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let id = match post.id {
            None => {
                tx.execute(
                    "INSERT INTO posts (
                        title,
                        slug,
                        author_id,
                        creator_ip,
                        tease,
                        body,
                        status,
                        allow_comments,
                        publish,
                        created_at,
                        updated_at,
                        tags,
                        blog_id,
                        comments_count,
                        last_comment_datetime,
                        rating,
                        rating_score
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);",
                    params![
                        post.title.as_str(),
                        post.slug.as_str(),
                        post.author.to_string(),
                        post.creator_ip.as_deref(),
                        post.tease.as_str(),
                        post.body.as_str(),
                        post_status_to_db(post.status),
                        bool_to_int(post.allow_comments),
                        post.publish,
                        post.created_at,
                        post.updated_at,
                        post.tags.as_str(),
                        post.blog_id,
                        post.comments_count,
                        post.last_comment_datetime,
                        post.rating,
                        post.rating_score,
                    ],
                )?;

                let id = tx.last_insert_rowid();
                post.id = Some(id);

                // Second phase: the slug needs the id the insert just
                // produced.
                if post.slug.is_empty() {
                    post.slug = compose_post_slug(id, &post.title);
                    tx.execute(
                        "UPDATE posts SET slug = ?1 WHERE id = ?2;",
                        params![post.slug.as_str(), id],
                    )?;
                }

                id
            }
            Some(id) => {
                if post.slug.is_empty() {
                    post.slug = compose_post_slug(id, &post.title);
                }
                post.updated_at = now_epoch_ms();

                let changed = tx.execute(
                    "UPDATE posts
                     SET
                        title = ?1,
                        slug = ?2,
                        author_id = ?3,
                        creator_ip = ?4,
                        tease = ?5,
                        body = ?6,
                        status = ?7,
                        allow_comments = ?8,
                        publish = ?9,
                        created_at = ?10,
                        updated_at = ?11,
                        tags = ?12,
                        blog_id = ?13,
                        comments_count = ?14,
                        last_comment_datetime = ?15,
                        rating = ?16,
                        rating_score = ?17
                     WHERE id = ?18;",
                    params![
                        post.title.as_str(),
                        post.slug.as_str(),
                        post.author.to_string(),
                        post.creator_ip.as_deref(),
                        post.tease.as_str(),
                        post.body.as_str(),
                        post_status_to_db(post.status),
                        bool_to_int(post.allow_comments),
                        post.publish,
                        post.created_at,
                        post.updated_at,
                        post.tags.as_str(),
                        post.blog_id,
                        post.comments_count,
                        post.last_comment_datetime,
                        post.rating,
                        post.rating_score,
                        id,
                    ],
                )?;

                if changed == 0 {
                    return Err(RepoError::PostNotFound(id));
                }

                id
            }
        };

        tx.commit()?;
        Ok(id)
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }

        Ok(None)
    }

    fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL}
             WHERE slug = ?1
             ORDER BY updated_at DESC, id DESC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query(params![slug])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }

        Ok(None)
    }

    fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<Post>> {
        let mut sql = format!("{POST_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(blog_id) = query.blog {
            sql.push_str(" AND blog_id = ?");
            bind_values.push(Value::Integer(blog_id));
        }

        if let Some(author) = query.author {
            sql.push_str(" AND author_id = ?");
            bind_values.push(Value::Text(author.to_string()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(post_status_to_db(status).to_string()));
        }

        sql.push_str(" ORDER BY updated_at DESC, id DESC");

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
        let mut posts = Vec::new();

        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }

        Ok(posts)
    }

    fn delete_post(&mut self, id: PostId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::PostNotFound(id));
        }

        Ok(())
    }

    fn moderator_grant_exists(&self, blog_id: BlogId, user_id: UserId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM blog_user_access
                WHERE blog_id = ?1
                  AND user_id = ?2
                  AND is_moderator = 1
            );",
            params![blog_id, user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

pub(crate) fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let author_text: String = row.get("author_id")?;
    let author = Uuid::parse_str(&author_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{author_text}` in posts.author_id"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_post_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid post status `{status_text}` in posts.status"))
    })?;

    let allow_comments = match row.get::<_, i64>("allow_comments")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid allow_comments value `{other}` in posts.allow_comments"
            )));
        }
    };

    Ok(Post {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        slug: row.get("slug")?,
        author,
        creator_ip: row.get("creator_ip")?,
        tease: row.get("tease")?,
        body: row.get("body")?,
        status,
        allow_comments,
        publish: row.get("publish")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        tags: row.get("tags")?,
        blog_id: row.get("blog_id")?,
        comments_count: row.get("comments_count")?,
        last_comment_datetime: row.get("last_comment_datetime")?,
        rating: row.get("rating")?,
        rating_score: row.get("rating_score")?,
    })
}

pub(crate) fn post_status_to_db(status: PostStatus) -> &'static str {
    match status {
        PostStatus::Draft => "draft",
        PostStatus::Public => "public",
        PostStatus::Deleted => "deleted",
    }
}

fn parse_post_status(value: &str) -> Option<PostStatus> {
    match value {
        "draft" => Some(PostStatus::Draft),
        "public" => Some(PostStatus::Public),
        "deleted" => Some(PostStatus::Deleted),
        _ => None,
    }
}
