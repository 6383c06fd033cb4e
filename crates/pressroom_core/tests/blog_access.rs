use pressroom_core::db::open_db_in_memory;
use pressroom_core::{
    Blog, BlogRepository, BlogService, BlogServiceError, BlogUserAccess, NewBlogRequest, Post,
    PostRepository, PostStatus, RepoError, SqliteBlogRepository, SqlitePostRepository, Viewer,
    DEFAULT_BLOG_ICON,
};
use rusqlite::params;
use uuid::Uuid;

#[test]
fn create_blog_derives_slug_and_open_defaults() {
    let conn = open_db_in_memory().unwrap();
    let service = BlogService::new(SqliteBlogRepository::try_new(&conn).unwrap());

    let blog = service
        .create_blog(NewBlogRequest {
            name: "Team Blog".to_string(),
            slug: String::new(),
            description: "shared editorial space".to_string(),
        })
        .unwrap();

    assert_eq!(blog.slug, "team-blog");
    assert_eq!(blog.icon, DEFAULT_BLOG_ICON);
    assert!(blog.can_read);
    assert!(blog.can_write);
    assert_eq!(blog.absolute_url(), "/blogs/team-blog/");

    let found = service.get_blog_by_slug("team-blog").unwrap().unwrap();
    assert_eq!(found.id, blog.id);
    assert_eq!(found.description, "shared editorial space");
}

#[test]
fn create_blog_rejects_unsafe_slug() {
    let conn = open_db_in_memory().unwrap();
    let service = BlogService::new(SqliteBlogRepository::try_new(&conn).unwrap());

    let err = service
        .create_blog(NewBlogRequest {
            name: "Team Blog".to_string(),
            slug: "team blog!".to_string(),
            description: String::new(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        BlogServiceError::Repo(RepoError::BlogValidation(_))
    ));
}

#[test]
fn duplicate_grants_are_tolerated_and_revoked_together() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBlogRepository::try_new(&conn).unwrap();
    let service = BlogService::new(SqliteBlogRepository::try_new(&conn).unwrap());

    let blog = service
        .create_blog(NewBlogRequest {
            name: "Team Blog".to_string(),
            slug: String::new(),
            description: String::new(),
        })
        .unwrap();
    let blog_id = blog.id.unwrap();
    let moderator = Uuid::new_v4();

    service
        .grant_access(&mut BlogUserAccess::moderator(blog_id, moderator))
        .unwrap();
    service
        .grant_access(&mut BlogUserAccess::moderator(blog_id, moderator))
        .unwrap();

    let grants = service.list_access(blog_id).unwrap();
    assert_eq!(grants.len(), 2);
    assert!(repo.moderator_grant_exists(blog_id, moderator).unwrap());

    let removed = service.revoke_access(blog_id, moderator).unwrap();
    assert_eq!(removed, 2);
    assert!(!repo.moderator_grant_exists(blog_id, moderator).unwrap());
    assert!(service.list_access(blog_id).unwrap().is_empty());
}

#[test]
fn effective_policy_is_union_of_global_flags_and_grants() {
    let conn = open_db_in_memory().unwrap();
    let service = BlogService::new(SqliteBlogRepository::try_new(&conn).unwrap());

    let mut blog = service
        .create_blog(NewBlogRequest {
            name: "Members Only".to_string(),
            slug: String::new(),
            description: String::new(),
        })
        .unwrap();
    blog.can_read = false;
    blog.can_write = false;
    service.update_blog(&blog).unwrap();

    let member = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let mut grant = BlogUserAccess::new(blog.id.unwrap(), member);
    grant.can_read = true;
    service.grant_access(&mut grant).unwrap();

    assert!(service.can_user_read(&blog, &Viewer::User(member)).unwrap());
    assert!(!service.can_user_write(&blog, &Viewer::User(member)).unwrap());
    assert!(!service
        .can_user_read(&blog, &Viewer::User(stranger))
        .unwrap());
    assert!(!service.can_user_read(&blog, &Viewer::Anonymous).unwrap());

    blog.can_read = true;
    service.update_blog(&blog).unwrap();
    assert!(service.can_user_read(&blog, &Viewer::Anonymous).unwrap());
    assert!(service
        .can_user_read(&blog, &Viewer::User(stranger))
        .unwrap());
}

#[test]
fn get_last_post_returns_latest_public_post_or_none() {
    let mut conn = open_db_in_memory().unwrap();

    let blog_id = {
        let service = BlogService::new(SqliteBlogRepository::try_new(&conn).unwrap());
        let blog = service
            .create_blog(NewBlogRequest {
                name: "Team Blog".to_string(),
                slug: String::new(),
                description: String::new(),
            })
            .unwrap();
        blog.id.unwrap()
    };

    {
        let service = BlogService::new(SqliteBlogRepository::try_new(&conn).unwrap());
        let blog = service.get_blog(blog_id).unwrap().unwrap();
        assert!(service.get_last_post(&blog).unwrap().is_none());
    }

    let author = Uuid::new_v4();
    let mut ids = Vec::new();
    {
        let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();
        for (title, status) in [
            ("older public", PostStatus::Public),
            ("newer public", PostStatus::Public),
            ("fresh draft", PostStatus::Draft),
            ("fresh deleted", PostStatus::Deleted),
        ] {
            let mut post = Post::new(author, title, "body");
            post.blog_id = Some(blog_id);
            post.status = status;
            ids.push(repo.save_post(&mut post).unwrap());
        }

        // A personal public post must never count for the blog.
        let mut personal = Post::new(author, "personal", "body");
        personal.status = PostStatus::Public;
        repo.save_post(&mut personal).unwrap();
    }

    for (idx, id) in ids.iter().enumerate() {
        conn.execute(
            "UPDATE posts SET updated_at = ?1 WHERE id = ?2;",
            params![1000 * (idx as i64 + 1), id],
        )
        .unwrap();
    }

    let service = BlogService::new(SqliteBlogRepository::try_new(&conn).unwrap());
    let blog = service.get_blog(blog_id).unwrap().unwrap();
    let last = service.get_last_post(&blog).unwrap().unwrap();
    assert_eq!(last.id, Some(ids[1]));
    assert_eq!(last.title, "newer public");
}

#[test]
fn deleting_blog_cascades_grants_and_detaches_posts() {
    let mut conn = open_db_in_memory().unwrap();

    let blog_id = {
        let service = BlogService::new(SqliteBlogRepository::try_new(&conn).unwrap());
        let blog = service
            .create_blog(NewBlogRequest {
                name: "Short Lived".to_string(),
                slug: String::new(),
                description: String::new(),
            })
            .unwrap();
        let blog_id = blog.id.unwrap();
        service
            .grant_access(&mut BlogUserAccess::moderator(blog_id, Uuid::new_v4()))
            .unwrap();
        blog_id
    };
    let post_id = {
        let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();
        let mut post = Post::new(Uuid::new_v4(), "Orphaned Later", "body");
        post.blog_id = Some(blog_id);
        repo.save_post(&mut post).unwrap()
    };

    let service = BlogService::new(SqliteBlogRepository::try_new(&conn).unwrap());
    service.delete_blog(blog_id).unwrap();
    assert!(service.get_blog(blog_id).unwrap().is_none());
    assert!(service.list_access(blog_id).unwrap().is_empty());

    let repo = SqlitePostRepository::try_new(&mut conn).unwrap();
    let detached = repo.get_post(post_id).unwrap().unwrap();
    assert_eq!(detached.blog_id, None);
}

#[test]
fn update_of_missing_blog_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = BlogService::new(SqliteBlogRepository::try_new(&conn).unwrap());

    let mut ghost = Blog::new("Ghost", "ghost");
    ghost.id = Some(999);
    let err = service.update_blog(&ghost).unwrap_err();
    assert!(matches!(err, BlogServiceError::BlogNotFound(999)));
}
