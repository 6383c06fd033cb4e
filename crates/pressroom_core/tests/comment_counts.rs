use pressroom_core::db::open_db_in_memory;
use pressroom_core::{
    Capabilities, CommentNotice, CommentStatus, Component, DraftPostRequest, FeedNotifier, Post,
    PostService, SqlitePostRepository,
};
use std::cell::Cell;
use std::rc::Rc;
use uuid::Uuid;

struct RecordingFeed {
    saves: Rc<Cell<usize>>,
}

impl FeedNotifier for RecordingFeed {
    fn post_saved(&self, _post: &Post) {
        self.saves.set(self.saves.get() + 1);
    }
}

fn comments_service<'conn>(
    conn: &'conn mut rusqlite::Connection,
    saves: &Rc<Cell<usize>>,
) -> PostService<SqlitePostRepository<'conn>> {
    let repo = SqlitePostRepository::try_new(conn).unwrap();
    PostService::new(repo, Capabilities::none().with(Component::Comments)).with_feed_notifier(
        Box::new(RecordingFeed {
            saves: Rc::clone(saves),
        }),
    )
}

fn draft_request(author: Uuid) -> DraftPostRequest {
    DraftPostRequest {
        author,
        title: "Commented".to_string(),
        body: "body".to_string(),
        tease: String::new(),
        tags: String::new(),
        blog_id: None,
        creator_ip: None,
    }
}

#[test]
fn public_comment_increments_count_and_persists() {
    let mut conn = open_db_in_memory().unwrap();
    let saves = Rc::new(Cell::new(0));
    let mut service = comments_service(&mut conn, &saves);

    let mut post = service.create_draft(draft_request(Uuid::new_v4())).unwrap();
    assert_eq!(saves.get(), 1);

    let notice = CommentNotice {
        comment_id: 1,
        created_at: 5_000,
    };
    service
        .comment_status_changed(&mut post, &notice, CommentStatus::Public)
        .unwrap();

    assert_eq!(post.comments_count, 1);
    assert_eq!(post.last_comment_datetime, 5_000);

    let loaded = service.get_post(post.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.comments_count, 1);
    assert_eq!(loaded.last_comment_datetime, 5_000);

    // Bookkeeping saves never regenerate feeds.
    assert_eq!(saves.get(), 1);
}

#[test]
fn unapproval_and_deletion_each_decrement_by_one() {
    let mut conn = open_db_in_memory().unwrap();
    let saves = Rc::new(Cell::new(0));
    let mut service = comments_service(&mut conn, &saves);

    let mut post = service.create_draft(draft_request(Uuid::new_v4())).unwrap();

    for comment_id in 1..=2 {
        let notice = CommentNotice {
            comment_id,
            created_at: 1_000 * comment_id,
        };
        service
            .comment_status_changed(&mut post, &notice, CommentStatus::Public)
            .unwrap();
    }
    assert_eq!(post.comments_count, 2);

    let first = CommentNotice {
        comment_id: 1,
        created_at: 1_000,
    };
    service
        .comment_status_changed(&mut post, &first, CommentStatus::Unapproved)
        .unwrap();
    assert_eq!(post.comments_count, 1);

    let second = CommentNotice {
        comment_id: 2,
        created_at: 2_000,
    };
    service
        .comment_status_changed(&mut post, &second, CommentStatus::Deleted)
        .unwrap();
    assert_eq!(post.comments_count, 0);

    let loaded = service.get_post(post.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.comments_count, 0);
    assert_eq!(saves.get(), 1);
}

#[test]
fn hook_is_a_noop_without_the_comments_component() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqlitePostRepository::try_new(&mut conn).unwrap();
    let saves = Rc::new(Cell::new(0));
    let mut service =
        PostService::new(repo, Capabilities::none()).with_feed_notifier(Box::new(RecordingFeed {
            saves: Rc::clone(&saves),
        }));

    let mut post = service.create_draft(draft_request(Uuid::new_v4())).unwrap();
    let baseline_updated_at = post.updated_at;
    assert_eq!(saves.get(), 1);

    let notice = CommentNotice {
        comment_id: 1,
        created_at: 5_000,
    };
    service
        .comment_status_changed(&mut post, &notice, CommentStatus::Public)
        .unwrap();

    assert_eq!(post.comments_count, 0);
    let loaded = service.get_post(post.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.comments_count, 0);
    assert_eq!(loaded.updated_at, baseline_updated_at);
    assert_eq!(saves.get(), 1);
}
