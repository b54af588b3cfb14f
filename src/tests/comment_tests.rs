use super::stored_guest;
use crate::{
    cache::{GuestCache, TtlCache},
    models::Comment,
    repository::{MockCommentRepository, MockGuestRepository},
    service::{CommentService, GuestService, NewComment},
};
use std::sync::Arc;
use std::time::Duration;

fn known_guests() -> MockGuestRepository {
    let mut repo = MockGuestRepository::new();
    repo.expect_get_by_name().returning(|name| match name {
        "Jane Doe" => Ok(Some(stored_guest(1, name))),
        "John Smith" => Ok(Some(stored_guest(2, name))),
        _ => Ok(None),
    });
    repo
}

fn comment(id: i64, guest_id: i64, content: &str) -> Comment {
    Comment {
        id,
        guest_id,
        content: content.to_string(),
        created_at: None,
    }
}

fn comment_service(guests: MockGuestRepository, comments: MockCommentRepository) -> CommentService {
    let guest_service = Arc::new(GuestService::new(GuestCache::new(Arc::new(guests))));
    CommentService::new(
        Arc::new(comments),
        guest_service,
        TtlCache::new(Duration::from_secs(60)),
    )
}

#[tokio::test]
async fn test_unknown_guest_cannot_comment() {
    let mut comments = MockCommentRepository::new();
    comments.expect_create().times(0);
    comments.expect_get_by_guest_id().times(0);

    let service = comment_service(known_guests(), comments);

    assert!(service.create_comment("Stranger", "Hello").await.unwrap().is_none());
    assert!(service.get_comments_by_guest("Stranger").await.unwrap().is_none());
}

#[tokio::test]
async fn test_guest_comments_are_cached_per_guest() {
    let mut comments = MockCommentRepository::new();
    comments
        .expect_get_by_guest_id()
        .withf(|guest_id| *guest_id == 1)
        .times(1)
        .returning(|_| Ok(vec![comment(10, 1, "Congratulations!")]));
    comments
        .expect_get_by_guest_id()
        .withf(|guest_id| *guest_id == 2)
        .times(1)
        .returning(|_| Ok(vec![]));

    let service = comment_service(known_guests(), comments);

    for _ in 0..2 {
        let jane = service.get_comments_by_guest("Jane Doe").await.unwrap().unwrap();
        assert_eq!(jane.len(), 1);
        let john = service.get_comments_by_guest("John Smith").await.unwrap().unwrap();
        assert!(john.is_empty());
    }
}

#[tokio::test]
async fn test_new_comment_clears_every_list() {
    let mut comments = MockCommentRepository::new();
    comments
        .expect_get_by_guest_id()
        .times(4)
        .returning(|guest_id| Ok(vec![comment(10, guest_id, "Hi")]));
    comments
        .expect_get_all()
        .times(2)
        .returning(|| Ok(vec![comment(10, 1, "Hi")]));
    comments.expect_create().times(1).returning(|comment| {
        comment.id = 11;
        Ok(())
    });

    let service = comment_service(known_guests(), comments);

    // Prime and hit the cache
    for _ in 0..2 {
        service.get_comments_by_guest("Jane Doe").await.unwrap();
        service.get_comments_by_guest("John Smith").await.unwrap();
        service.get_all_comments().await.unwrap();
    }

    let created = service.create_comment("Jane Doe", "See you there").await.unwrap().unwrap();
    assert_eq!(created.id, 11);
    assert_eq!(created.guest_id, 1);
    assert_eq!(created.content, "See you there");

    // John's list is dropped too, not only Jane's
    service.get_comments_by_guest("Jane Doe").await.unwrap();
    service.get_comments_by_guest("John Smith").await.unwrap();
    service.get_all_comments().await.unwrap();
}

#[tokio::test]
async fn test_failed_comment_keeps_cached_lists() {
    let mut comments = MockCommentRepository::new();
    comments
        .expect_get_all()
        .times(1)
        .returning(|| Ok(vec![]));
    comments
        .expect_create()
        .times(1)
        .returning(|_| Err(sqlx::Error::PoolTimedOut));

    let service = comment_service(known_guests(), comments);

    service.get_all_comments().await.unwrap();
    assert!(matches!(
        service.create_comment("Jane Doe", "Hello").await,
        Err(sqlx::Error::PoolTimedOut)
    ));
    service.get_all_comments().await.unwrap();
}

#[tokio::test]
async fn test_read_errors_pass_through_uncached() {
    let mut comments = MockCommentRepository::new();
    let mut by_guest_calls = 0;
    comments
        .expect_get_by_guest_id()
        .times(2)
        .returning(move |guest_id| {
            by_guest_calls += 1;
            if by_guest_calls == 1 {
                Err(sqlx::Error::PoolTimedOut)
            } else {
                Ok(vec![comment(10, guest_id, "Hi")])
            }
        });
    let mut all_calls = 0;
    comments.expect_get_all().times(2).returning(move || {
        all_calls += 1;
        if all_calls == 1 {
            Err(sqlx::Error::RowNotFound)
        } else {
            Ok(vec![comment(10, 1, "Hi")])
        }
    });

    let service = comment_service(known_guests(), comments);

    assert!(matches!(
        service.get_comments_by_guest("Jane Doe").await,
        Err(sqlx::Error::PoolTimedOut)
    ));
    assert!(matches!(service.get_all_comments().await, Err(sqlx::Error::RowNotFound)));

    // The retry reaches the repository, then later reads are cached
    for _ in 0..2 {
        assert_eq!(service.get_comments_by_guest("Jane Doe").await.unwrap().unwrap().len(), 1);
        assert_eq!(service.get_all_comments().await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_guest_lookup_errors_pass_through() {
    let mut guests = MockGuestRepository::new();
    guests
        .expect_get_by_name()
        .times(2)
        .returning(|_| Err(sqlx::Error::PoolClosed));

    let mut comments = MockCommentRepository::new();
    comments.expect_create().times(0);
    comments.expect_get_by_guest_id().times(0);

    let service = comment_service(guests, comments);

    assert!(matches!(
        service.create_comment("Jane Doe", "Hello").await,
        Err(sqlx::Error::PoolClosed)
    ));
    assert!(matches!(
        service.get_comments_by_guest("Jane Doe").await,
        Err(sqlx::Error::PoolClosed)
    ));
}

#[tokio::test]
async fn test_comment_limit_outcomes() {
    let mut comments = MockCommentRepository::new();
    comments
        .expect_get_all()
        .times(2)
        .returning(|| Ok(vec![]));
    let mut stored = 0;
    comments
        .expect_create_within_limit()
        .withf(|comment: &Comment, limit: &i64| comment.guest_id == 1 && *limit == 2)
        .times(2)
        .returning(move |comment, _| {
            stored += 1;
            if stored == 1 {
                comment.id = 12;
                Ok(true)
            } else {
                Ok(false)
            }
        });

    let service = comment_service(known_guests(), comments);

    assert!(matches!(
        service.create_comment_within_limit("Stranger", "Hello", 2).await,
        Ok(NewComment::UnknownGuest)
    ));

    service.get_all_comments().await.unwrap();
    match service.create_comment_within_limit("Jane Doe", "Hello", 2).await {
        Ok(NewComment::Created(comment)) => assert_eq!(comment.id, 12),
        other => panic!("expected a new comment, got {:?}", other),
    }

    // Created clears the cache, a refused comment leaves it alone
    service.get_all_comments().await.unwrap();
    assert!(matches!(
        service.create_comment_within_limit("Jane Doe", "Again", 2).await,
        Ok(NewComment::LimitReached)
    ));
    service.get_all_comments().await.unwrap();
}
