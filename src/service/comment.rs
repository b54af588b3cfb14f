use crate::cache::{CacheKey, TtlCache};
use crate::models::{Comment, PageCursor, PaginatedComments};
use crate::repository::CommentRepository;
use crate::service::GuestService;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default TTL for cached comment lists
pub const COMMENT_CACHE_TTL: Duration = Duration::from_secs(2 * 60);

/// Result of adding a comment under a per-guest limit
#[derive(Debug)]
pub enum NewComment {
    Created(Comment),
    UnknownGuest,
    LimitReached,
}

/// Comment business logic with cached comment lists.
///
/// Any new comment clears the whole comment cache rather than working out
/// which lists it belongs to.
pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
    guest_service: Arc<GuestService>,
    comment_cache: TtlCache<Vec<Comment>>,
}

impl CommentService {
    pub fn new(
        comment_repo: Arc<dyn CommentRepository>,
        guest_service: Arc<GuestService>,
        comment_cache: TtlCache<Vec<Comment>>,
    ) -> Self {
        Self {
            comment_repo,
            guest_service,
            comment_cache,
        }
    }

    /// Add a comment from `guest_name`. Returns `None` if the guest is unknown.
    pub async fn create_comment(&self, guest_name: &str, content: &str) -> Result<Option<Comment>, sqlx::Error> {
        let Some(guest) = self.guest_service.get_guest_by_name(guest_name).await? else {
            return Ok(None);
        };

        let mut comment = Comment {
            id: 0,
            guest_id: guest.id,
            content: content.to_string(),
            created_at: None,
        };
        self.comment_repo.create(&mut comment).await?;

        self.comment_cache.clear();
        info!("Created comment {} for guest {}", comment.id, guest_name);

        Ok(Some(comment))
    }

    /// Add a comment from `guest_name` unless they already wrote `limit` comments.
    /// The limit holds under concurrent requests.
    pub async fn create_comment_within_limit(
        &self,
        guest_name: &str,
        content: &str,
        limit: usize,
    ) -> Result<NewComment, sqlx::Error> {
        let Some(guest) = self.guest_service.get_guest_by_name(guest_name).await? else {
            return Ok(NewComment::UnknownGuest);
        };

        let mut comment = Comment {
            id: 0,
            guest_id: guest.id,
            content: content.to_string(),
            created_at: None,
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        if !self.comment_repo.create_within_limit(&mut comment, limit).await? {
            info!("Guest {} has reached the comment limit ({})", guest_name, limit);
            return Ok(NewComment::LimitReached);
        }

        self.comment_cache.clear();
        info!("Created comment {} for guest {}", comment.id, guest_name);

        Ok(NewComment::Created(comment))
    }

    /// Comments written by `guest_name`, newest first. Returns `None` if the guest is unknown.
    pub async fn get_comments_by_guest(&self, guest_name: &str) -> Result<Option<Vec<Comment>>, sqlx::Error> {
        let Some(guest) = self.guest_service.get_guest_by_name(guest_name).await? else {
            return Ok(None);
        };

        let key = CacheKey::guest_comments(guest_name).to_string();
        if let Some(comments) = self.comment_cache.get(&key) {
            debug!("Cache hit for key: {}", key);
            return Ok(Some(comments));
        }

        debug!("Cache miss for key: {}", key);
        let comments = self.comment_repo.get_by_guest_id(guest.id).await?;
        self.comment_cache.set(key, comments.clone());

        Ok(Some(comments))
    }

    /// Every comment, newest first
    pub async fn get_all_comments(&self) -> Result<Vec<Comment>, sqlx::Error> {
        let key = CacheKey::AllComments.to_string();
        if let Some(comments) = self.comment_cache.get(&key) {
            debug!("Cache hit for key: {}", key);
            return Ok(comments);
        }

        debug!("Cache miss for key: {}", key);
        let comments = self.comment_repo.get_all().await?;
        self.comment_cache.set(key, comments.clone());

        Ok(comments)
    }

    /// One page of comments with author names. Not cached.
    pub async fn get_comments_page(
        &self,
        limit: i64,
        cursor: Option<PageCursor>,
    ) -> Result<PaginatedComments, sqlx::Error> {
        self.comment_repo.get_page_with_guests(limit, cursor).await
    }
}
