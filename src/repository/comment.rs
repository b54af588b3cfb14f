use crate::db::comment as comment_db;
use crate::models::{Comment, PageCursor, PaginatedComments};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Comment data access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Stores a new comment and assigns its id and creation time.
    async fn create(&self, comment: &mut Comment) -> Result<(), sqlx::Error>;

    /// Stores a new comment unless its guest already has `limit` comments.
    /// Returns whether the comment was stored.
    async fn create_within_limit(&self, comment: &mut Comment, limit: i64) -> Result<bool, sqlx::Error>;

    /// Lists one guest's comments, newest first.
    async fn get_by_guest_id(&self, guest_id: i64) -> Result<Vec<Comment>, sqlx::Error>;

    /// Lists every comment, newest first.
    async fn get_all(&self) -> Result<Vec<Comment>, sqlx::Error>;

    /// Fetches a page of comments joined with their authors' names.
    async fn get_page_with_guests(
        &self,
        limit: i64,
        cursor: Option<PageCursor>,
    ) -> Result<PaginatedComments, sqlx::Error>;
}

/// SQLite-backed comment repository.
#[derive(Clone)]
pub struct SqlCommentRepository {
    pool: SqlitePool,
}

impl SqlCommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqlCommentRepository {
    async fn create(&self, comment: &mut Comment) -> Result<(), sqlx::Error> {
        comment_db::create_comment(&self.pool, comment).await
    }

    async fn create_within_limit(&self, comment: &mut Comment, limit: i64) -> Result<bool, sqlx::Error> {
        comment_db::create_comment_within_limit(&self.pool, comment, limit).await
    }

    async fn get_by_guest_id(&self, guest_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
        comment_db::get_comments_by_guest_id(&self.pool, guest_id).await
    }

    async fn get_all(&self) -> Result<Vec<Comment>, sqlx::Error> {
        comment_db::get_all_comments(&self.pool).await
    }

    async fn get_page_with_guests(
        &self,
        limit: i64,
        cursor: Option<PageCursor>,
    ) -> Result<PaginatedComments, sqlx::Error> {
        comment_db::get_comments_page(&self.pool, limit, cursor).await
    }
}
