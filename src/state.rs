use crate::cache::{GuestCache, TtlCache};
use crate::config::Config;
use crate::repository::{SqlCommentRepository, SqlGuestRepository};
use crate::service::{CommentService, GuestService};
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub db_pool: SqlitePool,
    pub guests: Arc<GuestService>,
    pub comments: Arc<CommentService>,
}

impl AppState {
    /// Wire the SQLite repositories, caches and services together.
    ///
    /// Must be called inside a Tokio runtime so the caches can start their sweep tasks.
    pub fn new(config: Config, db_pool: SqlitePool) -> Self {
        let guest_cache = GuestCache::with_ttl(
            Arc::new(SqlGuestRepository::new(db_pool.clone())),
            config.guest_cache_ttl,
            config.cache_sweep_interval,
        );
        let guests = Arc::new(GuestService::new(guest_cache));

        let comments = Arc::new(CommentService::new(
            Arc::new(SqlCommentRepository::new(db_pool.clone())),
            guests.clone(),
            TtlCache::with_sweep_interval(config.comment_cache_ttl, config.cache_sweep_interval),
        ));

        Self {
            config,
            db_pool,
            guests,
            comments,
        }
    }
}
