use crate::db::guest as guest_db;
use crate::models::Guest;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

/// Guest data access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuestRepository: Send + Sync {
    /// Finds a guest by exact name.
    async fn get_by_name(&self, name: &str) -> Result<Option<Guest>, sqlx::Error>;

    /// Lists every guest.
    async fn get_all(&self) -> Result<Vec<Guest>, sqlx::Error>;

    /// Stores a new guest and assigns its id.
    async fn create(&self, guest: &mut Guest) -> Result<(), sqlx::Error>;

    /// Updates an existing guest, matched by id.
    async fn update(&self, guest: &mut Guest) -> Result<(), sqlx::Error>;

    /// Stores several guests atomically.
    async fn bulk_create(&self, guests: &mut [Guest]) -> Result<(), sqlx::Error>;

    /// Updates several guests atomically.
    async fn bulk_update(&self, guests: &mut [Guest]) -> Result<(), sqlx::Error>;

    /// Records that a guest opened their invitation.
    async fn mark_invitation_opened(&self, name: &str) -> Result<(), sqlx::Error>;
}

/// SQLite-backed guest repository.
#[derive(Clone)]
pub struct SqlGuestRepository {
    pool: SqlitePool,
}

impl SqlGuestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestRepository for SqlGuestRepository {
    async fn get_by_name(&self, name: &str) -> Result<Option<Guest>, sqlx::Error> {
        guest_db::get_guest_by_name(&self.pool, name).await
    }

    async fn get_all(&self) -> Result<Vec<Guest>, sqlx::Error> {
        guest_db::get_all_guests(&self.pool).await
    }

    async fn create(&self, guest: &mut Guest) -> Result<(), sqlx::Error> {
        guest_db::create_guest(&self.pool, guest).await
    }

    async fn update(&self, guest: &mut Guest) -> Result<(), sqlx::Error> {
        guest_db::update_guest(&self.pool, guest).await
    }

    async fn bulk_create(&self, guests: &mut [Guest]) -> Result<(), sqlx::Error> {
        guest_db::bulk_create_guests(&self.pool, guests).await
    }

    async fn bulk_update(&self, guests: &mut [Guest]) -> Result<(), sqlx::Error> {
        guest_db::bulk_update_guests(&self.pool, guests).await
    }

    async fn mark_invitation_opened(&self, name: &str) -> Result<(), sqlx::Error> {
        let changed = guest_db::mark_invitation_opened(&self.pool, name).await?;
        if !changed {
            debug!("Invitation for {} was already opened or guest is unknown", name);
        }
        Ok(())
    }
}
