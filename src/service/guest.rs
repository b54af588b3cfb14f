use crate::cache::GuestCache;
use crate::models::Guest;
use tracing::info;

/// Guest business logic; every read and write goes through the guest cache.
pub struct GuestService {
    guest_cache: GuestCache,
}

impl GuestService {
    pub fn new(guest_cache: GuestCache) -> Self {
        Self { guest_cache }
    }

    pub async fn get_guest_by_name(&self, name: &str) -> Result<Option<Guest>, sqlx::Error> {
        self.guest_cache.get_by_name(name).await
    }

    pub async fn get_all_guests(&self) -> Result<Vec<Guest>, sqlx::Error> {
        self.guest_cache.get_all().await
    }

    pub async fn create_guest(&self, guest: &mut Guest) -> Result<(), sqlx::Error> {
        self.guest_cache.create(guest).await
    }

    pub async fn update_guest(&self, guest: &mut Guest) -> Result<(), sqlx::Error> {
        self.guest_cache.update(guest).await
    }

    pub async fn bulk_create_guests(&self, guests: &mut [Guest]) -> Result<(), sqlx::Error> {
        self.guest_cache.bulk_create(guests).await
    }

    pub async fn bulk_update_guests(&self, guests: &mut [Guest]) -> Result<(), sqlx::Error> {
        self.guest_cache.bulk_update(guests).await
    }

    pub async fn mark_invitation_opened(&self, name: &str) -> Result<(), sqlx::Error> {
        self.guest_cache.mark_invitation_opened(name).await
    }

    /// Resolve a guest who is allowed in; `None` when the name is not on the list.
    pub async fn validate_guest_access(&self, name: &str) -> Result<Option<Guest>, sqlx::Error> {
        self.get_guest_by_name(name).await
    }

    /// Set a guest's attendance answer. Returns `None` for an unknown guest.
    pub async fn record_rsvp(&self, name: &str, attending: bool) -> Result<Option<Guest>, sqlx::Error> {
        let Some(mut guest) = self.get_guest_by_name(name).await? else {
            return Ok(None);
        };

        guest.attending = Some(attending);
        self.update_guest(&mut guest).await?;
        info!("Recorded RSVP for {}: attending = {}", name, attending);

        Ok(Some(guest))
    }
}
