//! Read-through, write-invalidate cache in front of a guest repository

use super::keys::CacheKey;
use super::ttl::TtlCache;
use crate::models::Guest;
use crate::repository::GuestRepository;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default TTL for guest entries
pub const GUEST_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// What a guest cache key can hold
#[derive(Debug, Clone)]
enum CachedGuests {
    /// Result of a lookup by name; `None` records that the guest does not exist
    One(Option<Guest>),
    All(Vec<Guest>),
}

/// Caches guest lookups and the full guest list.
///
/// Mutations go straight to the repository and then drop the affected keys;
/// cached guests are never patched in place. Repository errors are returned
/// as-is and leave the cache untouched.
pub struct GuestCache {
    cache: TtlCache<CachedGuests>,
    repository: Arc<dyn GuestRepository>,
}

impl GuestCache {
    /// Create a guest cache with the default five minute TTL
    pub fn new(repository: Arc<dyn GuestRepository>) -> Self {
        Self::with_cache(repository, TtlCache::new(GUEST_CACHE_TTL))
    }

    pub fn with_ttl(repository: Arc<dyn GuestRepository>, ttl: Duration, sweep_interval: Duration) -> Self {
        Self::with_cache(repository, TtlCache::with_sweep_interval(ttl, sweep_interval))
    }

    fn with_cache(repository: Arc<dyn GuestRepository>, cache: TtlCache<CachedGuests>) -> Self {
        Self { cache, repository }
    }

    /// Get a guest by name, caching "not found" as well
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Guest>, sqlx::Error> {
        let key = CacheKey::guest(name).to_string();
        if let Some(CachedGuests::One(guest)) = self.cache.get(&key) {
            debug!("Cache hit for key: {}", key);
            return Ok(guest);
        }

        debug!("Cache miss for key: {}", key);
        let guest = self.repository.get_by_name(name).await?;
        self.cache.set(key, CachedGuests::One(guest.clone()));

        Ok(guest)
    }

    /// Get every guest
    pub async fn get_all(&self) -> Result<Vec<Guest>, sqlx::Error> {
        let key = CacheKey::AllGuests.to_string();
        if let Some(CachedGuests::All(guests)) = self.cache.get(&key) {
            debug!("Cache hit for key: {}", key);
            return Ok(guests);
        }

        debug!("Cache miss for key: {}", key);
        let guests = self.repository.get_all().await?;
        self.cache.set(key, CachedGuests::All(guests.clone()));

        Ok(guests)
    }

    /// Create a guest and drop the keys it affects
    pub async fn create(&self, guest: &mut Guest) -> Result<(), sqlx::Error> {
        self.repository.create(guest).await?;
        self.invalidate_guest(&guest.name);
        Ok(())
    }

    /// Update a guest and drop the keys it affects
    pub async fn update(&self, guest: &mut Guest) -> Result<(), sqlx::Error> {
        self.repository.update(guest).await?;
        self.invalidate_guest(&guest.name);
        Ok(())
    }

    /// Create many guests and clear the whole cache
    pub async fn bulk_create(&self, guests: &mut [Guest]) -> Result<(), sqlx::Error> {
        self.repository.bulk_create(guests).await?;
        self.cache.clear();
        debug!("Cleared guest cache after bulk create of {} guests", guests.len());
        Ok(())
    }

    /// Update many guests and clear the whole cache
    pub async fn bulk_update(&self, guests: &mut [Guest]) -> Result<(), sqlx::Error> {
        self.repository.bulk_update(guests).await?;
        self.cache.clear();
        debug!("Cleared guest cache after bulk update of {} guests", guests.len());
        Ok(())
    }

    /// Record an invitation opening and drop the keys it affects
    pub async fn mark_invitation_opened(&self, name: &str) -> Result<(), sqlx::Error> {
        self.repository.mark_invitation_opened(name).await?;
        self.invalidate_guest(name);
        Ok(())
    }

    /// Number of cached entries, including ones not yet evicted
    pub fn size(&self) -> usize {
        self.cache.size()
    }

    fn invalidate_guest(&self, name: &str) {
        let guest_key = CacheKey::guest(name).to_string();
        self.cache.delete(&guest_key);
        self.cache.delete(&CacheKey::AllGuests.to_string());
        debug!("Invalidated cache keys: {}, {}", guest_key, CacheKey::AllGuests);
    }
}
