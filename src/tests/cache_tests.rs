use super::stored_guest;
use crate::{
    cache::{GuestCache, TtlCache},
    repository::MockGuestRepository,
};
use std::sync::Arc;
use std::time::Duration;

fn guest_cache(repo: MockGuestRepository) -> GuestCache {
    GuestCache::new(Arc::new(repo))
}

#[tokio::test]
async fn test_guest_lookup_is_served_from_cache() {
    let mut repo = MockGuestRepository::new();
    repo.expect_get_by_name()
        .withf(|name: &str| name == "Jane Doe")
        .times(1)
        .returning(|_| Ok(Some(stored_guest(1, "Jane Doe"))));

    let cache = guest_cache(repo);

    let first = cache.get_by_name("Jane Doe").await.unwrap().unwrap();
    let second = cache.get_by_name("Jane Doe").await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(second.id, 1);
    assert_eq!(cache.size(), 1);
}

#[tokio::test]
async fn test_unknown_guest_is_cached_as_absent() {
    let mut repo = MockGuestRepository::new();
    repo.expect_get_by_name().times(1).returning(|_| Ok(None));

    let cache = guest_cache(repo);

    assert!(cache.get_by_name("Stranger").await.unwrap().is_none());
    assert!(cache.get_by_name("Stranger").await.unwrap().is_none());
    assert_eq!(cache.size(), 1);
}

#[tokio::test]
async fn test_repository_errors_pass_through_uncached() {
    let mut repo = MockGuestRepository::new();
    repo.expect_get_by_name()
        .times(2)
        .returning(|_| Err(sqlx::Error::PoolTimedOut));
    repo.expect_get_all()
        .times(1)
        .returning(|| Err(sqlx::Error::RowNotFound));

    let cache = guest_cache(repo);

    assert!(matches!(cache.get_by_name("Jane Doe").await, Err(sqlx::Error::PoolTimedOut)));
    assert!(matches!(cache.get_by_name("Jane Doe").await, Err(sqlx::Error::PoolTimedOut)));
    assert!(matches!(cache.get_all().await, Err(sqlx::Error::RowNotFound)));
    assert_eq!(cache.size(), 0);
}

#[tokio::test]
async fn test_update_invalidates_guest_and_list() {
    let mut repo = MockGuestRepository::new();
    repo.expect_get_by_name()
        .times(2)
        .returning(|_| Ok(Some(stored_guest(1, "Jane Doe"))));
    repo.expect_get_all()
        .times(2)
        .returning(|| Ok(vec![stored_guest(1, "Jane Doe")]));
    repo.expect_update().times(1).returning(|_| Ok(()));

    let cache = guest_cache(repo);

    cache.get_by_name("Jane Doe").await.unwrap();
    cache.get_all().await.unwrap();
    // Both served from cache
    cache.get_by_name("Jane Doe").await.unwrap();
    cache.get_all().await.unwrap();

    let mut guest = stored_guest(1, "Jane Doe");
    guest.attending = Some(true);
    cache.update(&mut guest).await.unwrap();
    assert_eq!(cache.size(), 0);

    // Both reloaded
    cache.get_by_name("Jane Doe").await.unwrap();
    cache.get_all().await.unwrap();
}

#[tokio::test]
async fn test_create_invalidates_cached_absence() {
    let mut repo = MockGuestRepository::new();
    let mut lookups = 0;
    repo.expect_get_by_name().times(2).returning(move |name| {
        lookups += 1;
        Ok((lookups > 1).then(|| stored_guest(7, name)))
    });
    repo.expect_create().times(1).returning(|guest| {
        guest.id = 7;
        Ok(())
    });

    let cache = guest_cache(repo);

    assert!(cache.get_by_name("New Guest").await.unwrap().is_none());

    let mut guest = crate::models::Guest::new("New Guest");
    cache.create(&mut guest).await.unwrap();
    assert_eq!(guest.id, 7);

    let found = cache.get_by_name("New Guest").await.unwrap().unwrap();
    assert_eq!(found.id, 7);
}

#[tokio::test]
async fn test_failed_write_leaves_cache_untouched() {
    let mut repo = MockGuestRepository::new();
    repo.expect_get_all()
        .times(1)
        .returning(|| Ok(vec![stored_guest(1, "Jane Doe")]));
    repo.expect_create()
        .times(1)
        .returning(|_| Err(sqlx::Error::PoolClosed));
    repo.expect_update()
        .times(1)
        .returning(|_| Err(sqlx::Error::RowNotFound));

    let cache = guest_cache(repo);
    cache.get_all().await.unwrap();

    let mut guest = crate::models::Guest::new("Jane Doe");
    assert!(matches!(cache.create(&mut guest).await, Err(sqlx::Error::PoolClosed)));
    assert!(matches!(cache.update(&mut guest).await, Err(sqlx::Error::RowNotFound)));

    // Still a hit: get_all expected only once
    assert_eq!(cache.get_all().await.unwrap().len(), 1);
    assert_eq!(cache.size(), 1);
}

#[tokio::test]
async fn test_bulk_writes_clear_everything() {
    let mut repo = MockGuestRepository::new();
    repo.expect_get_by_name()
        .times(3)
        .returning(|name| Ok(Some(stored_guest(1, name))));
    repo.expect_get_all().times(3).returning(|| Ok(vec![]));
    repo.expect_bulk_create().times(1).returning(|_| Ok(()));
    repo.expect_bulk_update().times(1).returning(|_| Ok(()));

    let cache = guest_cache(repo);

    cache.get_by_name("Jane Doe").await.unwrap();
    cache.get_all().await.unwrap();
    assert_eq!(cache.size(), 2);

    let mut guests = vec![crate::models::Guest::new("A"), crate::models::Guest::new("B")];
    cache.bulk_create(&mut guests).await.unwrap();
    assert_eq!(cache.size(), 0);

    cache.get_by_name("Jane Doe").await.unwrap();
    cache.get_all().await.unwrap();

    cache.bulk_update(&mut guests).await.unwrap();
    assert_eq!(cache.size(), 0);

    cache.get_by_name("Jane Doe").await.unwrap();
    cache.get_all().await.unwrap();
}

#[tokio::test]
async fn test_mark_opened_only_drops_that_guest() {
    let mut repo = MockGuestRepository::new();
    repo.expect_get_by_name()
        .withf(|name: &str| name == "Jane Doe")
        .times(2)
        .returning(|name| Ok(Some(stored_guest(1, name))));
    repo.expect_get_by_name()
        .withf(|name: &str| name == "John Smith")
        .times(1)
        .returning(|name| Ok(Some(stored_guest(2, name))));
    repo.expect_mark_invitation_opened()
        .withf(|name: &str| name == "Jane Doe")
        .times(1)
        .returning(|_| Ok(()));

    let cache = guest_cache(repo);

    cache.get_by_name("Jane Doe").await.unwrap();
    cache.get_by_name("John Smith").await.unwrap();

    cache.mark_invitation_opened("Jane Doe").await.unwrap();
    assert_eq!(cache.size(), 1);

    cache.get_by_name("Jane Doe").await.unwrap();
    cache.get_by_name("John Smith").await.unwrap();
}

#[tokio::test]
async fn test_expired_guest_is_reloaded() {
    let mut repo = MockGuestRepository::new();
    repo.expect_get_by_name()
        .times(2)
        .returning(|name| Ok(Some(stored_guest(1, name))));

    let cache = GuestCache::with_ttl(Arc::new(repo), Duration::from_millis(40), Duration::from_secs(60));

    cache.get_by_name("Jane Doe").await.unwrap();
    cache.get_by_name("Jane Doe").await.unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;
    cache.get_by_name("Jane Doe").await.unwrap();
}

#[tokio::test]
async fn test_caches_are_independent() {
    let first: TtlCache<i32> = TtlCache::new(Duration::from_secs(60));
    let second: TtlCache<i32> = TtlCache::new(Duration::from_secs(60));

    first.set("guest_jane", 1);
    second.set("guest_jane", 2);
    first.clear();

    assert_eq!(first.get("guest_jane"), None);
    assert_eq!(second.get("guest_jane"), Some(2));
}

#[tokio::test]
async fn test_concurrent_lookups_agree() {
    let mut repo = MockGuestRepository::new();
    // No single-flight: concurrent misses may each reach the repository
    repo.expect_get_by_name()
        .times(1..=8)
        .returning(|name| Ok(Some(stored_guest(3, name))));

    let cache = Arc::new(guest_cache(repo));
    let lookups = (0..8).map(|_| {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get_by_name("Jane Doe").await })
    });

    for result in futures::future::join_all(lookups).await {
        let guest = result.unwrap().unwrap().unwrap();
        assert_eq!(guest.id, 3);
    }
    assert_eq!(cache.size(), 1);
}
