//! In-process caching: a generic TTL cache and the guest repository wrapper built on it

pub mod guest;
pub mod keys;
pub mod ttl;

pub use guest::{GuestCache, GUEST_CACHE_TTL};
pub use keys::CacheKey;
pub use ttl::{TtlCache, DEFAULT_SWEEP_INTERVAL};
