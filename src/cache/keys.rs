//! Cache key generation and management

use std::fmt;

/// A structured cache key that renders to the string stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Single guest lookup by name (may hold a cached "not found")
    Guest(String),
    /// The full guest list
    AllGuests,
    /// Comments written by one guest
    GuestComments(String),
    /// Every comment
    AllComments,
}

impl CacheKey {
    /// Create a key for a single guest lookup
    pub fn guest(name: &str) -> Self {
        Self::Guest(name.to_string())
    }

    /// Create a key for a guest's comment list
    pub fn guest_comments(guest_name: &str) -> Self {
        Self::GuestComments(guest_name.to_string())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest(name) => write!(f, "guest_{}", name),
            Self::AllGuests => f.write_str("all_guests"),
            Self::GuestComments(name) => write!(f, "comments_guest_{}", name),
            Self::AllComments => f.write_str("all_comments"),
        }
    }
}
