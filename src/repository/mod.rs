//! Data-access interfaces consumed by the cache-backed services.
//!
//! Not-found lookups are `Ok(None)`; every other failure is the underlying
//! `sqlx::Error`, passed through untouched.

mod comment;
mod guest;

pub use comment::{CommentRepository, SqlCommentRepository};
pub use guest::{GuestRepository, SqlGuestRepository};

#[cfg(test)]
pub use comment::MockCommentRepository;
#[cfg(test)]
pub use guest::MockGuestRepository;
