pub mod comment;
pub mod guest;

pub use comment::{CommentService, NewComment, COMMENT_CACHE_TTL};
pub use guest::GuestService;
