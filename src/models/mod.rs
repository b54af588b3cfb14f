use chrono::{NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub attending: Option<bool>,
    #[serde(default)]
    pub plus_ones: i64,
    #[serde(default)]
    pub dietary_restrictions: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub first_opened_at: Option<NaiveDateTime>,
}

impl Guest {
    /// A guest that has not been stored yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            attending: None,
            plus_ones: 0,
            dietary_restrictions: None,
            created_at: None,
            updated_at: None,
            first_opened_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub guest_id: i64,
    pub content: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentWithGuest {
    #[serde(flatten)]
    pub comment: Comment,
    pub guest_name: String,
}

/// One page of comments, newest first
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedComments {
    pub comments: Vec<CommentWithGuest>,
    pub total_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Position after the last comment of a page.
///
/// Rendered as `<RFC 3339 created_at>_<id>`. A cursor without an id matches
/// only strictly older comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub created_at: NaiveDateTime,
    pub id: Option<i64>,
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let created_at = self.created_at.and_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true);
        match self.id {
            Some(id) => write!(f, "{}_{}", created_at, id),
            None => f.write_str(&created_at),
        }
    }
}

// API request models
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RsvpRequest {
    pub name: String,
    pub attending: bool,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}
