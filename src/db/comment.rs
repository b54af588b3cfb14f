use crate::models::{Comment, CommentWithGuest, PageCursor, PaginatedComments};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

fn comment_from_row(row: &SqliteRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        guest_id: row.try_get("guest_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a comment, filling in its generated id and creation time.
pub async fn create_comment(pool: &SqlitePool, comment: &mut Comment) -> Result<(), sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO comments (guest_id, content) VALUES (?, ?)
         RETURNING id, created_at"
    )
    .bind(comment.guest_id)
    .bind(&comment.content)
    .fetch_one(pool)
    .await?;

    comment.id = row.try_get("id")?;
    comment.created_at = row.try_get("created_at")?;
    Ok(())
}

/// Insert a comment only while its guest has fewer than `limit` comments.
///
/// The count and the insert are one statement, so concurrent writers cannot
/// both slip under the limit. Returns `false` when the limit was reached.
pub async fn create_comment_within_limit(
    pool: &SqlitePool,
    comment: &mut Comment,
    limit: i64,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO comments (guest_id, content)
         SELECT ?, ?
         WHERE (SELECT COUNT(*) FROM comments WHERE guest_id = ?) < ?
         RETURNING id, created_at"
    )
    .bind(comment.guest_id)
    .bind(&comment.content)
    .bind(comment.guest_id)
    .bind(limit)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(false);
    };
    comment.id = row.try_get("id")?;
    comment.created_at = row.try_get("created_at")?;
    Ok(true)
}

pub async fn get_comments_by_guest_id(pool: &SqlitePool, guest_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, guest_id, content, created_at
         FROM comments WHERE guest_id = ?
         ORDER BY created_at DESC, id DESC"
    )
    .bind(guest_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(comment_from_row).collect()
}

pub async fn get_all_comments(pool: &SqlitePool) -> Result<Vec<Comment>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, guest_id, content, created_at
         FROM comments
         ORDER BY created_at DESC, id DESC"
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(comment_from_row).collect()
}

pub async fn count_comments(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM comments")
        .fetch_one(pool)
        .await
}

/// Fetch one page of comments with their authors, newest first.
///
/// Rows come after `cursor` in `(created_at DESC, id DESC)` order, so comments
/// sharing the cursor's timestamp are not lost between pages.
pub async fn get_comments_page(
    pool: &SqlitePool,
    limit: i64,
    cursor: Option<PageCursor>,
) -> Result<PaginatedComments, sqlx::Error> {
    let total_count = count_comments(pool).await?;

    let mut sql = String::from(
        "SELECT c.id, c.guest_id, c.content, c.created_at, g.name AS guest_name
         FROM comments c
         JOIN guests g ON c.guest_id = g.id",
    );
    match cursor {
        Some(PageCursor { id: Some(_), .. }) => {
            sql.push_str(" WHERE (c.created_at < ? OR (c.created_at = ? AND c.id < ?))")
        }
        Some(PageCursor { id: None, .. }) => sql.push_str(" WHERE c.created_at < ?"),
        None => {}
    }
    sql.push_str(" ORDER BY c.created_at DESC, c.id DESC LIMIT ?");

    let mut query = sqlx::query(&sql);
    if let Some(cursor) = cursor {
        query = query.bind(cursor.created_at);
        if let Some(id) = cursor.id {
            query = query.bind(cursor.created_at).bind(id);
        }
    }
    // One extra row tells us whether another page exists
    let rows = query.bind(limit + 1).fetch_all(pool).await?;

    let mut comments = rows
        .iter()
        .map(|row| {
            Ok::<_, sqlx::Error>(CommentWithGuest {
                comment: comment_from_row(row)?,
                guest_name: row.try_get("guest_name")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    let has_more = comments.len() as i64 > limit;
    comments.truncate(limit.max(0) as usize);

    let next_cursor = if has_more {
        comments.last().and_then(|last| {
            last.comment.created_at.map(|created_at| {
                PageCursor {
                    created_at,
                    id: Some(last.comment.id),
                }
                .to_string()
            })
        })
    } else {
        None
    };

    Ok(PaginatedComments {
        comments,
        total_count,
        next_cursor,
    })
}
