use crate::models::Guest;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

const GUEST_COLUMNS: &str = "id, name, attending, plus_ones, dietary_restrictions, \
                             created_at, updated_at, first_opened_at";

fn guest_from_row(row: &SqliteRow) -> Result<Guest, sqlx::Error> {
    Ok(Guest {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        attending: row.try_get("attending")?,
        plus_ones: row.try_get::<Option<i64>, _>("plus_ones")?.unwrap_or(0),
        dietary_restrictions: row.try_get("dietary_restrictions")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        first_opened_at: row.try_get("first_opened_at")?,
    })
}

pub async fn get_guest_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Guest>, sqlx::Error> {
    debug!("Querying guest with name: {}", name);

    let row = sqlx::query(&format!("SELECT {} FROM guests WHERE name = ?", GUEST_COLUMNS))
        .bind(name)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(guest_from_row).transpose()
}

pub async fn get_all_guests(pool: &SqlitePool) -> Result<Vec<Guest>, sqlx::Error> {
    let rows = sqlx::query(&format!("SELECT {} FROM guests ORDER BY id", GUEST_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(guest_from_row).collect()
}

/// Insert a guest, filling in its generated id and timestamps.
pub async fn create_guest(pool: &SqlitePool, guest: &mut Guest) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    insert_guest(&mut tx, guest).await?;
    tx.commit().await?;

    info!("Created guest {} with ID {}", guest.name, guest.id);
    Ok(())
}

/// Update a guest by id. Fails with `RowNotFound` when no such guest exists.
pub async fn update_guest(pool: &SqlitePool, guest: &mut Guest) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    apply_guest_update(&mut tx, guest).await?;
    tx.commit().await?;

    info!("Updated guest with ID {}", guest.id);
    Ok(())
}

/// Insert several guests in one transaction; nothing is stored if any insert fails.
pub async fn bulk_create_guests(pool: &SqlitePool, guests: &mut [Guest]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for guest in guests.iter_mut() {
        insert_guest(&mut tx, guest).await?;
    }
    tx.commit().await?;

    info!("Created {} guests", guests.len());
    Ok(())
}

/// Update several guests in one transaction; any missing id rolls back the whole batch.
pub async fn bulk_update_guests(pool: &SqlitePool, guests: &mut [Guest]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for guest in guests.iter_mut() {
        apply_guest_update(&mut tx, guest).await?;
    }
    tx.commit().await?;

    info!("Updated {} guests", guests.len());
    Ok(())
}

/// Record the first time a guest opened their invitation.
///
/// Later openings keep the first timestamp. Returns whether a row changed.
pub async fn mark_invitation_opened(pool: &SqlitePool, name: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE guests SET first_opened_at = CURRENT_TIMESTAMP
         WHERE name = ? AND first_opened_at IS NULL"
    )
    .bind(name)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn insert_guest(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    guest: &mut Guest,
) -> Result<(), sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO guests (name, attending, plus_ones, dietary_restrictions)
         VALUES (?, ?, ?, ?)
         RETURNING id, created_at, updated_at"
    )
    .bind(&guest.name)
    .bind(guest.attending)
    .bind(guest.plus_ones)
    .bind(&guest.dietary_restrictions)
    .fetch_one(&mut **tx)
    .await?;

    guest.id = row.try_get("id")?;
    guest.created_at = row.try_get("created_at")?;
    guest.updated_at = row.try_get("updated_at")?;
    Ok(())
}

async fn apply_guest_update(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    guest: &mut Guest,
) -> Result<(), sqlx::Error> {
    let row = sqlx::query(
        "UPDATE guests SET
            name = ?,
            attending = ?,
            plus_ones = ?,
            dietary_restrictions = ?,
            updated_at = CURRENT_TIMESTAMP
         WHERE id = ?
         RETURNING updated_at"
    )
    .bind(&guest.name)
    .bind(guest.attending)
    .bind(guest.plus_ones)
    .bind(&guest.dietary_restrictions)
    .bind(guest.id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(sqlx::Error::RowNotFound)?;

    guest.updated_at = row.try_get("updated_at")?;
    Ok(())
}
