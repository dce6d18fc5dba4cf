use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::Event;

pub async fn create(ex: impl PgExecutor<'_>, event: &Event) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO events (id, title, description, event_type, start_date, end_date, venue,
                             virtual_link, max_participants, min_team_size, max_team_size,
                             registration_deadline, rules, prizes, is_active, created_at, creator_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
    )
    .bind(event.id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(&event.event_type)
    .bind(event.start_date)
    .bind(event.end_date)
    .bind(&event.venue)
    .bind(&event.virtual_link)
    .bind(event.max_participants)
    .bind(event.min_team_size)
    .bind(event.max_team_size)
    .bind(event.registration_deadline)
    .bind(&event.rules)
    .bind(&event.prizes)
    .bind(event.is_active)
    .bind(event.created_at)
    .bind(event.creator_id)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn get_by_id(ex: impl PgExecutor<'_>, id: Uuid) -> Result<Event, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn list_active(
    ex: impl PgExecutor<'_>,
    event_type: Option<&str>,
) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        "SELECT * FROM events
         WHERE is_active = TRUE AND ($1::VARCHAR IS NULL OR event_type = $1)
         ORDER BY start_date",
    )
    .bind(event_type)
    .fetch_all(ex)
    .await
}

pub async fn upcoming(
    ex: impl PgExecutor<'_>,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        "SELECT * FROM events
         WHERE is_active = TRUE AND start_date > $1
         ORDER BY start_date
         LIMIT $2",
    )
    .bind(now)
    .bind(limit)
    .fetch_all(ex)
    .await
}

pub async fn set_active(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    is_active: bool,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE events SET is_active = $2 WHERE id = $1")
        .bind(id)
        .bind(is_active)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}
