use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{Announcement, AnnouncementReaction, ReactionType};

pub async fn insert(
    ex: impl PgExecutor<'_>,
    announcement: &Announcement,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO announcements (id, title, content, category, priority, is_pinned, created_at, author_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(announcement.id)
    .bind(&announcement.title)
    .bind(&announcement.content)
    .bind(&announcement.category)
    .bind(announcement.priority)
    .bind(announcement.is_pinned)
    .bind(announcement.created_at)
    .bind(announcement.author_id)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn get_by_id(ex: impl PgExecutor<'_>, id: Uuid) -> Result<Announcement, sqlx::Error> {
    sqlx::query_as::<_, Announcement>("SELECT * FROM announcements WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn list(
    ex: impl PgExecutor<'_>,
    category: Option<&str>,
) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as::<_, Announcement>(
        "SELECT * FROM announcements
         WHERE ($1::VARCHAR IS NULL OR category = $1)
         ORDER BY is_pinned DESC, created_at DESC",
    )
    .bind(category)
    .fetch_all(ex)
    .await
}

pub async fn recent(ex: impl PgExecutor<'_>, limit: i64) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as::<_, Announcement>(
        "SELECT * FROM announcements ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(ex)
    .await
}

pub async fn distinct_categories(ex: impl PgExecutor<'_>) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM announcements ORDER BY category")
        .fetch_all(ex)
        .await
}

// reactions go with it via FK cascade
pub async fn delete(ex: impl PgExecutor<'_>, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM announcements WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn reaction(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    announcement_id: Uuid,
) -> Result<Option<AnnouncementReaction>, sqlx::Error> {
    sqlx::query_as::<_, AnnouncementReaction>(
        "SELECT * FROM announcement_reactions WHERE user_id = $1 AND announcement_id = $2",
    )
    .bind(user_id)
    .bind(announcement_id)
    .fetch_optional(ex)
    .await
}

pub async fn insert_reaction(
    ex: impl PgExecutor<'_>,
    reaction: &AnnouncementReaction,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO announcement_reactions (id, user_id, announcement_id, reaction_type, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(reaction.id)
    .bind(reaction.user_id)
    .bind(reaction.announcement_id)
    .bind(reaction.reaction_type)
    .bind(reaction.created_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn delete_reaction(ex: impl PgExecutor<'_>, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM announcement_reactions WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

pub async fn update_reaction(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    reaction_type: ReactionType,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE announcement_reactions SET reaction_type = $2 WHERE id = $1")
        .bind(id)
        .bind(reaction_type)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}
