use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{Achievement, UserAchievement};

pub async fn list(ex: impl PgExecutor<'_>) -> Result<Vec<Achievement>, sqlx::Error> {
    sqlx::query_as::<_, Achievement>("SELECT * FROM achievements ORDER BY points")
        .fetch_all(ex)
        .await
}

pub async fn get_by_id(ex: impl PgExecutor<'_>, id: Uuid) -> Result<Achievement, sqlx::Error> {
    sqlx::query_as::<_, Achievement>("SELECT * FROM achievements WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn earned_by_user(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<Vec<Achievement>, sqlx::Error> {
    sqlx::query_as::<_, Achievement>(
        "SELECT a.* FROM achievements a
         JOIN user_achievements ua ON ua.achievement_id = a.id
         WHERE ua.user_id = $1
         ORDER BY ua.earned_at",
    )
    .bind(user_id)
    .fetch_all(ex)
    .await
}

pub async fn award(
    ex: impl PgExecutor<'_>,
    user_achievement: &UserAchievement,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO user_achievements (id, user_id, achievement_id, earned_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(user_achievement.id)
    .bind(user_achievement.user_id)
    .bind(user_achievement.achievement_id)
    .bind(user_achievement.earned_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}
