use sqlx::PgExecutor;
use uuid::Uuid;

use crate::dto::UpdateProfileDto;
use crate::models::User;

pub async fn create(ex: impl PgExecutor<'_>, user: &User) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO users (id, username, email, full_name, phone_number, bio, skills, is_admin, is_active, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.phone_number)
    .bind(&user.bio)
    .bind(&user.skills)
    .bind(user.is_admin)
    .bind(user.is_active)
    .bind(user.created_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn get_by_id(ex: impl PgExecutor<'_>, id: Uuid) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn get_by_email(
    ex: impl PgExecutor<'_>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(ex)
        .await
}

pub async fn get_all(ex: impl PgExecutor<'_>) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at")
        .fetch_all(ex)
        .await
}

pub async fn update_profile(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    fields: &UpdateProfileDto,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "UPDATE users SET
            full_name = COALESCE($2, full_name),
            phone_number = COALESCE($3, phone_number),
            bio = COALESCE($4, bio),
            skills = COALESCE($5, skills)
         WHERE id = $1",
    )
    .bind(id)
    .bind(&fields.full_name)
    .bind(&fields.phone_number)
    .bind(&fields.bio)
    .bind(&fields.skills)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}
