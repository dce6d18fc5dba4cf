use chrono::Utc;
use uuid::Uuid;

use crate::db;
use crate::dto::{
    AwardAchievementDto, DashboardView, NewUserDto, ProfileView, UpdateProfileDto,
};
use crate::errors::AppError;
use crate::models::{User, UserAchievement};
use crate::service::identity::CurrentUser;
use crate::service::notification::{self, Notice};
use crate::PGPool;

const DASHBOARD_PAGE: i64 = 5;

/// Provisioning seam for the external identity system: accounts are created
/// by an admin here, credentials never touch this service.
pub async fn provision(
    user: &CurrentUser,
    dto: NewUserDto,
    pool: &PGPool,
) -> Result<User, AppError> {
    user.require_admin()?;
    let new_user = User {
        id: Uuid::new_v4(),
        username: dto.username,
        email: dto.email,
        full_name: dto.full_name,
        phone_number: dto.phone_number,
        bio: dto.bio,
        skills: dto.skills,
        is_admin: dto.is_admin,
        is_active: true,
        created_at: Utc::now(),
    };
    match db::user::create(pool, &new_user).await {
        Ok(_) => Ok(new_user),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(AppError::AlreadyExists)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn get_all(pool: &PGPool) -> Result<Vec<User>, AppError> {
    db::user::get_all(pool).await.map_err(AppError::from)
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<User, AppError> {
    db::user::get_by_id(pool, id).await.map_err(AppError::from)
}

pub async fn profile(user: &CurrentUser, pool: &PGPool) -> Result<ProfileView, AppError> {
    let account = db::user::get_by_id(pool, user.user_id).await?;
    let achievements = db::achievement::earned_by_user(pool, user.user_id).await?;
    let post_count = db::forum::post_count_by_author(pool, user.user_id).await?;
    Ok(ProfileView {
        user: account,
        achievements,
        post_count,
    })
}

pub async fn update_profile(
    user: &CurrentUser,
    dto: UpdateProfileDto,
    pool: &PGPool,
) -> Result<User, AppError> {
    db::user::update_profile(pool, user.user_id, &dto).await?;
    db::user::get_by_id(pool, user.user_id)
        .await
        .map_err(AppError::from)
}

pub async fn award_achievement(
    user: &CurrentUser,
    dto: AwardAchievementDto,
    pool: &PGPool,
) -> Result<UserAchievement, AppError> {
    user.require_admin()?;
    let recipient = db::user::get_by_id(pool, dto.user_id).await?;
    let achievement = db::achievement::get_by_id(pool, dto.achievement_id).await?;
    let earned = UserAchievement {
        id: Uuid::new_v4(),
        user_id: recipient.id,
        achievement_id: achievement.id,
        earned_at: Utc::now(),
    };
    match db::achievement::award(pool, &earned).await {
        Ok(_) => {}
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(AppError::AlreadyExists)
        }
        Err(err) => return Err(err.into()),
    }
    notification::notify(
        pool,
        Notice {
            user_id: recipient.id,
            title: format!("Achievement unlocked: {}", achievement.name),
            message: format!(
                "You earned \"{}\" ({} points)",
                achievement.name, achievement.points
            ),
            kind: "achievement".to_string(),
            action_url: Some("/users/me".to_string()),
        },
    )
    .await;
    Ok(earned)
}

pub async fn dashboard(user: &CurrentUser, pool: &PGPool) -> Result<DashboardView, AppError> {
    let now = Utc::now();
    let upcoming_events = db::event::upcoming(pool, now, DASHBOARD_PAGE).await?;
    let recent_announcements = db::announcement::recent(pool, DASHBOARD_PAGE).await?;
    let trending_posts = db::forum::trending_posts(pool, DASHBOARD_PAGE).await?;
    let unread_notifications =
        db::notification::unread_for_user(pool, user.user_id, DASHBOARD_PAGE).await?;
    Ok(DashboardView {
        upcoming_events,
        recent_announcements,
        trending_posts,
        unread_notifications,
    })
}
