use chrono::Utc;
use uuid::Uuid;

use crate::db;
use crate::dto::{AnnouncementListView, NewAnnouncementDto, ReactionAction, ReactionOutcome};
use crate::errors::AppError;
use crate::models::{Announcement, AnnouncementReaction, ReactionType};
use crate::service::identity::CurrentUser;
use crate::PGPool;

/// The row is the whole reaction state: same type removes it, a different
/// type overwrites it, no row inserts one.
pub fn plan_reaction(existing: Option<ReactionType>, requested: ReactionType) -> ReactionAction {
    match existing {
        None => ReactionAction::Added,
        Some(current) if current == requested => ReactionAction::Removed,
        Some(_) => ReactionAction::Updated,
    }
}

pub async fn create(
    user: &CurrentUser,
    dto: NewAnnouncementDto,
    pool: &PGPool,
) -> Result<Announcement, AppError> {
    user.require_admin()?;
    let announcement = Announcement {
        id: Uuid::new_v4(),
        title: dto.title,
        content: dto.content,
        category: dto.category,
        priority: dto.priority,
        is_pinned: dto.is_pinned,
        created_at: Utc::now(),
        author_id: user.user_id,
    };
    db::announcement::insert(pool, &announcement).await?;
    Ok(announcement)
}

pub async fn list(category: Option<&str>, pool: &PGPool) -> Result<AnnouncementListView, AppError> {
    let announcements = db::announcement::list(pool, category).await?;
    let categories = db::announcement::distinct_categories(pool).await?;
    Ok(AnnouncementListView {
        announcements,
        categories,
    })
}

pub async fn detail(announcement_id: Uuid, pool: &PGPool) -> Result<Announcement, AppError> {
    db::announcement::get_by_id(pool, announcement_id)
        .await
        .map_err(AppError::from)
}

pub async fn delete(
    user: &CurrentUser,
    announcement_id: Uuid,
    pool: &PGPool,
) -> Result<(), AppError> {
    user.require_admin()?;
    let announcement = db::announcement::get_by_id(pool, announcement_id).await?;
    db::announcement::delete(pool, announcement.id).await?;
    Ok(())
}

pub async fn react(
    user: &CurrentUser,
    announcement_id: Uuid,
    requested: ReactionType,
    pool: &PGPool,
) -> Result<ReactionOutcome, AppError> {
    let announcement = db::announcement::get_by_id(pool, announcement_id).await?;
    let existing = db::announcement::reaction(pool, user.user_id, announcement.id).await?;
    let action = plan_reaction(existing.as_ref().map(|r| r.reaction_type), requested);
    match existing {
        None => {
            let reaction = AnnouncementReaction {
                id: Uuid::new_v4(),
                user_id: user.user_id,
                announcement_id: announcement.id,
                reaction_type: requested,
                created_at: Utc::now(),
            };
            db::announcement::insert_reaction(pool, &reaction).await?;
        }
        Some(reaction) if action == ReactionAction::Removed => {
            db::announcement::delete_reaction(pool, reaction.id).await?;
        }
        Some(reaction) => {
            db::announcement::update_reaction(pool, reaction.id, requested).await?;
        }
    }
    Ok(ReactionOutcome { action })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reaction_is_added() {
        assert_eq!(
            plan_reaction(None, ReactionType::Like),
            ReactionAction::Added
        );
    }

    #[test]
    fn same_reaction_toggles_off() {
        assert_eq!(
            plan_reaction(Some(ReactionType::Love), ReactionType::Love),
            ReactionAction::Removed
        );
    }

    #[test]
    fn different_reaction_overwrites_in_place() {
        assert_eq!(
            plan_reaction(Some(ReactionType::Like), ReactionType::Celebrate),
            ReactionAction::Updated
        );
    }
}
